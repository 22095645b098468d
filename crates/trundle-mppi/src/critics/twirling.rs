//! Rotation damping critic.

use serde::Deserialize;

use crate::critics::CriticData;

/// Parameters for [`TwirlingCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TwirlingCriticConfig {
    pub enabled: bool,
    pub cost_weight: f64,
    pub cost_power: u32,
}

impl Default for TwirlingCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_weight: 10.0,
            cost_power: 1,
        }
    }
}

/// Penalizes mean |wz| per sample to discourage heading oscillation.
#[derive(Debug, Clone, PartialEq)]
pub struct TwirlingCritic {
    enabled: bool,
    weight: f64,
    power: u32,
}

impl TwirlingCritic {
    pub fn new(config: &TwirlingCriticConfig) -> Self {
        Self {
            enabled: config.enabled,
            weight: config.cost_weight,
            power: config.cost_power,
        }
    }

    pub fn score(&self, data: &mut CriticData<'_>) {
        if !self.enabled {
            return;
        }
        let time_steps = data.state.time_steps();
        for b in 0..data.state.batch_size() {
            let mut summed = 0.0;
            for t in 0..time_steps {
                summed += data.state.wz[(b, t)].abs();
            }
            let mean = summed / time_steps as f64;
            data.costs[b] += self.weight * mean.powi(self.power as i32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateBatch, StateLayout};
    use crate::trajectories::Trajectories;
    use nalgebra::DVector;
    use trundle_core::types::Pose2;
    use trundle_test_utils::{FixedGoalChecker, GridCostmap, line_path};

    fn score(critic: &TwirlingCritic, state: &StateBatch) -> DVector<f64> {
        let trajectories = Trajectories::new(state.batch_size(), state.time_steps());
        let path = line_path(3, 0.5);
        let mut costs = DVector::zeros(state.batch_size());
        let mut fail = false;
        let checker = FixedGoalChecker::default();
        let costmap = GridCostmap::open_square(20.0, 0.1);
        let mut data = CriticData::new(
            state,
            &trajectories,
            &path,
            Pose2::default(),
            &mut costs,
            &mut fail,
            &checker,
            &costmap,
            0.1,
        );
        critic.score(&mut data);
        costs
    }

    #[test]
    fn straight_sample_costs_nothing() {
        let critic = TwirlingCritic::new(&TwirlingCriticConfig::default());
        let state = StateBatch::new(1, 5, 0.1, StateLayout::new(false));
        let costs = score(&critic, &state);
        assert_eq!(costs[0], 0.0);
    }

    #[test]
    fn spin_direction_does_not_matter() {
        let critic = TwirlingCritic::new(&TwirlingCriticConfig {
            cost_weight: 1.0,
            ..TwirlingCriticConfig::default()
        });
        let mut state = StateBatch::new(2, 4, 0.1, StateLayout::new(false));
        state.wz.row_mut(0).fill(0.5);
        state.wz.row_mut(1).fill(-0.5);
        let costs = score(&critic, &state);
        approx::assert_relative_eq!(costs[0], costs[1]);
        approx::assert_relative_eq!(costs[0], 0.5, epsilon = 1e-12);
    }
}

//! Forward-motion preference critic.

use serde::Deserialize;

use crate::critics::CriticData;

/// Parameters for [`PreferForwardCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PreferForwardCriticConfig {
    pub enabled: bool,
    pub cost_weight: f64,
    pub cost_power: u32,
}

impl Default for PreferForwardCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_weight: 3.0,
            cost_power: 1,
        }
    }
}

/// Penalizes time spent in reverse: each step contributes
/// `max(0, -vx)^power * dt`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferForwardCritic {
    enabled: bool,
    weight: f64,
    power: u32,
}

impl PreferForwardCritic {
    pub fn new(config: &PreferForwardCriticConfig) -> Self {
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
            let mut reverse = 0.0;
            for t in 0..time_steps {
                let backward = (-data.state.vx[(b, t)]).max(0.0);
                reverse += backward.powi(self.power as i32) * data.model_dt;
            }
            data.costs[b] += self.weight * reverse;
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

    fn score(critic: &PreferForwardCritic, state: &StateBatch) -> DVector<f64> {
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
            state.model_dt,
        );
        critic.score(&mut data);
        costs
    }

    #[test]
    fn forward_motion_is_free() {
        let critic = PreferForwardCritic::new(&PreferForwardCriticConfig::default());
        let mut state = StateBatch::new(1, 5, 0.1, StateLayout::new(false));
        state.vx.fill(0.4);
        let costs = score(&critic, &state);
        assert_eq!(costs[0], 0.0);
    }

    #[test]
    fn reverse_motion_accumulates_over_time() {
        let critic = PreferForwardCritic::new(&PreferForwardCriticConfig {
            cost_weight: 1.0,
            ..PreferForwardCriticConfig::default()
        });
        let mut state = StateBatch::new(1, 5, 0.1, StateLayout::new(false));
        state.vx.fill(-0.4);
        let costs = score(&critic, &state);
        approx::assert_relative_eq!(costs[0], 0.4 * 0.1 * 5.0, epsilon = 1e-12);
    }

    #[test]
    fn deeper_reverse_costs_more() {
        let critic = PreferForwardCritic::new(&PreferForwardCriticConfig::default());
        let mut state = StateBatch::new(2, 5, 0.1, StateLayout::new(false));
        for t in 0..5 {
            state.vx[(0, t)] = -0.1;
            state.vx[(1, t)] = -0.5;
        }
        let costs = score(&critic, &state);
        assert!(costs[1] > costs[0]);
    }
}

//! Control smoothness critic.

use nalgebra::DMatrix;
use serde::Deserialize;

use crate::critics::CriticData;

/// Parameters for [`SmootherCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SmootherCriticConfig {
    pub enabled: bool,
    pub vx_weight: f64,
    pub vy_weight: f64,
    pub wz_weight: f64,
}

impl Default for SmootherCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vx_weight: 2.0,
            vy_weight: 2.0,
            wz_weight: 2.0,
        }
    }
}

/// Penalizes chattering commands: the mean absolute first difference of each
/// control axis across the horizon, with per-axis weights.
#[derive(Debug, Clone, PartialEq)]
pub struct SmootherCritic {
    enabled: bool,
    vx_weight: f64,
    vy_weight: f64,
    wz_weight: f64,
}

impl SmootherCritic {
    pub fn new(config: &SmootherCriticConfig) -> Self {
        Self {
            enabled: config.enabled,
            vx_weight: config.vx_weight,
            vy_weight: config.vy_weight,
            wz_weight: config.wz_weight,
        }
    }

    pub fn score(&self, data: &mut CriticData<'_>) {
        if !self.enabled || data.state.time_steps() < 2 {
            return;
        }
        let holonomic = data.state.layout().is_holonomic();
        for b in 0..data.state.batch_size() {
            let mut cost = self.vx_weight * mean_abs_diff(&data.state.cvx, b);
            cost += self.wz_weight * mean_abs_diff(&data.state.cwz, b);
            if holonomic {
                cost += self.vy_weight * mean_abs_diff(&data.state.cvy, b);
            }
            data.costs[b] += cost;
        }
    }
}

fn mean_abs_diff(plane: &DMatrix<f64>, b: usize) -> f64 {
    let time_steps = plane.ncols();
    let mut summed = 0.0;
    for t in 1..time_steps {
        summed += (plane[(b, t)] - plane[(b, t - 1)]).abs();
    }
    summed / (time_steps - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateBatch, StateLayout};
    use crate::trajectories::Trajectories;
    use nalgebra::DVector;
    use trundle_core::types::Pose2;
    use trundle_test_utils::{FixedGoalChecker, GridCostmap, line_path};

    fn score(critic: &SmootherCritic, state: &StateBatch) -> DVector<f64> {
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
    fn constant_controls_cost_nothing() {
        let critic = SmootherCritic::new(&SmootherCriticConfig::default());
        let mut state = StateBatch::new(1, 6, 0.1, StateLayout::new(false));
        state.cvx.fill(0.4);
        state.cwz.fill(-0.2);
        let costs = score(&critic, &state);
        assert_eq!(costs[0], 0.0);
    }

    #[test]
    fn alternating_controls_cost_more_than_ramps() {
        let critic = SmootherCritic::new(&SmootherCriticConfig::default());
        let mut state = StateBatch::new(2, 6, 0.1, StateLayout::new(false));
        for t in 0..6 {
            // Sample 0 ramps gently; sample 1 alternates sign every step.
            state.cvx[(0, t)] = 0.05 * t as f64;
            state.cvx[(1, t)] = if t % 2 == 0 { 0.3 } else { -0.3 };
        }
        let costs = score(&critic, &state);
        assert!(costs[1] > costs[0]);
    }

    #[test]
    fn vy_ignored_for_non_holonomic_layout() {
        let critic = SmootherCritic::new(&SmootherCriticConfig::default());
        let mut state = StateBatch::new(1, 4, 0.1, StateLayout::new(false));
        state.cvy[(0, 1)] = 5.0;
        let costs = score(&critic, &state);
        assert_eq!(costs[0], 0.0);
    }
}

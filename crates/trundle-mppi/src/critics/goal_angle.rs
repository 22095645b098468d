//! Goal heading critic.

use serde::Deserialize;
use trundle_core::angles::shortest_angular_distance;

use crate::critics::CriticData;

/// Parameters for [`GoalAngleCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GoalAngleCriticConfig {
    pub enabled: bool,
    pub cost_weight: f64,
    pub cost_power: u32,
    /// Activation margin added to the goal checker's XY tolerance, meters.
    pub tolerance_margin: f64,
}

impl Default for GoalAngleCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_weight: 3.0,
            cost_power: 1,
            tolerance_margin: 0.5,
        }
    }
}

/// Penalizes the angular deviation between each sample's final heading and
/// the final path heading. Active only near the goal, like [`GoalCritic`](crate::critics::GoalCritic).
#[derive(Debug, Clone, PartialEq)]
pub struct GoalAngleCritic {
    enabled: bool,
    weight: f64,
    power: u32,
    tolerance_margin: f64,
}

impl GoalAngleCritic {
    pub fn new(config: &GoalAngleCriticConfig) -> Self {
        Self {
            enabled: config.enabled,
            weight: config.cost_weight,
            power: config.cost_power,
            tolerance_margin: config.tolerance_margin,
        }
    }

    pub fn score(&self, data: &mut CriticData<'_>) {
        let Some(goal) = data.path.goal() else {
            return;
        };
        if !self.enabled || !data.within_goal_tolerance(self.tolerance_margin) {
            return;
        }

        let last = data.trajectories.time_steps() - 1;
        for b in 0..data.trajectories.batch_size() {
            let deviation =
                shortest_angular_distance(data.trajectories.yaw[(b, last)], goal.yaw).abs();
            data.costs[b] += self.weight * deviation.powi(self.power as i32);
        }
    }
}

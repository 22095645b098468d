//! Path heading alignment critic.

use serde::Deserialize;
use trundle_core::angles::shortest_angular_distance;

use crate::critics::{CriticData, nearest_path_index};

/// Parameters for [`PathAngleCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathAngleCriticConfig {
    pub enabled: bool,
    pub cost_weight: f64,
    pub cost_power: u32,
    /// Deactivation margin added to the goal checker's XY tolerance, meters.
    /// Near the goal the goal-angle critic owns heading behavior.
    pub tolerance_margin: f64,
}

impl Default for PathAngleCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_weight: 2.0,
            cost_power: 1,
            tolerance_margin: 0.5,
        }
    }
}

/// Penalizes the mean absolute angular deviation between each sample's
/// heading and the heading of the nearest path segment.
#[derive(Debug, Clone, PartialEq)]
pub struct PathAngleCritic {
    enabled: bool,
    weight: f64,
    power: u32,
    tolerance_margin: f64,
}

impl PathAngleCritic {
    pub fn new(config: &PathAngleCriticConfig) -> Self {
        Self {
            enabled: config.enabled,
            weight: config.cost_weight,
            power: config.cost_power,
            tolerance_margin: config.tolerance_margin,
        }
    }

    pub fn score(&self, data: &mut CriticData<'_>) {
        if !self.enabled
            || data.path.len() < 2
            || data.within_goal_tolerance(self.tolerance_margin)
        {
            return;
        }

        let time_steps = data.trajectories.time_steps();
        for b in 0..data.trajectories.batch_size() {
            let mut summed = 0.0;
            for t in 0..time_steps {
                let nearest = nearest_path_index(
                    data.path,
                    data.trajectories.x[(b, t)],
                    data.trajectories.y[(b, t)],
                );
                summed += shortest_angular_distance(
                    data.trajectories.yaw[(b, t)],
                    data.path.yaw[nearest],
                )
                .abs();
            }
            let mean = summed / time_steps as f64;
            data.costs[b] += self.weight * mean.powi(self.power as i32);
        }
    }
}

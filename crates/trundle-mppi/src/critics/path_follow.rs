//! Path progress critic.

use serde::Deserialize;

use crate::critics::CriticData;

/// Parameters for [`PathFollowCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathFollowCriticConfig {
    pub enabled: bool,
    pub cost_weight: f64,
    pub cost_power: u32,
    /// How many path points ahead of the furthest reached point to aim for.
    pub offset_from_furthest: usize,
    /// Deactivate once the batch has consumed this fraction of the path.
    pub max_path_ratio: f64,
}

impl Default for PathFollowCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_weight: 3.0,
            cost_power: 1,
            offset_from_furthest: 6,
            max_path_ratio: 0.4,
        }
    }
}

/// Pulls each sample's endpoint toward a path point ahead of the furthest
/// point the batch has reached, keeping the optimization making progress
/// along the path while the goal is still distant.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFollowCritic {
    enabled: bool,
    weight: f64,
    power: u32,
    offset_from_furthest: usize,
    max_path_ratio: f64,
}

impl PathFollowCritic {
    pub fn new(config: &PathFollowCriticConfig) -> Self {
        Self {
            enabled: config.enabled,
            weight: config.cost_weight,
            power: config.cost_power,
            offset_from_furthest: config.offset_from_furthest,
            max_path_ratio: config.max_path_ratio,
        }
    }

    pub fn score(&self, data: &mut CriticData<'_>) {
        if !self.enabled || data.path.len() < 2 {
            return;
        }

        let furthest = data.furthest_reached_path_point();
        let ratio = furthest as f64 / data.path.len() as f64;
        if ratio > self.max_path_ratio {
            return;
        }

        let target = (furthest + self.offset_from_furthest).min(data.path.len() - 1);
        let target_x = data.path.x[target];
        let target_y = data.path.y[target];

        let last = data.trajectories.time_steps() - 1;
        for b in 0..data.trajectories.batch_size() {
            let dx = data.trajectories.x[(b, last)] - target_x;
            let dy = data.trajectories.y[(b, last)] - target_y;
            let dist = dx.hypot(dy);
            data.costs[b] += self.weight * dist.powi(self.power as i32);
        }
    }
}

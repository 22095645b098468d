//! Reference-path alignment critics.
//!
//! Both critics measure how far the batch strays from the reference path.
//! The exact variant averages the point-to-path distance over every time
//! step; the approximate variant strides over the horizon and defers the
//! square root to the winning candidate, trading resolution for a smaller
//! constant at the same O(B·T·P) bound.

use serde::Deserialize;

use crate::critics::CriticData;

// ---------------------------------------------------------------------------
// ReferenceTrajectoryCritic
// ---------------------------------------------------------------------------

/// Parameters for [`ReferenceTrajectoryCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReferenceTrajectoryCriticConfig {
    pub enabled: bool,
    pub cost_weight: f64,
    pub cost_power: u32,
}

impl Default for ReferenceTrajectoryCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_weight: 3.0,
            cost_power: 1,
        }
    }
}

/// Mean over the horizon of each trajectory point's distance to the nearest
/// path point.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTrajectoryCritic {
    enabled: bool,
    weight: f64,
    power: u32,
}

impl ReferenceTrajectoryCritic {
    pub fn new(config: &ReferenceTrajectoryCriticConfig) -> Self {
        Self {
            enabled: config.enabled,
            weight: config.cost_weight,
            power: config.cost_power,
        }
    }

    pub fn score(&self, data: &mut CriticData<'_>) {
        // A single-pose path has no meaningful alignment direction.
        if !self.enabled || data.path.len() < 2 {
            return;
        }

        let time_steps = data.trajectories.time_steps();
        for b in 0..data.trajectories.batch_size() {
            let mut summed = 0.0;
            for t in 0..time_steps {
                summed += min_distance_to_path(data, b, t).sqrt();
            }
            let mean = summed / time_steps as f64;
            data.costs[b] += self.weight * mean.powi(self.power as i32);
        }
    }
}

// ---------------------------------------------------------------------------
// ApproxReferenceTrajectoryCritic
// ---------------------------------------------------------------------------

/// Parameters for [`ApproxReferenceTrajectoryCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApproxReferenceTrajectoryCriticConfig {
    pub enabled: bool,
    pub cost_weight: f64,
    pub cost_power: u32,
    /// Evaluate every n-th time step.
    pub trajectory_point_step: usize,
}

impl Default for ApproxReferenceTrajectoryCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_weight: 3.0,
            cost_power: 1,
            trajectory_point_step: 2,
        }
    }
}

/// Strided variant of [`ReferenceTrajectoryCritic`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApproxReferenceTrajectoryCritic {
    enabled: bool,
    weight: f64,
    power: u32,
    step: usize,
}

impl ApproxReferenceTrajectoryCritic {
    pub fn new(config: &ApproxReferenceTrajectoryCriticConfig) -> Self {
        Self {
            enabled: config.enabled,
            weight: config.cost_weight,
            power: config.cost_power,
            step: config.trajectory_point_step.max(1),
        }
    }

    pub fn score(&self, data: &mut CriticData<'_>) {
        if !self.enabled || data.path.len() < 2 {
            return;
        }

        let time_steps = data.trajectories.time_steps();
        let evaluated = (self.step..time_steps).step_by(self.step).count();
        if evaluated == 0 {
            return;
        }

        for b in 0..data.trajectories.batch_size() {
            let mut summed = 0.0;
            for t in (self.step..time_steps).step_by(self.step) {
                summed += min_distance_to_path(data, b, t).sqrt();
            }
            let mean = summed / evaluated as f64;
            data.costs[b] += self.weight * mean.powi(self.power as i32);
        }
    }
}

/// Squared distance from trajectory point (b, t) to the nearest path point.
fn min_distance_to_path(data: &CriticData<'_>, b: usize, t: usize) -> f64 {
    let x = data.trajectories.x[(b, t)];
    let y = data.trajectories.y[(b, t)];
    let mut best = f64::MAX;
    for p in 0..data.path.len() {
        let dx = data.path.x[p] - x;
        let dy = data.path.y[p] - y;
        best = best.min(dx * dx + dy * dy);
    }
    best
}

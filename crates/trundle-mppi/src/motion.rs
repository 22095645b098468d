//! Motion models.
//!
//! [`MotionModel`] is an enum with static dispatch — no trait objects, no
//! vtable overhead. A model decides the state layout (whether vy exists),
//! enforces kinematics the box clipping cannot express, and carries control
//! velocities forward through the horizon.

use trundle_core::error::ConfigError;
use trundle_core::types::Twist2;

use crate::state::{StateBatch, StateLayout};

/// Platform kinematics variant. Ackermann is the only variant with state:
/// its minimum turning radius in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionModel {
    /// Differential drive: vx and wz, no lateral motion.
    DiffDrive,
    /// Omnidirectional: vx, vy, and wz.
    Omni,
    /// Car-like: vx and wz coupled through a minimum turning radius.
    Ackermann { min_turning_radius: f64 },
}

impl MotionModel {
    /// Build a model from its configured name, rejecting unknown names.
    pub fn from_name(name: &str, min_turning_radius: f64) -> Result<Self, ConfigError> {
        match name {
            "DiffDrive" => Ok(Self::DiffDrive),
            "Omni" => Ok(Self::Omni),
            "Ackermann" => {
                if min_turning_radius <= 0.0 || !min_turning_radius.is_finite() {
                    return Err(ConfigError::out_of_range(
                        "min_turning_radius",
                        format!("must be finite and > 0, got {min_turning_radius}"),
                    ));
                }
                Ok(Self::Ackermann { min_turning_radius })
            }
            other => Err(ConfigError::UnknownMotionModel(other.to_string())),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::DiffDrive => "DiffDrive",
            Self::Omni => "Omni",
            Self::Ackermann { .. } => "Ackermann",
        }
    }

    /// Whether the platform can translate sideways independently of heading.
    pub const fn is_holonomic(&self) -> bool {
        matches!(self, Self::Omni)
    }

    pub const fn layout(&self) -> StateLayout {
        StateLayout::new(self.is_holonomic())
    }

    /// Enforce model-specific control limits beyond the per-axis box.
    ///
    /// Runs after the box clipping so its guarantees survive to scoring.
    /// DiffDrive and Omni have nothing to add. Ackermann requires
    /// `|wz| * min_turning_radius <= |vx|` in every control cell; violating
    /// wz values are pulled toward zero, keeping their sign.
    pub fn apply_constraints(&self, state: &mut StateBatch) {
        let Self::Ackermann { min_turning_radius } = *self else {
            return;
        };
        for (wz, vx) in state.cwz.iter_mut().zip(state.cvx.iter()) {
            let wz_max = vx.abs() / min_turning_radius;
            if wz.abs() > wz_max {
                *wz = wz.signum() * wz_max;
            }
        }
    }

    /// Populate the velocity planes: row 0 is the measured twist, and every
    /// later row carries the previous step's control forward.
    pub fn roll_out_velocities(&self, state: &mut StateBatch, speed: Twist2) {
        let holonomic = self.is_holonomic();
        let batch_size = state.batch_size();
        for b in 0..batch_size {
            state.vx[(b, 0)] = speed.vx;
            state.wz[(b, 0)] = speed.wz;
            if holonomic {
                state.vy[(b, 0)] = speed.vy;
            }
        }
        for t in 1..state.time_steps() {
            for b in 0..batch_size {
                state.vx[(b, t)] = state.cvx[(b, t - 1)];
                state.wz[(b, t)] = state.cwz[(b, t - 1)];
                if holonomic {
                    state.vy[(b, t)] = state.cvy[(b, t - 1)];
                }
            }
        }
        state.speed = speed;
    }
}

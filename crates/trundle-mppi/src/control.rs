//! Nominal control sequence.
//!
//! The optimizer's persistent decision variable: one control per horizon
//! step, refined by the softmin update each tick and shifted by one step
//! when the controller period matches the model step.

use nalgebra::DVector;
use trundle_core::types::Twist2;

use crate::state::StateLayout;

/// Per-axis nominal controls over the horizon. `vy` is only meaningful for
/// holonomic layouts and stays zero otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSequence {
    pub vx: DVector<f64>,
    pub vy: DVector<f64>,
    pub wz: DVector<f64>,
    layout: StateLayout,
}

impl ControlSequence {
    pub fn new(time_steps: usize, layout: StateLayout) -> Self {
        Self {
            vx: DVector::zeros(time_steps),
            vy: DVector::zeros(time_steps),
            wz: DVector::zeros(time_steps),
            layout,
        }
    }

    /// Zero the sequence, reallocating when the horizon changed.
    pub fn reset(&mut self, time_steps: usize) {
        if self.time_steps() != time_steps {
            *self = Self::new(time_steps, self.layout);
            return;
        }
        self.vx.fill(0.0);
        self.vy.fill(0.0);
        self.wz.fill(0.0);
    }

    pub fn time_steps(&self) -> usize {
        self.vx.len()
    }

    pub const fn layout(&self) -> StateLayout {
        self.layout
    }

    /// Advance the horizon by one step: every row moves one step toward the
    /// present and the final row is duplicated from its predecessor.
    pub fn shift(&mut self) {
        let t_len = self.time_steps();
        for t in 0..t_len.saturating_sub(1) {
            self.vx[t] = self.vx[t + 1];
            self.vy[t] = self.vy[t + 1];
            self.wz[t] = self.wz[t + 1];
        }
    }

    /// The command at a horizon offset as a twist. Lateral velocity is
    /// reported only for holonomic layouts.
    pub fn command_at(&self, offset: usize) -> Twist2 {
        let vy = if self.layout.is_holonomic() {
            self.vy[offset]
        } else {
            0.0
        };
        Twist2::new(self.vx[offset], vy, self.wz[offset])
    }
}

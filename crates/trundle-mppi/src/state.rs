//! Batched rollout state.
//!
//! The state of the optimization problem for every sample: control columns,
//! rolled-out velocity columns, and the shared time step. Stored as one
//! B×T matrix ("plane") per scalar field, rows = samples, columns = time
//! steps, so a per-step sweep touches one contiguous column.

use nalgebra::DMatrix;
use trundle_core::types::{Pose2, Twist2};

// ---------------------------------------------------------------------------
// StateLayout
// ---------------------------------------------------------------------------

/// Describes which fields the state carries for the active motion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    holonomic: bool,
}

impl StateLayout {
    pub const fn new(holonomic: bool) -> Self {
        Self { holonomic }
    }

    /// Whether lateral (vy) fields participate in the layout.
    pub const fn is_holonomic(&self) -> bool {
        self.holonomic
    }

    /// Control dimension U: 2 for non-holonomic layouts, 3 with vy.
    pub const fn control_dim(&self) -> usize {
        if self.holonomic { 3 } else { 2 }
    }

    /// Width of the packed per-step record: controls + velocities + dt.
    pub const fn width(&self) -> usize {
        2 * self.control_dim() + 1
    }
}

// ---------------------------------------------------------------------------
// StateBatch
// ---------------------------------------------------------------------------

/// Per-sample controls and velocities over the horizon, plus the robot pose
/// and measured twist the batch was prepared from.
///
/// The vy planes are allocated for every layout but written only when the
/// layout is holonomic; they stay zero otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct StateBatch {
    /// Noised control columns.
    pub cvx: DMatrix<f64>,
    pub cvy: DMatrix<f64>,
    pub cwz: DMatrix<f64>,
    /// Velocities rolled out from the measured twist through the controls.
    pub vx: DMatrix<f64>,
    pub vy: DMatrix<f64>,
    pub wz: DMatrix<f64>,
    /// Robot pose the batch was prepared at.
    pub pose: Pose2,
    /// Measured robot twist at prepare time; row 0 of the velocity planes.
    pub speed: Twist2,
    /// Shared integration step, seconds.
    pub model_dt: f64,
    layout: StateLayout,
}

impl StateBatch {
    pub fn new(batch_size: usize, time_steps: usize, model_dt: f64, layout: StateLayout) -> Self {
        Self {
            cvx: DMatrix::zeros(batch_size, time_steps),
            cvy: DMatrix::zeros(batch_size, time_steps),
            cwz: DMatrix::zeros(batch_size, time_steps),
            vx: DMatrix::zeros(batch_size, time_steps),
            vy: DMatrix::zeros(batch_size, time_steps),
            wz: DMatrix::zeros(batch_size, time_steps),
            pose: Pose2::default(),
            speed: Twist2::zero(),
            model_dt,
            layout,
        }
    }

    /// Zero every plane, reallocating when the requested shape changed.
    pub fn reset(&mut self, batch_size: usize, time_steps: usize, model_dt: f64) {
        if self.batch_size() != batch_size || self.time_steps() != time_steps {
            *self = Self::new(batch_size, time_steps, model_dt, self.layout);
            return;
        }
        self.cvx.fill(0.0);
        self.cvy.fill(0.0);
        self.cwz.fill(0.0);
        self.vx.fill(0.0);
        self.vy.fill(0.0);
        self.wz.fill(0.0);
        self.pose = Pose2::default();
        self.speed = Twist2::zero();
        self.model_dt = model_dt;
    }

    pub fn batch_size(&self) -> usize {
        self.cvx.nrows()
    }

    pub fn time_steps(&self) -> usize {
        self.cvx.ncols()
    }

    pub const fn layout(&self) -> StateLayout {
        self.layout
    }
}

//! World-frame trajectory batch produced by the integrator.

use nalgebra::DMatrix;
use trundle_core::types::Pose2;

/// x, y, and yaw planes of shape B×T; rows = samples, columns = time steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectories {
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
    pub yaw: DMatrix<f64>,
}

impl Trajectories {
    pub fn new(batch_size: usize, time_steps: usize) -> Self {
        Self {
            x: DMatrix::zeros(batch_size, time_steps),
            y: DMatrix::zeros(batch_size, time_steps),
            yaw: DMatrix::zeros(batch_size, time_steps),
        }
    }

    /// Zero the planes, reallocating when the requested shape changed.
    pub fn reset(&mut self, batch_size: usize, time_steps: usize) {
        if self.batch_size() != batch_size || self.time_steps() != time_steps {
            *self = Self::new(batch_size, time_steps);
            return;
        }
        self.x.fill(0.0);
        self.y.fill(0.0);
        self.yaw.fill(0.0);
    }

    pub fn batch_size(&self) -> usize {
        self.x.nrows()
    }

    pub fn time_steps(&self) -> usize {
        self.x.ncols()
    }

    /// Pose of sample `b` at time step `t`.
    pub fn pose_at(&self, b: usize, t: usize) -> Pose2 {
        Pose2::new(self.x[(b, t)], self.y[(b, t)], self.yaw[(b, t)])
    }

    /// One sample's trajectory as a pose sequence.
    pub fn sample(&self, b: usize) -> Vec<Pose2> {
        (0..self.time_steps()).map(|t| self.pose_at(b, t)).collect()
    }
}

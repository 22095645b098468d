//! Forward trajectory integration.
//!
//! Turns the rolled-out velocity planes into world-frame trajectories. The
//! integrator is stateless and writes in place into caller-owned planes.

use trundle_core::types::Pose2;

use crate::state::StateBatch;
use crate::trajectories::Trajectories;

/// Integrate the state batch from `pose`, one Euler step per horizon step:
///
/// ```text
/// x[t+1]   = x[t] + (vx[t] cos(yaw[t]) - vy[t] sin(yaw[t])) dt
/// y[t+1]   = y[t] + (vx[t] sin(yaw[t]) + vy[t] cos(yaw[t])) dt
/// yaw[t+1] = yaw[t] + wz[t] dt
/// ```
///
/// Row 0 is the robot pose. Yaw is left unnormalized; critics normalize on
/// demand. The vy terms vanish for non-holonomic layouts, whose vy planes
/// are identically zero.
pub fn integrate(trajectories: &mut Trajectories, state: &StateBatch, pose: Pose2) {
    let holonomic = state.layout().is_holonomic();
    let dt = state.model_dt;
    let batch_size = state.batch_size();
    let time_steps = state.time_steps();
    debug_assert_eq!(trajectories.x.shape(), (batch_size, time_steps));

    for b in 0..batch_size {
        trajectories.x[(b, 0)] = pose.x;
        trajectories.y[(b, 0)] = pose.y;
        trajectories.yaw[(b, 0)] = pose.yaw;
    }

    for t in 1..time_steps {
        for b in 0..batch_size {
            let yaw = trajectories.yaw[(b, t - 1)];
            let (sin, cos) = yaw.sin_cos();
            let vx = state.vx[(b, t - 1)];
            let vy = if holonomic { state.vy[(b, t - 1)] } else { 0.0 };
            trajectories.x[(b, t)] = trajectories.x[(b, t - 1)] + (vx * cos - vy * sin) * dt;
            trajectories.y[(b, t)] = trajectories.y[(b, t - 1)] + (vx * sin + vy * cos) * dt;
            trajectories.yaw[(b, t)] = yaw + state.wz[(b, t - 1)] * dt;
        }
    }
}

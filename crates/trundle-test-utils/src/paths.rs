//! Reference-path builders.

use trundle_core::types::{Path, Pose2};

/// Colinear path along +x from the origin: `count` poses at `spacing`
/// meters, all with zero yaw.
pub fn line_path(count: usize, spacing: f64) -> Path {
    let poses: Vec<Pose2> = (0..count)
        .map(|i| Pose2::new(i as f64 * spacing, 0.0, 0.0))
        .collect();
    Path::from_poses(&poses)
}

/// Single-pose path, as produced when the planner goal is underfoot.
pub fn single_pose_path(pose: Pose2) -> Path {
    Path::from_poses(&[pose])
}

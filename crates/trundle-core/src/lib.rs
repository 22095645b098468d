// trundle-core: Types, traits, angle math, and errors shared by the trundle controller stack.

pub mod angles;
pub mod costmap;
pub mod error;
pub mod goal_checker;
pub mod types;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        // Angle math
        angles::{normalize_angle, shortest_angular_distance},
        // Costmap capability
        costmap::{COST_FREE, COST_INSCRIBED, COST_LETHAL, COST_UNKNOWN, Costmap},
        // Errors
        error::{ConfigError, OptimizerError},
        // Goal checking
        goal_checker::{GoalChecker, GoalTolerances},
        // Types
        types::{Path, Pose2, PoseStamped, Stamp, Twist2, TwistStamped},
    };
}

//! Stub implementations of host-owned capabilities.

use trundle_core::goal_checker::{GoalChecker, GoalTolerances};

/// A goal checker with fixed tolerances.
pub struct FixedGoalChecker {
    tolerances: GoalTolerances,
}

impl FixedGoalChecker {
    pub const fn new(xy: f64, yaw: f64) -> Self {
        Self {
            tolerances: GoalTolerances { xy, yaw },
        }
    }
}

impl Default for FixedGoalChecker {
    fn default() -> Self {
        Self {
            tolerances: GoalTolerances::default(),
        }
    }
}

impl GoalChecker for FixedGoalChecker {
    fn tolerances(&self) -> GoalTolerances {
        self.tolerances
    }
}

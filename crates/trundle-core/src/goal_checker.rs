//! Goal-checker capability.
//!
//! The host owns goal acceptance; the controller only queries the configured
//! tolerances to decide when goal-seeking critics should activate.

/// Position and heading tolerances around the goal pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalTolerances {
    /// Acceptance radius around the goal position, meters.
    pub xy: f64,
    /// Acceptance window around the goal heading, radians.
    pub yaw: f64,
}

impl Default for GoalTolerances {
    fn default() -> Self {
        Self { xy: 0.25, yaw: 0.25 }
    }
}

/// Tolerance query handle supplied by the host each tick.
pub trait GoalChecker {
    fn tolerances(&self) -> GoalTolerances;
}

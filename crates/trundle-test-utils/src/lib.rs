// trundle-test-utils: Deterministic RNG, stub world fixtures, and path builders for test suites.

pub mod grid;
pub mod mocks;
pub mod paths;
pub mod rng;

pub use grid::GridCostmap;
pub use mocks::FixedGoalChecker;
pub use paths::{line_path, single_pose_path};
pub use rng::seeded_rng;

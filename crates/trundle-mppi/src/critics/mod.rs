//! Trajectory critics.
//!
//! A critic reads the scored batch context and adds its weighted, powered
//! contribution into the per-sample cost vector. [`Critic`] is an enum with
//! static dispatch — the set is closed, and unknown names are rejected when
//! the manager is built. Critics run in declared order; their only shared
//! output is the additively accumulated cost vector and the fail flag.

mod goal;
mod goal_angle;
mod obstacles;
mod path_angle;
mod path_follow;
mod prefer_forward;
mod reference;
mod smoother;
mod twirling;

pub use goal::{GoalCritic, GoalCriticConfig};
pub use goal_angle::{GoalAngleCritic, GoalAngleCriticConfig};
pub use obstacles::{ObstaclesCritic, ObstaclesCriticConfig};
pub use path_angle::{PathAngleCritic, PathAngleCriticConfig};
pub use path_follow::{PathFollowCritic, PathFollowCriticConfig};
pub use prefer_forward::{PreferForwardCritic, PreferForwardCriticConfig};
pub use reference::{
    ApproxReferenceTrajectoryCritic, ApproxReferenceTrajectoryCriticConfig,
    ReferenceTrajectoryCritic, ReferenceTrajectoryCriticConfig,
};
pub use smoother::{SmootherCritic, SmootherCriticConfig};
pub use twirling::{TwirlingCritic, TwirlingCriticConfig};

use nalgebra::DVector;
use trundle_core::costmap::Costmap;
use trundle_core::error::ConfigError;
use trundle_core::goal_checker::GoalChecker;
use trundle_core::types::{Path, Pose2};

use crate::config::ControllerConfig;
use crate::state::StateBatch;
use crate::trajectories::Trajectories;

// ---------------------------------------------------------------------------
// CriticData
// ---------------------------------------------------------------------------

/// Tick-scoped view bundle passed to every critic.
///
/// Borrows the optimizer-owned buffers plus the host handles for the
/// duration of one scoring pass; critics never retain references past
/// [`Critic::score`].
pub struct CriticData<'a> {
    pub state: &'a StateBatch,
    pub trajectories: &'a Trajectories,
    pub path: &'a Path,
    /// Robot pose the batch was integrated from.
    pub pose: Pose2,
    /// Per-sample cost accumulator.
    pub costs: &'a mut DVector<f64>,
    /// Set by a critic when no sample in the batch is usable.
    pub fail_flag: &'a mut bool,
    pub goal_checker: &'a dyn GoalChecker,
    pub costmap: &'a dyn Costmap,
    pub model_dt: f64,
    furthest_reached: Option<usize>,
}

impl<'a> CriticData<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: &'a StateBatch,
        trajectories: &'a Trajectories,
        path: &'a Path,
        pose: Pose2,
        costs: &'a mut DVector<f64>,
        fail_flag: &'a mut bool,
        goal_checker: &'a dyn GoalChecker,
        costmap: &'a dyn Costmap,
        model_dt: f64,
    ) -> Self {
        Self {
            state,
            trajectories,
            path,
            pose,
            costs,
            fail_flag,
            goal_checker,
            costmap,
            model_dt,
            furthest_reached: None,
        }
    }

    /// Whether the robot is within the goal checker's XY tolerance plus
    /// `margin` of the final path pose. False for empty paths.
    pub fn within_goal_tolerance(&self, margin: f64) -> bool {
        let Some(goal) = self.path.goal() else {
            return false;
        };
        let radius = self.goal_checker.tolerances().xy + margin;
        (self.pose.x - goal.x).hypot(self.pose.y - goal.y) < radius
    }

    /// Index of the furthest path point reached by any sample's final
    /// trajectory point, computed once per tick and cached.
    pub fn furthest_reached_path_point(&mut self) -> usize {
        if let Some(idx) = self.furthest_reached {
            return idx;
        }
        let last = self.trajectories.time_steps() - 1;
        let mut furthest = 0;
        for b in 0..self.trajectories.batch_size() {
            let nearest = nearest_path_index(
                self.path,
                self.trajectories.x[(b, last)],
                self.trajectories.y[(b, last)],
            );
            furthest = furthest.max(nearest);
        }
        self.furthest_reached = Some(furthest);
        furthest
    }
}

/// Index of the path point nearest to `(x, y)`. Returns 0 for paths with a
/// single pose; callers guard against empty paths.
pub fn nearest_path_index(path: &Path, x: f64, y: f64) -> usize {
    let mut best = 0;
    let mut best_dist_sq = f64::MAX;
    for p in 0..path.len() {
        let dx = path.x[p] - x;
        let dy = path.y[p] - y;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = p;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Critic
// ---------------------------------------------------------------------------

/// Closed critic set with direct dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Critic {
    Goal(GoalCritic),
    GoalAngle(GoalAngleCritic),
    ReferenceTrajectory(ReferenceTrajectoryCritic),
    ApproxReferenceTrajectory(ApproxReferenceTrajectoryCritic),
    PathAngle(PathAngleCritic),
    PathFollow(PathFollowCritic),
    PreferForward(PreferForwardCritic),
    Twirling(TwirlingCritic),
    Obstacles(ObstaclesCritic),
    Smoother(SmootherCritic),
}

impl Critic {
    /// Build a critic by its configured name. Unknown names are a
    /// [`ConfigError::UnknownCritic`] carrying the offending name.
    pub fn build(name: &str, config: &ControllerConfig) -> Result<Self, ConfigError> {
        match name {
            "Goal" => Ok(Self::Goal(GoalCritic::new(&config.goal))),
            "GoalAngle" => Ok(Self::GoalAngle(GoalAngleCritic::new(&config.goal_angle))),
            "ReferenceTrajectory" => Ok(Self::ReferenceTrajectory(
                ReferenceTrajectoryCritic::new(&config.reference_trajectory),
            )),
            "ApproxReferenceTrajectory" => Ok(Self::ApproxReferenceTrajectory(
                ApproxReferenceTrajectoryCritic::new(&config.approx_reference_trajectory),
            )),
            "PathAngle" => Ok(Self::PathAngle(PathAngleCritic::new(&config.path_angle))),
            "PathFollow" => Ok(Self::PathFollow(PathFollowCritic::new(&config.path_follow))),
            "PreferForward" => Ok(Self::PreferForward(PreferForwardCritic::new(
                &config.prefer_forward,
            ))),
            "Twirling" => Ok(Self::Twirling(TwirlingCritic::new(&config.twirling))),
            "Obstacles" => Ok(Self::Obstacles(ObstaclesCritic::new(&config.obstacles))),
            "Smoother" => Ok(Self::Smoother(SmootherCritic::new(&config.smoother))),
            other => Err(ConfigError::UnknownCritic(other.to_string())),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Goal(_) => "Goal",
            Self::GoalAngle(_) => "GoalAngle",
            Self::ReferenceTrajectory(_) => "ReferenceTrajectory",
            Self::ApproxReferenceTrajectory(_) => "ApproxReferenceTrajectory",
            Self::PathAngle(_) => "PathAngle",
            Self::PathFollow(_) => "PathFollow",
            Self::PreferForward(_) => "PreferForward",
            Self::Twirling(_) => "Twirling",
            Self::Obstacles(_) => "Obstacles",
            Self::Smoother(_) => "Smoother",
        }
    }

    /// Add this critic's contribution to the per-sample costs.
    pub fn score(&self, data: &mut CriticData<'_>) {
        match self {
            Self::Goal(critic) => critic.score(data),
            Self::GoalAngle(critic) => critic.score(data),
            Self::ReferenceTrajectory(critic) => critic.score(data),
            Self::ApproxReferenceTrajectory(critic) => critic.score(data),
            Self::PathAngle(critic) => critic.score(data),
            Self::PathFollow(critic) => critic.score(data),
            Self::PreferForward(critic) => critic.score(data),
            Self::Twirling(critic) => critic.score(data),
            Self::Obstacles(critic) => critic.score(data),
            Self::Smoother(critic) => critic.score(data),
        }
    }
}

// ---------------------------------------------------------------------------
// CriticManager
// ---------------------------------------------------------------------------

/// Ordered critic list built from the configured names.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticManager {
    critics: Vec<Critic>,
}

impl CriticManager {
    pub fn from_config(config: &ControllerConfig) -> Result<Self, ConfigError> {
        let critics = config
            .critics
            .iter()
            .map(|name| Critic::build(name, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { critics })
    }

    /// Run every critic, in declared order, over the tick's data.
    pub fn evaluate(&self, data: &mut CriticData<'_>) {
        for critic in &self.critics {
            critic.score(data);
        }
    }

    pub fn len(&self) -> usize {
        self.critics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.critics.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.critics.iter().map(Critic::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::state::StateLayout;
    use trundle_test_utils::{FixedGoalChecker, GridCostmap, line_path};

    fn scratch<'a>(
        state: &'a StateBatch,
        trajectories: &'a Trajectories,
        path: &'a Path,
        costs: &'a mut DVector<f64>,
        fail: &'a mut bool,
        checker: &'a FixedGoalChecker,
        costmap: &'a GridCostmap,
    ) -> CriticData<'a> {
        CriticData::new(
            state,
            trajectories,
            path,
            Pose2::default(),
            costs,
            fail,
            checker,
            costmap,
            0.1,
        )
    }

    #[test]
    fn build_rejects_unknown_name() {
        let config = ControllerConfig::default();
        let err = Critic::build("Sideways", &config).unwrap_err();
        assert!(err.to_string().contains("Sideways"));
    }

    #[test]
    fn manager_builds_declared_order() {
        let mut config = ControllerConfig::default();
        config.critics = vec!["Twirling".into(), "Goal".into()];
        let manager = CriticManager::from_config(&config).unwrap();
        let names: Vec<_> = manager.names().collect();
        assert_eq!(names, vec!["Twirling", "Goal"]);
    }

    #[test]
    fn manager_propagates_unknown_critic() {
        let mut config = ControllerConfig::default();
        config.critics = vec!["Goal".into(), "Nope".into()];
        assert!(CriticManager::from_config(&config).is_err());
    }

    #[test]
    fn nearest_path_index_finds_closest() {
        let path = line_path(5, 1.0);
        assert_eq!(nearest_path_index(&path, 2.2, 0.1), 2);
        assert_eq!(nearest_path_index(&path, -3.0, 0.0), 0);
        assert_eq!(nearest_path_index(&path, 9.0, 0.0), 4);
    }

    #[test]
    fn furthest_reached_is_cached_max_over_samples() {
        let state = StateBatch::new(2, 3, 0.1, StateLayout::new(false));
        let mut trajectories = Trajectories::new(2, 3);
        // Sample 0 ends near path point 1, sample 1 near path point 3.
        trajectories.x[(0, 2)] = 1.1;
        trajectories.x[(1, 2)] = 2.9;
        let path = line_path(5, 1.0);
        let mut costs = DVector::zeros(2);
        let mut fail = false;
        let checker = FixedGoalChecker::default();
        let costmap = GridCostmap::open_square(10.0, 0.1);
        let mut data = scratch(
            &state,
            &trajectories,
            &path,
            &mut costs,
            &mut fail,
            &checker,
            &costmap,
        );
        assert_eq!(data.furthest_reached_path_point(), 3);
        assert_eq!(data.furthest_reached_path_point(), 3);
    }

    #[test]
    fn within_goal_tolerance_false_for_empty_path() {
        let state = StateBatch::new(1, 2, 0.1, StateLayout::new(false));
        let trajectories = Trajectories::new(1, 2);
        let path = Path::from_poses(&[]);
        let mut costs = DVector::zeros(1);
        let mut fail = false;
        let checker = FixedGoalChecker::default();
        let costmap = GridCostmap::open_square(10.0, 0.1);
        let data = scratch(
            &state,
            &trajectories,
            &path,
            &mut costs,
            &mut fail,
            &checker,
            &costmap,
        );
        assert!(!data.within_goal_tolerance(10.0));
    }
}

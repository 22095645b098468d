//! Goal distance critic.

use serde::Deserialize;

use crate::critics::CriticData;

/// Parameters for [`GoalCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GoalCriticConfig {
    pub enabled: bool,
    pub cost_weight: f64,
    pub cost_power: u32,
    /// Activation margin added to the goal checker's XY tolerance, meters.
    pub tolerance_margin: f64,
}

impl Default for GoalCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_weight: 5.0,
            cost_power: 1,
            tolerance_margin: 0.5,
        }
    }
}

/// Drives the batch toward the final path pose once the robot is close
/// enough for terminal positioning to matter. Inactive farther out, where
/// the path-tracking critics own the behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalCritic {
    enabled: bool,
    weight: f64,
    power: u32,
    tolerance_margin: f64,
}

impl GoalCritic {
    pub fn new(config: &GoalCriticConfig) -> Self {
        Self {
            enabled: config.enabled,
            weight: config.cost_weight,
            power: config.cost_power,
            tolerance_margin: config.tolerance_margin,
        }
    }

    pub fn score(&self, data: &mut CriticData<'_>) {
        let Some(goal) = data.path.goal() else {
            return;
        };
        if !self.enabled || !data.within_goal_tolerance(self.tolerance_margin) {
            return;
        }

        let last = data.trajectories.time_steps() - 1;
        for b in 0..data.trajectories.batch_size() {
            let dx = data.trajectories.x[(b, last)] - goal.x;
            let dy = data.trajectories.y[(b, last)] - goal.y;
            let dist = dx.hypot(dy);
            data.costs[b] += self.weight * dist.powi(self.power as i32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateBatch, StateLayout};
    use crate::trajectories::Trajectories;
    use nalgebra::DVector;
    use trundle_core::types::{Path, Pose2};
    use trundle_test_utils::{FixedGoalChecker, GridCostmap, line_path, single_pose_path};

    struct World {
        state: StateBatch,
        trajectories: Trajectories,
        path: Path,
        checker: FixedGoalChecker,
        costmap: GridCostmap,
    }

    impl World {
        fn new(batch_size: usize, time_steps: usize, path: Path) -> Self {
            Self {
                state: StateBatch::new(batch_size, time_steps, 0.1, StateLayout::new(false)),
                trajectories: Trajectories::new(batch_size, time_steps),
                path,
                checker: FixedGoalChecker::new(0.25, 0.25),
                costmap: GridCostmap::open_square(20.0, 0.1),
            }
        }

        fn score(&mut self, critic: &GoalCritic, pose: Pose2) -> DVector<f64> {
            let mut costs = DVector::zeros(self.trajectories.batch_size());
            let mut fail = false;
            let mut data = CriticData::new(
                &self.state,
                &self.trajectories,
                &self.path,
                pose,
                &mut costs,
                &mut fail,
                &self.checker,
                &self.costmap,
                0.1,
            );
            critic.score(&mut data);
            costs
        }
    }

    #[test]
    fn closer_final_point_scores_lower() {
        let critic = GoalCritic::new(&GoalCriticConfig::default());
        let mut world = World::new(2, 3, single_pose_path(Pose2::new(0.5, 0.0, 0.0)));
        world.trajectories.x[(0, 2)] = 0.45;
        world.trajectories.x[(1, 2)] = 0.0;
        let costs = world.score(&critic, Pose2::default());
        assert!(costs[0] < costs[1]);
        assert!(costs[1] > 0.0);
    }

    #[test]
    fn inactive_far_from_goal() {
        let critic = GoalCritic::new(&GoalCriticConfig::default());
        // Goal 2 m out, activation radius 0.25 + 0.5.
        let mut world = World::new(2, 3, line_path(5, 0.5));
        world.trajectories.x[(1, 2)] = 1.0;
        let costs = world.score(&critic, Pose2::default());
        assert!(costs.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn disabled_adds_nothing() {
        let critic = GoalCritic::new(&GoalCriticConfig {
            enabled: false,
            ..GoalCriticConfig::default()
        });
        let mut world = World::new(1, 3, single_pose_path(Pose2::default()));
        world.trajectories.x[(0, 2)] = 3.0;
        let costs = world.score(&critic, Pose2::default());
        assert_eq!(costs[0], 0.0);
    }

    #[test]
    fn empty_path_adds_nothing() {
        let critic = GoalCritic::new(&GoalCriticConfig::default());
        let mut world = World::new(1, 3, Path::from_poses(&[]));
        let costs = world.score(&critic, Pose2::default());
        assert_eq!(costs[0], 0.0);
    }
}

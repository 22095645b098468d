//! Obstacle proximity and collision critic.

use serde::Deserialize;
use trundle_core::costmap::{COST_INSCRIBED, COST_UNKNOWN, is_collision};

use crate::critics::CriticData;

/// Parameters for [`ObstaclesCritic`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObstaclesCriticConfig {
    pub enabled: bool,
    pub cost_weight: f64,
    pub cost_power: u32,
    /// Flat penalty for a sample whose trajectory touches a colliding cell.
    /// Dominates the inflation term so colliding samples lose the softmin.
    pub collision_cost: f64,
}

impl Default for ObstaclesCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost_weight: 1.25,
            cost_power: 1,
            collision_cost: 2000.0,
        }
    }
}

/// Scores each sample by the costmap underneath its trajectory.
///
/// Non-colliding samples pay the inflation gradient: the maximum cell cost
/// seen along the trajectory, normalized by the inscribed threshold. A
/// sample that touches a lethal, inscribed, or (untracked) unknown cell pays
/// `collision_cost` instead. Leaving the costmap entirely counts as unknown.
/// When every sample collides the batch is unusable and the fail flag is
/// raised for the optimizer's fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstaclesCritic {
    enabled: bool,
    weight: f64,
    power: u32,
    collision_cost: f64,
}

impl ObstaclesCritic {
    pub fn new(config: &ObstaclesCriticConfig) -> Self {
        Self {
            enabled: config.enabled,
            weight: config.cost_weight,
            power: config.cost_power,
            collision_cost: config.collision_cost,
        }
    }

    pub fn score(&self, data: &mut CriticData<'_>) {
        if !self.enabled {
            return;
        }
        let tracks_unknown = data.costmap.tracks_unknown();
        let time_steps = data.trajectories.time_steps();
        let mut all_collide = true;

        for b in 0..data.trajectories.batch_size() {
            let mut max_cost = 0u8;
            let mut collided = false;
            for t in 0..time_steps {
                let cell = data
                    .costmap
                    .cost_at(data.trajectories.x[(b, t)], data.trajectories.y[(b, t)])
                    .unwrap_or(COST_UNKNOWN);
                max_cost = max_cost.max(cell);
                if is_collision(cell, tracks_unknown) {
                    collided = true;
                    break;
                }
            }

            if collided {
                data.costs[b] += self.collision_cost;
            } else {
                all_collide = false;
                let graded = f64::from(max_cost) / f64::from(COST_INSCRIBED);
                data.costs[b] += self.weight * graded.powi(self.power as i32);
            }
        }

        if all_collide {
            *data.fail_flag = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateBatch, StateLayout};
    use crate::trajectories::Trajectories;
    use nalgebra::DVector;
    use trundle_core::costmap::{COST_FREE, COST_LETHAL};
    use trundle_core::types::Pose2;
    use trundle_test_utils::{FixedGoalChecker, GridCostmap, line_path};

    fn score(
        critic: &ObstaclesCritic,
        trajectories: &Trajectories,
        costmap: &GridCostmap,
    ) -> (DVector<f64>, bool) {
        let state = StateBatch::new(
            trajectories.batch_size(),
            trajectories.time_steps(),
            0.1,
            StateLayout::new(false),
        );
        let path = line_path(3, 0.5);
        let mut costs = DVector::zeros(trajectories.batch_size());
        let mut fail = false;
        let checker = FixedGoalChecker::default();
        let mut data = CriticData::new(
            &state,
            trajectories,
            &path,
            Pose2::default(),
            &mut costs,
            &mut fail,
            &checker,
            costmap,
            0.1,
        );
        critic.score(&mut data);
        (costs, fail)
    }

    #[test]
    fn free_space_costs_nothing() {
        let critic = ObstaclesCritic::new(&ObstaclesCriticConfig::default());
        let trajectories = Trajectories::new(2, 4);
        let costmap = GridCostmap::open_square(10.0, 0.1);
        let (costs, fail) = score(&critic, &trajectories, &costmap);
        assert!(costs.iter().all(|c| *c == 0.0));
        assert!(!fail);
    }

    #[test]
    fn inflated_cells_grade_by_max_cost() {
        let critic = ObstaclesCritic::new(&ObstaclesCriticConfig {
            cost_weight: 1.0,
            ..ObstaclesCriticConfig::default()
        });
        let mut costmap = GridCostmap::open_square(10.0, 0.1);
        costmap.paint_rect(0.9, -0.2, 1.1, 0.2, 100);
        // Sample 0 stays at the origin, sample 1 crosses the inflated patch.
        let mut trajectories = Trajectories::new(2, 4);
        trajectories.x[(1, 3)] = 1.0;
        let (costs, fail) = score(&critic, &trajectories, &costmap);
        assert_eq!(costs[0], 0.0);
        approx::assert_relative_eq!(costs[1], 100.0 / f64::from(COST_INSCRIBED));
        assert!(!fail);
    }

    #[test]
    fn colliding_sample_pays_flat_penalty() {
        let critic = ObstaclesCritic::new(&ObstaclesCriticConfig::default());
        let mut costmap = GridCostmap::open_square(10.0, 0.1);
        costmap.paint_rect(0.9, -0.2, 1.1, 0.2, COST_LETHAL);
        let mut trajectories = Trajectories::new(2, 4);
        trajectories.x[(1, 3)] = 1.0;
        let (costs, fail) = score(&critic, &trajectories, &costmap);
        assert_eq!(costs[0], 0.0);
        assert_eq!(costs[1], 2000.0);
        assert!(!fail, "one clear sample keeps the batch usable");
    }

    #[test]
    fn all_samples_colliding_raises_fail_flag() {
        let critic = ObstaclesCritic::new(&ObstaclesCriticConfig::default());
        let costmap = GridCostmap::uniform(100, 100, 0.1, -5.0, -5.0, COST_LETHAL);
        let trajectories = Trajectories::new(3, 4);
        let (costs, fail) = score(&critic, &trajectories, &costmap);
        assert!(costs.iter().all(|c| *c == 2000.0));
        assert!(fail);
    }

    #[test]
    fn leaving_the_map_counts_as_unknown() {
        let critic = ObstaclesCritic::new(&ObstaclesCriticConfig::default());
        let costmap = GridCostmap::uniform(10, 10, 0.1, 0.0, 0.0, COST_FREE);
        // Straight off the 1 m x 1 m map.
        let mut trajectories = Trajectories::new(1, 2);
        trajectories.x[(0, 1)] = 5.0;
        trajectories.y[(0, 1)] = 5.0;
        trajectories.x[(0, 0)] = 0.5;
        trajectories.y[(0, 0)] = 0.5;
        let (costs, fail) = score(&critic, &trajectories, &costmap);
        assert_eq!(costs[0], 2000.0);
        assert!(fail);
    }

    #[test]
    fn tracked_unknown_is_traversable() {
        let critic = ObstaclesCritic::new(&ObstaclesCriticConfig::default());
        let mut costmap = GridCostmap::uniform(100, 100, 0.1, -5.0, -5.0, COST_UNKNOWN);
        costmap.set_tracks_unknown(true);
        let trajectories = Trajectories::new(1, 3);
        let (_, fail) = score(&critic, &trajectories, &costmap);
        assert!(!fail);
    }
}

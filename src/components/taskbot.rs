//! Antagonist data: good/bad alignment, mandate and patrol paths.

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec2;
use std::sync::Arc;

use crate::components::animation::AnimationTable;

/// The behavioral goal currently driving a task bot. Exactly one is active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mandate {
    /// Chase the agent of another entity.
    HuntAgent(Entity),
    FollowGoodPatrolPath,
    FollowBadPatrolPath,
    /// Walk back to a point on a patrol path before patrolling again.
    ReturnToPositionOnPath(Vec2),
}

#[derive(Component, Clone, Debug)]
pub struct TaskBot {
    /// Change through [`crate::entities::set_task_bot_good`] so the side
    /// effects run.
    pub is_good: bool,
    pub mandate: Mandate,
    pub good_path_points: Vec<Vec2>,
    pub bad_path_points: Vec<Vec2>,
    pub good_animations: Arc<AnimationTable>,
    pub bad_animations: Arc<AnimationTable>,
    /// Time since the steering behavior was last rebuilt while agent
    /// controlled.
    pub time_since_behavior_update: f32,
}

impl TaskBot {
    pub fn new(
        is_good: bool,
        good_path_points: Vec<Vec2>,
        bad_path_points: Vec<Vec2>,
        good_animations: Arc<AnimationTable>,
        bad_animations: Arc<AnimationTable>,
    ) -> Self {
        Self {
            is_good,
            mandate: if is_good {
                Mandate::FollowGoodPatrolPath
            } else {
                Mandate::FollowBadPatrolPath
            },
            good_path_points,
            bad_path_points,
            good_animations,
            bad_animations,
            time_since_behavior_update: 0.0,
        }
    }

    pub fn patrol_path(&self) -> &[Vec2] {
        if self.is_good {
            &self.good_path_points
        } else {
            &self.bad_path_points
        }
    }

    pub fn animations_for(&self, is_good: bool) -> Arc<AnimationTable> {
        if is_good {
            Arc::clone(&self.good_animations)
        } else {
            Arc::clone(&self.bad_animations)
        }
    }
}

/// Point of `path` closest to `position`, or `None` for an empty path.
pub fn closest_point_on_path(position: Vec2, path: &[Vec2]) -> Option<Vec2> {
    path.iter().copied().min_by(|a, b| {
        position
            .distance_squared(*a)
            .total_cmp(&position.distance_squared(*b))
    })
}

/// Attack bookkeeping for ground bots.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct GroundBot {
    /// Where the current attack is aimed, recorded when it was triggered.
    pub target_position: Option<Vec2>,
    /// Distance to the target on the previous attack tick.
    pub last_distance_to_target: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_picks_nearest_waypoint() {
        let path = [Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0)];
        assert_eq!(
            closest_point_on_path(Vec2::new(90.0, 20.0), &path),
            Some(Vec2::new(100.0, 0.0))
        );
        assert_eq!(closest_point_on_path(Vec2::ZERO, &[]), None);
    }

    #[test]
    fn initial_mandate_follows_alignment() {
        let table = Arc::new(AnimationTable::default());
        let good = TaskBot::new(true, vec![], vec![], table.clone(), table.clone());
        let bad = TaskBot::new(false, vec![], vec![], table.clone(), table);
        assert_eq!(good.mandate, Mandate::FollowGoodPatrolPath);
        assert_eq!(bad.mandate, Mandate::FollowBadPatrolPath);
    }
}

//! Goal sets for the task bot mandates.
//!
//! Every behavior reaches for the agent's maximum speed (weight 0.5) and
//! avoids all level obstacles (weight 1.0). On top of that:
//! - patrolling follows and stays on a cyclical path through the patrol
//!   waypoints;
//! - hunting flocks with nearby bad task bots and follows a path found
//!   through the obstacle graph to the target;
//! - returning follows a path found through the obstacle graph to a point.
//!
//! When no path is found the behavior simply has no path goals.

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::resources::gameplayconfig::GameplayConfig;
use crate::resources::obstaclegraph::ObstacleGraph;
use crate::steering::path::SteeringPath;
use crate::steering::{Behavior, Goal};

fn base_behavior(max_speed: f32, graph: &ObstacleGraph, config: &GameplayConfig) -> Behavior {
    let mut behavior = Behavior::new();
    behavior.set_weight(0.5, Goal::ReachTargetSpeed(max_speed));
    behavior.set_weight(
        1.0,
        Goal::AvoidObstacles {
            obstacles: Arc::clone(graph.obstacles()),
            max_prediction_time: config.task_bot.max_prediction_time_for_obstacle_avoidance,
        },
    );
    behavior
}

fn add_follow_and_stay_on_path_goals(behavior: &mut Behavior, path: SteeringPath, config: &GameplayConfig) {
    let path = Arc::new(path);
    let max_prediction_time = config.task_bot.max_prediction_time_when_following_path;
    behavior.set_weight(
        1.0,
        Goal::FollowPath {
            path: Arc::clone(&path),
            max_prediction_time,
            forward: true,
        },
    );
    behavior.set_weight(
        1.0,
        Goal::StayOnPath {
            path,
            max_prediction_time,
        },
    );
}

/// Routes through the obstacle graph and adds path goals when a path with
/// more than one waypoint exists. Returns the waypoints, empty when none.
fn add_goals_to_follow_path(
    behavior: &mut Behavior,
    from: Vec2,
    to: Vec2,
    path_radius: f32,
    graph: &mut ObstacleGraph,
    config: &GameplayConfig,
) -> Vec<Vec2> {
    let points = graph.path_points(from, to, config.task_bot.obstacle_extrusion_radius());
    if points.len() <= 1 {
        return Vec::new();
    }
    add_follow_and_stay_on_path_goals(
        behavior,
        SteeringPath::new(points.clone(), path_radius, false),
        config,
    );
    points
}

pub fn patrolling(
    max_speed: f32,
    patrol_path_points: &[Vec2],
    path_radius: f32,
    graph: &ObstacleGraph,
    config: &GameplayConfig,
) -> Behavior {
    let mut behavior = base_behavior(max_speed, graph, config);
    if !patrol_path_points.is_empty() {
        add_follow_and_stay_on_path_goals(
            &mut behavior,
            SteeringPath::new(patrol_path_points.to_vec(), path_radius, true),
            config,
        );
    }
    behavior
}

pub fn hunting(
    agent_position: Vec2,
    max_speed: f32,
    target_position: Vec2,
    flock_with: SmallVec<[Entity; 8]>,
    path_radius: f32,
    graph: &mut ObstacleGraph,
    config: &GameplayConfig,
) -> (Behavior, Vec<Vec2>) {
    let mut behavior = base_behavior(max_speed, graph, config);

    if !flock_with.is_empty() {
        let flocking = &config.flocking;
        behavior.set_weight(
            flocking.separation_weight,
            Goal::Separate {
                agents: flock_with.clone(),
                max_distance: flocking.separation_radius,
                max_angle: flocking.separation_angle,
            },
        );
        behavior.set_weight(
            flocking.alignment_weight,
            Goal::Align {
                agents: flock_with.clone(),
                max_distance: flocking.alignment_radius,
                max_angle: flocking.alignment_angle,
            },
        );
        behavior.set_weight(
            flocking.cohesion_weight,
            Goal::Cohere {
                agents: flock_with,
                max_distance: flocking.cohesion_radius,
                max_angle: flocking.cohesion_angle,
            },
        );
    }

    let points = add_goals_to_follow_path(
        &mut behavior,
        agent_position,
        target_position,
        path_radius,
        graph,
        config,
    );
    (behavior, points)
}

pub fn returning(
    agent_position: Vec2,
    max_speed: f32,
    end_point: Vec2,
    path_radius: f32,
    graph: &mut ObstacleGraph,
    config: &GameplayConfig,
) -> (Behavior, Vec<Vec2>) {
    let mut behavior = base_behavior(max_speed, graph, config);
    let points = add_goals_to_follow_path(
        &mut behavior,
        agent_position,
        end_point,
        path_radius,
        graph,
        config,
    );
    (behavior, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steering::obstacles::PolygonObstacle;
    use bevy_ecs::world::World;
    use smallvec::smallvec;

    fn graph() -> ObstacleGraph {
        ObstacleGraph::new(
            vec![PolygonObstacle::new(vec![
                Vec2::new(-20.0, -200.0),
                Vec2::new(20.0, -200.0),
                Vec2::new(20.0, 200.0),
                Vec2::new(-20.0, 200.0),
            ])],
            30.0,
        )
    }

    #[test]
    fn patrol_has_speed_avoid_and_path_goals() {
        let config = GameplayConfig::default();
        let behavior = patrolling(
            120.0,
            &[Vec2::new(-300.0, 0.0), Vec2::new(-300.0, 300.0), Vec2::new(-200.0, 300.0)],
            10.0,
            &graph(),
            &config,
        );
        assert_eq!(behavior.goal_count(), 4);
        assert!(behavior.has_path_goals());
        assert!(!behavior.has_flocking_goals());
    }

    #[test]
    fn hunting_without_path_degrades_to_avoidance() {
        let config = GameplayConfig::default();
        let mut graph = graph();
        let before = graph.node_count();
        // target inside the wall: unreachable
        let (behavior, points) = hunting(
            Vec2::new(-300.0, 0.0),
            120.0,
            Vec2::new(0.0, 0.0),
            SmallVec::new(),
            20.0,
            &mut graph,
            &config,
        );
        assert!(points.is_empty());
        assert!(!behavior.has_path_goals());
        assert_eq!(behavior.goal_count(), 2);
        assert_eq!(graph.node_count(), before);
    }

    #[test]
    fn hunting_with_flock_adds_flocking_goals() {
        let config = GameplayConfig::default();
        let mut world = World::new();
        let buddy = world.spawn_empty().id();
        let mut graph = graph();
        let (behavior, points) = hunting(
            Vec2::new(-300.0, 0.0),
            120.0,
            Vec2::new(300.0, 0.0),
            smallvec![buddy],
            20.0,
            &mut graph,
            &config,
        );
        assert!(points.len() >= 3);
        assert!(behavior.has_flocking_goals());
        assert_eq!(behavior.goal_count(), 7);
    }
}

//! Steering behaviors for task bot agents.
//!
//! A [`Behavior`] is a weighted list of [`Goal`]s. Each tick the solver in
//! [`solver`] asks every goal for a steering contribution, sums them by
//! weight and hands the force to [`Agent::integrate`].
//!
//! Submodules overview:
//! - [`behavior`] – goal sets for patrolling, hunting and returning to a path
//! - [`obstacles`] – static polygon obstacles
//! - [`path`] – polylines with a corridor radius
//! - [`solver`] – per-goal steering functions and their weighted sum
//!
//! [`Agent::integrate`]: crate::components::agent::Agent::integrate

pub mod behavior;
pub mod obstacles;
pub mod path;
pub mod solver;

use bevy_ecs::prelude::Entity;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::steering::obstacles::PolygonObstacle;
use crate::steering::path::SteeringPath;

#[derive(Debug, Clone)]
pub enum Goal {
    /// Accelerate or brake towards a speed along the current heading.
    ReachTargetSpeed(f32),
    AvoidObstacles {
        obstacles: Arc<[PolygonObstacle]>,
        max_prediction_time: f32,
    },
    Separate {
        agents: SmallVec<[Entity; 8]>,
        max_distance: f32,
        max_angle: f32,
    },
    Align {
        agents: SmallVec<[Entity; 8]>,
        max_distance: f32,
        max_angle: f32,
    },
    Cohere {
        agents: SmallVec<[Entity; 8]>,
        max_distance: f32,
        max_angle: f32,
    },
    FollowPath {
        path: Arc<SteeringPath>,
        max_prediction_time: f32,
        forward: bool,
    },
    StayOnPath {
        path: Arc<SteeringPath>,
        max_prediction_time: f32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Behavior {
    goals: Vec<(Goal, f32)>,
}

impl Behavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_weight(&mut self, weight: f32, goal: Goal) {
        self.goals.push((goal, weight));
    }

    pub fn goals(&self) -> &[(Goal, f32)] {
        &self.goals
    }

    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn has_path_goals(&self) -> bool {
        self.goals
            .iter()
            .any(|(goal, _)| matches!(goal, Goal::FollowPath { .. } | Goal::StayOnPath { .. }))
    }

    pub fn has_flocking_goals(&self) -> bool {
        self.goals.iter().any(|(goal, _)| {
            matches!(goal, Goal::Separate { .. } | Goal::Align { .. } | Goal::Cohere { .. })
        })
    }
}

//! Weighted steering solver.
//!
//! Every goal yields a contribution of length at most one. The weighted sum
//! is the steering force handed to the agent's integrator.

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::geometry::{heading, segment_hits_polygon};
use crate::steering::path::SteeringPath;
use crate::steering::{Behavior, Goal};

/// Kinematic state of an agent as seen by the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringAgent {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub max_speed: f32,
    pub radius: f32,
}

impl SteeringAgent {
    fn speed(&self) -> f32 {
        self.velocity.length()
    }

    fn forward(&self) -> Vec2 {
        self.velocity.try_normalize().unwrap_or_else(|| heading(self.rotation))
    }
}

pub fn steering_force(
    agent: &SteeringAgent,
    behavior: &Behavior,
    neighbours: &FxHashMap<Entity, SteeringAgent>,
) -> Vec2 {
    behavior
        .goals()
        .iter()
        .map(|(goal, weight)| goal_contribution(agent, goal, neighbours) * *weight)
        .sum()
}

pub fn goal_contribution(
    agent: &SteeringAgent,
    goal: &Goal,
    neighbours: &FxHashMap<Entity, SteeringAgent>,
) -> Vec2 {
    match goal {
        Goal::ReachTargetSpeed(speed) => {
            let scale = agent.max_speed.max(1.0);
            agent.forward() * ((speed - agent.speed()) / scale).clamp(-1.0, 1.0)
        }
        Goal::AvoidObstacles {
            obstacles,
            max_prediction_time,
        } => {
            let ahead = agent.position + agent.velocity * *max_prediction_time;
            let look_ahead = agent.speed() * max_prediction_time + agent.radius;
            let mut total = Vec2::ZERO;
            for obstacle in obstacles.iter() {
                let Some(closest) = obstacle.closest_boundary_point(agent.position) else {
                    continue;
                };
                let distance = agent.position.distance(closest);
                let threatened = distance < agent.radius
                    || segment_hits_polygon(agent.position, ahead, &obstacle.vertices);
                if !threatened {
                    continue;
                }
                let away = if obstacle.contains(agent.position) {
                    closest - agent.position
                } else {
                    agent.position - closest
                };
                let urgency = if look_ahead > 0.0 {
                    (1.0 - distance / look_ahead).clamp(0.1, 1.0)
                } else {
                    1.0
                };
                total += away.normalize_or_zero() * urgency;
            }
            total.clamp_length_max(1.0)
        }
        Goal::Separate {
            agents,
            max_distance,
            max_angle,
        } => {
            let mut total = Vec2::ZERO;
            for (offset, distance, _) in flock_members(agent, agents, *max_distance, *max_angle, neighbours) {
                total -= offset / distance * (1.0 - distance / max_distance);
            }
            total.clamp_length_max(1.0)
        }
        Goal::Align {
            agents,
            max_distance,
            max_angle,
        } => {
            let members: Vec<_> =
                flock_members(agent, agents, *max_distance, *max_angle, neighbours).collect();
            if members.is_empty() {
                return Vec2::ZERO;
            }
            let average: Vec2 = members.iter().map(|(_, _, other)| other.forward()).sum::<Vec2>()
                / members.len() as f32;
            (average.normalize_or_zero() - agent.forward()).clamp_length_max(1.0)
        }
        Goal::Cohere {
            agents,
            max_distance,
            max_angle,
        } => {
            let members: Vec<_> =
                flock_members(agent, agents, *max_distance, *max_angle, neighbours).collect();
            if members.is_empty() {
                return Vec2::ZERO;
            }
            let centroid: Vec2 = members.iter().map(|(_, _, other)| other.position).sum::<Vec2>()
                / members.len() as f32;
            (centroid - agent.position).normalize_or_zero()
        }
        Goal::FollowPath {
            path,
            max_prediction_time,
            forward,
        } => follow_path(agent, path, *max_prediction_time, *forward),
        Goal::StayOnPath {
            path,
            max_prediction_time,
        } => {
            let predicted = agent.position + agent.velocity * *max_prediction_time;
            let Some((_, nearest)) = path.closest(predicted) else {
                return Vec2::ZERO;
            };
            let distance = predicted.distance(nearest);
            if distance <= path.radius {
                return Vec2::ZERO;
            }
            let overshoot = if path.radius > 0.0 {
                ((distance - path.radius) / path.radius).min(1.0)
            } else {
                1.0
            };
            (nearest - predicted).normalize_or_zero() * overshoot
        }
    }
}

fn follow_path(agent: &SteeringAgent, path: &SteeringPath, max_prediction_time: f32, forward: bool) -> Vec2 {
    let predicted = agent.position + agent.velocity * max_prediction_time;
    let Some((parameter, _)) = path.closest(predicted) else {
        return Vec2::ZERO;
    };
    let ahead = (agent.speed() * max_prediction_time * 0.5).max(path.radius * 2.0);
    let target_parameter = if forward {
        parameter + ahead
    } else {
        parameter - ahead
    };
    let Some(target) = path.point_at(target_parameter) else {
        return Vec2::ZERO;
    };
    seek(agent, target)
}

fn seek(agent: &SteeringAgent, target: Vec2) -> Vec2 {
    let scale = agent.max_speed.max(1.0);
    let desired = (target - agent.position).normalize_or_zero() * agent.max_speed;
    ((desired - agent.velocity) / scale).clamp_length_max(1.0)
}

/// Neighbours in `agents` within `max_distance` and within `max_angle` of the
/// agent's heading, as `(offset, distance, neighbour)`.
fn flock_members<'a>(
    agent: &'a SteeringAgent,
    agents: &'a [Entity],
    max_distance: f32,
    max_angle: f32,
    neighbours: &'a FxHashMap<Entity, SteeringAgent>,
) -> impl Iterator<Item = (Vec2, f32, &'a SteeringAgent)> + 'a {
    let forward = agent.forward();
    agents.iter().filter_map(move |entity| {
        let other = neighbours.get(entity)?;
        let offset = other.position - agent.position;
        let distance = offset.length();
        if distance == 0.0 || distance > max_distance {
            return None;
        }
        let cosine = (forward.dot(offset) / distance).clamp(-1.0, 1.0);
        if cosine.acos() > max_angle {
            return None;
        }
        Some((offset, distance, other))
    })
}

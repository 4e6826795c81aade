//! Steering agent attached to task bots and the player.
//!
//! The agent lives `offset` away from the entity's [`MapPosition`]. Before a
//! steering step the agent is synced from the entity; after the step an
//! agent-controlled task bot copies it back.
//!
//! [`MapPosition`]: crate::components::mapposition::MapPosition

use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::geometry::{angle_of, heading};
use crate::steering::Behavior;
use crate::steering::solver::SteeringAgent;

#[derive(Component, Clone, Debug)]
pub struct Agent {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub max_speed: f32,
    pub max_acceleration: f32,
    pub mass: f32,
    pub radius: f32,
    pub offset: Vec2,
    /// Goals currently steering the agent. `None` leaves it coasting.
    pub behavior: Option<Behavior>,
    /// Waypoints of the last computed path, for debug overlays.
    pub path_points: Vec<Vec2>,
}

impl Agent {
    pub fn new(radius: f32, offset: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            max_speed: 0.0,
            max_acceleration: 0.0,
            mass: 1.0,
            radius,
            offset,
            behavior: None,
            path_points: Vec::new(),
        }
    }

    pub fn with_limits(mut self, max_speed: f32, max_acceleration: f32, mass: f32) -> Self {
        self.max_speed = max_speed;
        self.max_acceleration = max_acceleration;
        self.mass = mass;
        self
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Unit heading: the velocity direction when moving, the rotation
    /// otherwise.
    pub fn forward(&self) -> Vec2 {
        self.velocity.try_normalize().unwrap_or_else(|| heading(self.rotation))
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    pub fn sync_from_node(&mut self, node_position: Vec2, node_rotation: f32) {
        self.position = node_position + self.offset;
        self.rotation = node_rotation;
    }

    pub fn node_position(&self) -> Vec2 {
        self.position - self.offset
    }

    pub fn steering_agent(&self) -> SteeringAgent {
        SteeringAgent {
            position: self.position,
            velocity: self.velocity,
            rotation: self.rotation,
            max_speed: self.max_speed,
            radius: self.radius,
        }
    }

    /// Integrate one step from a steering force.
    pub fn integrate(&mut self, force: Vec2, dt: f32) {
        let mass = if self.mass > 0.0 { self.mass } else { 1.0 };
        let acceleration = (force * self.max_acceleration / mass).clamp_length_max(self.max_acceleration);
        self.velocity = (self.velocity + acceleration * dt).clamp_length_max(self.max_speed);
        self.position += self.velocity * dt;
        if self.velocity.length_squared() > 0.0 {
            self.rotation = angle_of(self.velocity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_respects_speed_limit() {
        let mut agent = Agent::new(35.0, Vec2::new(0.0, -25.0)).with_limits(120.0, 300.0, 0.25);
        for _ in 0..120 {
            agent.integrate(Vec2::X, 1.0 / 60.0);
        }
        assert!(agent.speed() <= 120.0 + 1e-3);
        assert!(agent.position.x > 0.0);
        assert_eq!(agent.rotation, 0.0);
    }

    #[test]
    fn node_sync_applies_offset() {
        let mut agent = Agent::new(15.0, Vec2::new(0.0, -25.0));
        agent.sync_from_node(Vec2::new(10.0, 100.0), 1.0);
        assert_eq!(agent.position, Vec2::new(10.0, 75.0));
        assert_eq!(agent.node_position(), Vec2::new(10.0, 100.0));
    }
}

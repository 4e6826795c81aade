//! One-shot movement intents and their resolution into motion.
//!
//! An FSM state or the [`Input`](crate::components::input::Input) component
//! writes at most one translation and one rotation intent per tick. The
//! movement stage resolves them with [`Movement::resolve`], applies the step
//! to the entity and clears both intents, so a caller that wants sustained
//! motion must resupply its intent every tick.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use std::f32::consts::PI;

use crate::components::animation::AnimationState;
use crate::geometry::{angle_of, heading};

/// A displacement, either in world axes or relative to the current facing.
///
/// For relative translation, `x` is forward/backward and only its sign and
/// the vector length matter. For relative rotation only the sign of `y` is
/// used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementIntent {
    pub displacement: Vec2,
    pub relative_to_orientation: bool,
}

impl MovementIntent {
    pub fn absolute(displacement: Vec2) -> Self {
        Self {
            displacement,
            relative_to_orientation: false,
        }
    }

    pub fn relative(displacement: Vec2) -> Self {
        Self {
            displacement,
            relative_to_orientation: true,
        }
    }
}

/// Result of resolving one tick of intents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementStep {
    pub position: Vec2,
    pub rotation: f32,
    /// Idle after a pure rotation, walk forward/backward after a translation.
    pub animation_state: Option<AnimationState>,
}

#[derive(Component, Clone, Debug)]
pub struct Movement {
    pub next_translation: Option<MovementIntent>,
    pub next_rotation: Option<MovementIntent>,
    /// World units per second at full displacement.
    pub movement_speed: f32,
    /// Radians per second for relative rotation.
    pub angular_speed: f32,
}

impl Movement {
    pub fn new(movement_speed: f32, angular_speed: f32) -> Self {
        Self {
            next_translation: None,
            next_rotation: None,
            movement_speed,
            angular_speed,
        }
    }

    pub fn clear_intents(&mut self) {
        self.next_translation = None;
        self.next_rotation = None;
    }

    /// Resolve the pending intents for a body at `position` facing `rotation`.
    ///
    /// Displacements longer than one are normalised; shorter ones scale the
    /// distance moved proportionally. Does not clear the intents.
    pub fn resolve(&self, position: Vec2, rotation: f32, dt: f32) -> MovementStep {
        let mut step = MovementStep {
            position,
            rotation,
            animation_state: None,
        };

        let mut rotation_held = false;
        if let Some(angle) = self
            .next_rotation
            .and_then(|intent| self.angle_for_rotation(intent, rotation, dt))
        {
            step.rotation = angle;
            step.animation_state = Some(AnimationState::Idle);
            rotation_held = true;
        }

        if let Some(intent) = self.next_translation {
            if let Some((displacement, keeps_facing)) =
                self.absolute_displacement(intent, step.rotation)
            {
                let distance =
                    displacement.length().min(1.0) * self.movement_speed * dt;
                let moved = heading(angle_of(displacement)) * distance;
                step.position = position + moved;
                if !rotation_held && !keeps_facing {
                    step.rotation = angle_of(displacement);
                }
                let forward = heading(step.rotation).dot(moved) > 0.0;
                step.animation_state = Some(if forward {
                    AnimationState::WalkForward
                } else {
                    AnimationState::WalkBackward
                });
            }
        }

        step
    }

    fn angle_for_rotation(&self, intent: MovementIntent, rotation: f32, dt: f32) -> Option<f32> {
        if intent.displacement == Vec2::ZERO {
            return None;
        }
        if intent.relative_to_orientation {
            let component = intent.displacement.y;
            if component == 0.0 {
                return None;
            }
            let direction = if component > 0.0 { 1.0 } else { -1.0 };
            Some(rotation + direction * self.angular_speed * dt)
        } else {
            Some(angle_of(intent.displacement))
        }
    }

    /// World-axis displacement for an intent, plus whether the intent pins
    /// the current facing (relative strafing never turns the body).
    fn absolute_displacement(&self, intent: MovementIntent, rotation: f32) -> Option<(Vec2, bool)> {
        let displacement = intent.displacement;
        if displacement == Vec2::ZERO {
            return None;
        }
        if !intent.relative_to_orientation {
            return Some((displacement, false));
        }
        if displacement.x == 0.0 {
            return None;
        }
        let mut angle = rotation;
        if displacement.x < 0.0 {
            angle += PI;
        }
        Some((heading(angle) * displacement.length(), true))
    }
}

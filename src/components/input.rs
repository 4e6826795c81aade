//! External control input bridged into movement intents.

use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::components::movement::MovementIntent;

/// Latest translation/rotation reported by an input source.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    pub translation: Option<MovementIntent>,
    pub rotation: Option<MovementIntent>,
    pub allows_strafing: bool,
}

impl InputState {
    pub const NO_INPUT: InputState = InputState {
        translation: None,
        rotation: None,
        allows_strafing: false,
    };
}

/// Accepts normalised displacement vectors from a control source.
///
/// While enabled, the input stage copies `state` into the entity's
/// [`Movement`](crate::components::movement::Movement) intents every tick.
#[derive(Component, Clone, Debug)]
pub struct Input {
    pub enabled: bool,
    pub state: InputState,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            enabled: true,
            state: InputState::default(),
        }
    }
}

impl Input {
    pub fn did_update_displacement(&mut self, displacement: Vec2) {
        self.state.translation = Some(MovementIntent::absolute(displacement));
    }

    pub fn did_update_angular_displacement(&mut self, displacement: Vec2) {
        self.state.rotation = Some(MovementIntent::absolute(displacement));
    }

    pub fn did_update_relative_displacement(&mut self, displacement: Vec2) {
        self.state.translation = Some(MovementIntent::relative(displacement));
    }

    pub fn did_update_relative_angular_displacement(&mut self, displacement: Vec2) {
        self.state.rotation = Some(MovementIntent::relative(displacement));
    }

    /// State to hand to movement this tick.
    pub fn applied_state(&self) -> InputState {
        if self.enabled {
            self.state
        } else {
            InputState::NO_INPUT
        }
    }
}

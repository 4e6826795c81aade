//! State machines of every entity kind.
//!
//! Each kind has a plain enum implementing
//! [`MachineState`](crate::components::intelligence::MachineState) whose
//! hooks are free functions over `(&mut World, Entity)`. The transition
//! graphs:
//!
//! - [`player`]: Appear -> PlayerControlled <-> Hit -> (PlayerControlled |
//!   Recharging) -> PlayerControlled
//! - [`taskbot`]: AgentControlled -> RotateToAttack -> PreAttack -> Attack ->
//!   AgentControlled, any state -> Zapped -> AgentControlled
//! - [`moogle`]: Captive -> Free
//! - [`trap`]: Set -> Sprung -> Set
//!
//! Hooks assume the entity was assembled by one of the
//! [`crate::entities`] constructors; they silently skip components that are
//! absent rather than panicking.

pub mod moogle;
pub mod player;
pub mod taskbot;
pub mod trap;

use std::sync::Arc;

use bevy_ecs::prelude::*;

use crate::components::animation::{Animation, AnimationState};
use crate::components::entitykind::EntityKind;
use crate::components::movement::Movement;
use crate::components::orientation::Orientation;
use crate::components::sprite::Sprite;
use crate::resources::animationstore::{AnimationSet, AnimationStore};

pub use moogle::MoogleState;
pub use player::PlayerBotState;
pub use taskbot::TaskBotState;
pub use trap::TrapState;

/// Static texture shown while the body of `entity` is hidden, picked for its
/// current facing.
pub(crate) fn appear_texture(world: &World, entity: Entity) -> Option<Arc<str>> {
    let kind = *world.get::<EntityKind>(entity)?;
    let direction = world.get::<Orientation>(entity)?.compass_direction();
    world
        .get_resource::<AnimationStore>()?
        .get(AnimationSet::for_kind(kind))?
        .appear_texture(direction)
}

pub(crate) fn request_animation(world: &mut World, entity: Entity, state: AnimationState) {
    if let Some(mut animation) = world.get_mut::<Animation>(entity) {
        animation.request(state);
    }
}

pub(crate) fn clear_movement_intents(world: &mut World, entity: Entity) {
    if let Some(mut movement) = world.get_mut::<Movement>(entity) {
        movement.clear_intents();
    }
}

/// Hide the body behind its appear texture.
pub(crate) fn show_appear_overlay(world: &mut World, entity: Entity) {
    let texture = appear_texture(world, entity);
    if let Some(mut sprite) = world.get_mut::<Sprite>(entity) {
        sprite.show_overlay(texture);
    }
}

pub(crate) fn hide_overlay(world: &mut World, entity: Entity) {
    if let Some(mut sprite) = world.get_mut::<Sprite>(entity) {
        sprite.hide_overlay();
    }
}

//! Moogle states. A moogle waits behind its appear texture until the player
//! touches it; once free it leaves the level.

use bevy_ecs::prelude::*;

use crate::components::intelligence::{MachineState, StateHooks, TransitionCheck};
use crate::components::physics::PhysicsBody;
use crate::components::sprite::Sprite;
use crate::states::{hide_overlay, show_appear_overlay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoogleState {
    Captive,
    Free,
}

impl MachineState for MoogleState {
    fn hooks(self) -> StateHooks<Self> {
        match self {
            MoogleState::Captive => StateHooks {
                enter: Some(|world, entity, _| show_appear_overlay(world, entity)),
                update: None,
                exit: Some(|world, entity, _| hide_overlay(world, entity)),
            },
            MoogleState::Free => StateHooks {
                enter: Some(free_enter),
                update: None,
                exit: None,
            },
        }
    }

    fn check_transition(self, next: Self) -> TransitionCheck {
        match self {
            MoogleState::Captive => TransitionCheck::from_bool(next == MoogleState::Free),
            MoogleState::Free => TransitionCheck::Accept,
        }
    }
}

/// A freed moogle leaves: nothing is drawn and nothing can touch it.
fn free_enter(world: &mut World, entity: Entity, _previous: Option<MoogleState>) {
    if let Some(mut sprite) = world.get_mut::<Sprite>(entity) {
        sprite.overlay = None;
        sprite.body_hidden = true;
    }
    if let Ok(mut entity) = world.get_entity_mut(entity) {
        entity.remove::<PhysicsBody>();
    }
}

/// Moogles ignore contacts; rescue is driven by the player's state.
pub fn contact_began(_world: &mut World, _entity: Entity, _other: Entity) {}

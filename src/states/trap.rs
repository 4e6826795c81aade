//! Trap states. A set trap is invisible and drains whatever touches it, then
//! shows itself until rearmed.

use bevy_ecs::prelude::*;

use crate::components::intelligence::{MachineState, StateHooks, TransitionCheck};
use crate::components::physics::PhysicsBody;
use crate::components::sprite::Sprite;
use crate::entities::apply_damage;
use crate::resources::gameplayconfig::GameplayConfig;
use crate::states::{hide_overlay, show_appear_overlay};
use crate::systems::intelligence::enter_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapState {
    Set,
    Sprung,
}

impl MachineState for TrapState {
    fn hooks(self) -> StateHooks<Self> {
        match self {
            TrapState::Set => StateHooks {
                enter: Some(set_enter),
                update: Some(set_update),
                exit: Some(|world, entity, _| {
                    if let Some(mut sprite) = world.get_mut::<Sprite>(entity) {
                        sprite.body_hidden = false;
                    }
                }),
            },
            TrapState::Sprung => StateHooks {
                enter: Some(|world, entity, _| show_appear_overlay(world, entity)),
                update: None,
                exit: Some(|world, entity, _| hide_overlay(world, entity)),
            },
        }
    }

    fn check_transition(self, next: Self) -> TransitionCheck {
        TransitionCheck::from_bool(match self {
            TrapState::Set => next == TrapState::Sprung,
            TrapState::Sprung => next == TrapState::Set,
        })
    }
}

fn set_enter(world: &mut World, entity: Entity, _previous: Option<TrapState>) {
    if let Some(mut sprite) = world.get_mut::<Sprite>(entity) {
        sprite.overlay = None;
        sprite.body_hidden = true;
    }
}

fn set_update(world: &mut World, entity: Entity, _dt: f32) {
    let contacts: Vec<Entity> = world
        .get::<PhysicsBody>(entity)
        .map(|body| body.all_contacted_bodies().to_vec())
        .unwrap_or_default();
    if contacts.is_empty() {
        return;
    }
    let charge_loss = world.resource::<GameplayConfig>().trap.charge_loss_per_contact;
    for other in contacts {
        apply_damage(world, other, charge_loss);
    }
    enter_state(world, entity, TrapState::Sprung);
}

/// Traps react to contacts from their `Set` update instead.
pub fn contact_began(_world: &mut World, _entity: Entity, _other: Entity) {}

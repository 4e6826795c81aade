//! Player bot states.

use bevy_ecs::prelude::*;

use crate::components::animation::AnimationState;
use crate::components::charge::Charge;
use crate::components::entitykind::EntityKind;
use crate::components::input::Input;
use crate::components::intelligence::{Intelligence, MachineState, StateHooks, TransitionCheck};
use crate::components::physics::PhysicsBody;
use crate::components::playerbot::PlayerBot;
use crate::entities::set_captive;
use crate::resources::gameplayconfig::GameplayConfig;
use crate::states::{clear_movement_intents, hide_overlay, request_animation, show_appear_overlay};
use crate::systems::intelligence::{current_state, enter_state};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerBotState {
    /// Beaming in: body hidden behind the teleport texture, input disabled.
    Appear,
    PlayerControlled,
    Hit,
    /// Powered down; charge refills after a delay.
    Recharging,
}

impl MachineState for PlayerBotState {
    fn hooks(self) -> StateHooks<Self> {
        match self {
            PlayerBotState::Appear => StateHooks {
                enter: Some(appear_enter),
                update: Some(appear_update),
                exit: Some(appear_exit),
            },
            PlayerBotState::PlayerControlled => StateHooks {
                enter: Some(controlled_enter),
                update: Some(controlled_update),
                exit: Some(controlled_exit),
            },
            PlayerBotState::Hit => StateHooks {
                enter: Some(|world, entity, _| request_animation(world, entity, AnimationState::Hit)),
                update: Some(hit_update),
                exit: None,
            },
            PlayerBotState::Recharging => StateHooks {
                enter: Some(|world, entity, _| request_animation(world, entity, AnimationState::Inactive)),
                update: Some(recharging_update),
                exit: None,
            },
        }
    }

    fn check_transition(self, next: Self) -> TransitionCheck {
        use PlayerBotState::*;
        TransitionCheck::from_bool(match self {
            Appear => next == PlayerControlled,
            PlayerControlled => matches!(next, Hit | Recharging),
            Hit => matches!(next, PlayerControlled | Recharging),
            Recharging => next == PlayerControlled,
        })
    }
}

fn time_in_state(world: &World, entity: Entity) -> f32 {
    world
        .get::<Intelligence<PlayerBotState>>(entity)
        .map_or(0.0, |intelligence| intelligence.time_in_state)
}

fn set_input_enabled(world: &mut World, entity: Entity, enabled: bool) {
    if let Some(mut input) = world.get_mut::<Input>(entity) {
        input.enabled = enabled;
    }
}

fn appear_enter(world: &mut World, entity: Entity, _previous: Option<PlayerBotState>) {
    show_appear_overlay(world, entity);
    set_input_enabled(world, entity, false);
}

fn appear_update(world: &mut World, entity: Entity, _dt: f32) {
    let duration = world.resource::<GameplayConfig>().player_bot.appear_duration;
    if time_in_state(world, entity) > duration {
        enter_state(world, entity, PlayerBotState::PlayerControlled);
    }
}

fn appear_exit(world: &mut World, entity: Entity, _next: PlayerBotState) {
    hide_overlay(world, entity);
    set_input_enabled(world, entity, true);
}

fn controlled_enter(world: &mut World, entity: Entity, _previous: Option<PlayerBotState>) {
    set_input_enabled(world, entity, true);
}

fn controlled_update(world: &mut World, entity: Entity, _dt: f32) {
    request_animation(world, entity, AnimationState::Idle);

    let contacts: Vec<Entity> = world
        .get::<PhysicsBody>(entity)
        .map(|body| body.all_contacted_bodies().to_vec())
        .unwrap_or_default();
    for other in contacts {
        if world.get::<EntityKind>(other) == Some(&EntityKind::Moogle) {
            set_captive(world, other, false);
        }
    }
}

fn controlled_exit(world: &mut World, entity: Entity, _next: PlayerBotState) {
    set_input_enabled(world, entity, false);
    clear_movement_intents(world, entity);
}

fn hit_update(world: &mut World, entity: Entity, _dt: f32) {
    let duration = world.resource::<GameplayConfig>().player_bot.hit_state_duration;
    if time_in_state(world, entity) < duration {
        return;
    }
    let powered_down = world.get::<PlayerBot>(entity).is_some_and(|p| p.powered_down);
    if powered_down {
        enter_state(world, entity, PlayerBotState::Recharging);
    } else {
        enter_state(world, entity, PlayerBotState::PlayerControlled);
    }
}

fn recharging_update(world: &mut World, entity: Entity, dt: f32) {
    let (delay, rate) = {
        let config = &world.resource::<GameplayConfig>().player_bot;
        (config.recharge_delay_when_inactive, config.recharge_amount_per_second)
    };
    if time_in_state(world, entity) < delay {
        return;
    }
    let fully_charged = {
        let Some(mut charge) = world.get_mut::<Charge>(entity) else {
            return;
        };
        charge.add_charge(rate * dt as f64);
        charge.is_fully_charged()
    };
    if fully_charged {
        if let Some(mut player) = world.get_mut::<PlayerBot>(entity) {
            player.powered_down = false;
        }
        enter_state(world, entity, PlayerBotState::PlayerControlled);
    }
}

/// Owner reaction to a strict charge loss.
pub fn charge_lost(world: &mut World, entity: Entity) {
    let has_charge = world.get::<Charge>(entity).is_some_and(Charge::has_charge);
    if has_charge {
        enter_state(world, entity, PlayerBotState::Hit);
    } else {
        if let Some(mut player) = world.get_mut::<PlayerBot>(entity) {
            player.powered_down = true;
        }
        enter_state(world, entity, PlayerBotState::Recharging);
    }
}

/// Task bots may only hunt a player that is in control or reeling from a hit.
pub fn is_targetable(world: &World, entity: Entity) -> bool {
    matches!(
        current_state::<PlayerBotState>(world, entity),
        Some(PlayerBotState::PlayerControlled) | Some(PlayerBotState::Hit)
    )
}

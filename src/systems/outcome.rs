//! Level outcome stage: count the clock down and decide success or failure.
//!
//! Conditions are checked in a fixed order and the first terminal phase
//! entered sticks:
//!
//! 1. success when no moogle is held captive, else failure when time is up
//! 2. success when every task bot is good, else failure when time is up
//! 3. failure when the player is powered down
use bevy_ecs::prelude::*;
use log::info;

use crate::components::captive::Captive;
use crate::components::playerbot::PlayerBot;
use crate::components::taskbot::TaskBot;
use crate::events::leveloutcome::LevelPhaseChangedEvent;
use crate::resources::leveloutcome::{LevelOutcome, LevelPhase};
use crate::resources::worldtime::WorldTime;

/// Move the level to `next`, logging and announcing the change.
pub fn change_level_phase(world: &mut World, next: LevelPhase) -> bool {
    let Some(mut outcome) = world.get_resource_mut::<LevelOutcome>() else {
        return false;
    };
    let from = outcome.phase();
    if !outcome.enter(next) {
        return false;
    }
    info!("Level phase {:?} -> {:?} ({} left)", from, next, outcome.time_remaining_string());
    world.trigger(LevelPhaseChangedEvent { from, to: next });
    true
}

pub fn level_outcome_system(world: &mut World) {
    let dt = world.resource::<WorldTime>().delta;
    let time_remaining = {
        let Some(mut outcome) = world.get_resource_mut::<LevelOutcome>() else {
            return;
        };
        if !outcome.is_active() {
            return;
        }
        outcome.time_remaining -= dt;
        outcome.time_remaining
    };
    let time_is_up = time_remaining <= 0.0;

    let moogles_free = !world.query::<&Captive>().iter(world).any(|captive| captive.is_captive);
    let all_task_bots_good = world.query::<&TaskBot>().iter(world).all(|task_bot| task_bot.is_good);
    let player_powered_down = world.query::<&PlayerBot>().iter(world).any(|player| player.powered_down);

    if moogles_free {
        change_level_phase(world, LevelPhase::Success);
    } else if time_is_up {
        change_level_phase(world, LevelPhase::Fail);
    }
    if all_task_bots_good {
        change_level_phase(world, LevelPhase::Success);
    } else if time_is_up {
        change_level_phase(world, LevelPhase::Fail);
    }
    if player_powered_down {
        change_level_phase(world, LevelPhase::Fail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn bad_task_bot() -> TaskBot {
        TaskBot::new(false, Vec::new(), Vec::new(), Arc::default(), Arc::default())
    }

    fn world_with_clock(time_limit: f32) -> World {
        let mut world = World::new();
        world.insert_resource(LevelOutcome::new(time_limit));
        world.insert_resource(WorldTime {
            delta: 1.0,
            ..WorldTime::default()
        });
        world
    }

    #[test]
    fn running_out_of_time_fails() {
        let mut world = world_with_clock(2.0);
        world.spawn(Captive::default());
        world.spawn(bad_task_bot());
        level_outcome_system(&mut world);
        assert!(world.resource::<LevelOutcome>().is_active());
        level_outcome_system(&mut world);
        assert_eq!(world.resource::<LevelOutcome>().phase(), LevelPhase::Fail);
    }

    #[test]
    fn freeing_every_moogle_wins_even_when_time_is_up() {
        let mut world = world_with_clock(1.0);
        world.spawn(Captive { is_captive: false });
        world.spawn(PlayerBot { powered_down: true });
        level_outcome_system(&mut world);
        assert_eq!(world.resource::<LevelOutcome>().phase(), LevelPhase::Success);
    }

    #[test]
    fn paused_clock_does_not_run() {
        let mut world = world_with_clock(5.0);
        world.spawn(Captive::default());
        assert!(world.resource_mut::<LevelOutcome>().pause());
        level_outcome_system(&mut world);
        assert_eq!(world.resource::<LevelOutcome>().time_remaining, 5.0);
    }
}

//! Charge loss as seen from the outside: saturation, owner reaction and the
//! one-shot loss notification.

use std::sync::{Arc, Mutex};

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use glam::Vec2;

use taskbots::components::charge::Charge;
use taskbots::components::orientation::CompassDirection;
use taskbots::components::playerbot::PlayerBot;
use taskbots::components::taskbot::TaskBot;
use taskbots::entities::{self, GroundBotSpawn};
use taskbots::events::charge::ChargeLostEvent;
use taskbots::resources::animationstore::{AnimationSet, AnimationStore, TextureAtlases, load_animation_set};
use taskbots::resources::gameplayconfig::GameplayConfig;
use taskbots::states::TaskBotState;
use taskbots::systems::charge::lose_charge;
use taskbots::systems::intelligence::current_state;

fn make_world() -> World {
    let mut world = World::new();
    world.init_resource::<GameplayConfig>();
    let atlases = TextureAtlases::placeholder(3);
    let mut store = AnimationStore::default();
    for set in AnimationSet::ALL {
        store.insert(set, load_animation_set(set, &atlases).unwrap());
    }
    world.insert_resource(store);
    world
}

fn count_losses(world: &mut World) -> Arc<Mutex<Vec<ChargeLostEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    world.add_observer(move |trigger: On<ChargeLostEvent>| {
        sink.lock().unwrap().push(*trigger.event());
    });
    seen
}

#[test]
fn overkill_drains_player_to_zero_and_notifies_once() {
    let mut world = make_world();
    let seen = count_losses(&mut world);
    let player = entities::spawn_player_bot(&mut world, Vec2::ZERO, CompassDirection::East).unwrap();

    {
        let charge = world.get::<Charge>(player).unwrap();
        assert_eq!(charge.charge(), 100.0);
        assert_eq!(charge.maximum(), 100.0);
    }

    assert!(lose_charge(&mut world, player, 150.0));
    world.flush();

    let charge = world.get::<Charge>(player).unwrap();
    assert_eq!(charge.charge(), 0.0);
    assert!(!charge.has_charge());
    assert!(world.get::<PlayerBot>(player).unwrap().powered_down);

    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].entity, player);
    assert_eq!(events[0].amount, 100.0);
    assert_eq!(events[0].remaining, 0.0);
}

#[test]
fn empty_charge_is_not_reported_again() {
    let mut world = make_world();
    let seen = count_losses(&mut world);
    let player = entities::spawn_player_bot(&mut world, Vec2::ZERO, CompassDirection::East).unwrap();

    assert!(lose_charge(&mut world, player, 100.0));
    assert!(!lose_charge(&mut world, player, 10.0));
    assert!(!lose_charge(&mut world, player, 1.0e9));
    world.flush();

    assert_eq!(world.get::<Charge>(player).unwrap().charge(), 0.0);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn draining_a_bad_ground_bot_turns_it_good() {
    let mut world = make_world();
    let bot = entities::spawn_ground_bot(
        &mut world,
        GroundBotSpawn {
            good_path: vec![Vec2::new(0.0, 0.0), Vec2::new(200.0, 0.0)],
            bad_path: vec![Vec2::new(0.0, 100.0), Vec2::new(200.0, 100.0)],
            starts_bad: true,
            facing: CompassDirection::West,
        },
    )
    .unwrap();
    assert!(!world.get::<TaskBot>(bot).unwrap().is_good);

    assert!(lose_charge(&mut world, bot, 40.0));
    assert!(!world.get::<TaskBot>(bot).unwrap().is_good);
    assert_eq!(current_state::<TaskBotState>(&world, bot), Some(TaskBotState::Zapped));

    assert!(lose_charge(&mut world, bot, 500.0));
    assert!(world.get::<TaskBot>(bot).unwrap().is_good);
    assert_eq!(world.get::<Charge>(bot).unwrap().charge(), 0.0);
}

//! Whole-level ticks: construction from a level layout, the fixed stage
//! order and the success/failure rules.

use bevy_ecs::prelude::*;
use glam::Vec2;

use taskbots::components::captive::Captive;
use taskbots::components::mapposition::MapPosition;
use taskbots::components::taskbot::{Mandate, TaskBot};
use taskbots::level::{LevelError, LevelSimulation};
use taskbots::resources::animationstore::{AnimationSet, AnimationStore, TextureAtlases, load_animation_set};
use taskbots::resources::gameplayconfig::GameplayConfig;
use taskbots::resources::levelconfig::{LevelConfigError, LevelConfiguration};
use taskbots::resources::levelentities::LevelEntities;
use taskbots::resources::leveloutcome::LevelPhase;
use taskbots::states::{PlayerBotState, TaskBotState, TrapState};
use taskbots::systems::intelligence::current_state;

const DT: f32 = 1.0 / 60.0;

fn level_json(time_limit: f32) -> String {
    format!(
        r#"{{
        "nodes": {{
            "transporter_coordinate": [0, 0],
            "moogle_coordinate": [300, 0],
            "good_1": [-1500, 1500], "good_2": [-1300, 1500],
            "bad_1": [-2000, -2000], "bad_2": [-1800, -2000], "bad_3": [-1800, -1800],
            "trap_1": [0, -400]
        }},
        "obstacles": [ [[-900, -100], [-860, -100], [-860, 100], [-900, 100]] ],
        "taskBotConfigurations": [
            {{ "locomotion": "ground", "initialOrientation": "North",
               "goodPathNodeNames": ["good_1", "good_2"],
               "badPathNodeNames": ["bad_1", "bad_2", "bad_3"],
               "startsBad": true }}
        ],
        "trapConfigurations": [ {{ "initialOrientation": "East", "trapPosition": ["trap_1"] }} ],
        "initialPlayerBotOrientation": "East",
        "moogleOrientation": "West",
        "nextLevel": "Level_2",
        "timeLimit": {},
        "proximityFactor": 1000.0
    }}"#,
        time_limit
    )
}

fn animations() -> AnimationStore {
    let atlases = TextureAtlases::placeholder(4);
    let mut store = AnimationStore::default();
    for set in AnimationSet::ALL {
        store.insert(set, load_animation_set(set, &atlases).unwrap());
    }
    store
}

fn make_level(time_limit: f32) -> LevelSimulation {
    let level = LevelConfiguration::from_json_str(&level_json(time_limit)).unwrap();
    LevelSimulation::with_animations(GameplayConfig::default(), level, animations()).unwrap()
}

fn run(simulation: &mut LevelSimulation, ticks: usize) -> LevelPhase {
    let mut phase = simulation.phase();
    for _ in 0..ticks {
        phase = simulation.tick(DT);
        if phase.is_terminal() {
            break;
        }
    }
    phase
}

#[test]
fn level_spawns_every_configured_entity() {
    let mut simulation = make_level(60.0);
    let player = simulation.player();
    let world = simulation.world_mut();

    // player, moogle, one task bot and one trap
    assert_eq!(world.resource::<LevelEntities>().len(), 4);
    assert_eq!(current_state::<PlayerBotState>(world, player), Some(PlayerBotState::Appear));

    let bots: Vec<(Entity, bool)> = world
        .query::<(Entity, &TaskBot)>()
        .iter(world)
        .map(|(e, t)| (e, t.is_good))
        .collect();
    assert_eq!(bots.len(), 1);
    assert!(!bots[0].1);
    assert_eq!(current_state::<TaskBotState>(world, bots[0].0), Some(TaskBotState::AgentControlled));
    assert_eq!(world.get::<MapPosition>(bots[0].0).unwrap().pos, Vec2::new(-2000.0, -2000.0));

    let positions: Vec<(Entity, Vec2)> = world
        .query::<(Entity, &MapPosition)>()
        .iter(world)
        .map(|(e, p)| (e, p.pos))
        .collect();
    let traps: Vec<Vec2> = positions
        .into_iter()
        .filter(|(e, _)| current_state::<TrapState>(world, *e).is_some())
        .map(|(_, pos)| pos)
        .collect();
    assert_eq!(traps, vec![Vec2::new(0.0, -400.0)]);
}

#[test]
fn player_beams_in_then_takes_control() {
    let mut simulation = make_level(60.0);
    let player = simulation.player();

    run(&mut simulation, 20);
    assert_eq!(
        current_state::<PlayerBotState>(simulation.world(), player),
        Some(PlayerBotState::Appear)
    );
    run(&mut simulation, 20);
    assert_eq!(
        current_state::<PlayerBotState>(simulation.world(), player),
        Some(PlayerBotState::PlayerControlled)
    );
}

#[test]
fn reaching_the_moogle_wins_the_level() {
    let mut simulation = make_level(60.0);
    let player = simulation.player();
    simulation.drive_player(Vec2::new(1.0, 0.0));

    let phase = run(&mut simulation, 600);
    assert_eq!(phase, LevelPhase::Success);

    let world = simulation.world_mut();
    assert!(world.query::<&Captive>().iter(world).all(|captive| !captive.is_captive));
    let x = world.get::<MapPosition>(player).unwrap().pos.x;
    assert!(x > 200.0 && x < 300.0, "player stopped at x = {}", x);
}

#[test]
fn running_out_of_time_fails_and_freezes_the_level() {
    let mut simulation = make_level(1.0);
    let phase = run(&mut simulation, 120);
    assert_eq!(phase, LevelPhase::Fail);

    let player = simulation.player();
    let frozen = simulation.world().get::<MapPosition>(player).unwrap().pos;
    simulation.drive_player(Vec2::new(0.0, 1.0));
    assert_eq!(simulation.tick(DT), LevelPhase::Fail);
    assert!(!simulation.resume());
    assert_eq!(simulation.world().get::<MapPosition>(player).unwrap().pos, frozen);
}

#[test]
fn paused_level_does_not_advance() {
    let mut simulation = make_level(30.0);
    run(&mut simulation, 10);
    let remaining = simulation.outcome().time_remaining;

    assert!(simulation.pause());
    for _ in 0..30 {
        assert_eq!(simulation.tick(DT), LevelPhase::Paused);
    }
    assert_eq!(simulation.outcome().time_remaining, remaining);

    assert!(simulation.resume());
    simulation.tick(DT);
    assert!(simulation.outcome().time_remaining < remaining);
}

#[test]
fn distant_bad_bot_keeps_patrolling() {
    let mut simulation = make_level(60.0);
    run(&mut simulation, 120);

    let world = simulation.world_mut();
    let (bot, task_bot) = world
        .query::<(Entity, &TaskBot)>()
        .iter(world)
        .map(|(e, t)| (e, t.clone()))
        .next()
        .unwrap();
    assert!(!task_bot.is_good);
    assert!(!matches!(task_bot.mandate, Mandate::HuntAgent(_)));
    let moved = world.get::<MapPosition>(bot).unwrap().pos;
    assert_ne!(moved, Vec2::new(-2000.0, -2000.0));
}

#[test]
fn unknown_path_node_is_rejected_before_spawning() {
    let json = level_json(60.0).replace(r#""bad_3"]"#, r#""bad_9"]"#);
    match LevelConfiguration::from_json_str(&json) {
        Err(LevelConfigError::MissingNode(name)) => assert_eq!(name, "bad_9"),
        other => panic!("expected a missing node error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn level_builds_through_the_loading_thread() {
    let level = LevelConfiguration::from_json_str(&level_json(60.0)).unwrap();
    let simulation = LevelSimulation::new(GameplayConfig::default(), level, TextureAtlases::placeholder(2));
    let mut simulation = match simulation {
        Ok(simulation) => simulation,
        Err(LevelError::Animations(e)) => panic!("loading failed: {}", e),
        Err(e) => panic!("level failed: {}", e),
    };
    assert_eq!(run(&mut simulation, 5), LevelPhase::Active);
}

//! Entity state machines driven through the transition driver and the
//! per-tick systems: the ground bot attack sequence, rejected transitions,
//! traps and moogle rescue.

use bevy_ecs::prelude::*;
use glam::Vec2;

use taskbots::components::agent::Agent;
use taskbots::components::captive::Captive;
use taskbots::components::charge::Charge;
use taskbots::components::intelligence::Intelligence;
use taskbots::components::movement::Movement;
use taskbots::components::orientation::CompassDirection;
use taskbots::components::physics::PhysicsBody;
use taskbots::components::taskbot::{GroundBot, TaskBot};
use taskbots::entities::{self, GroundBotSpawn};
use taskbots::resources::animationstore::{AnimationSet, AnimationStore, TextureAtlases, load_animation_set};
use taskbots::resources::gameplayconfig::GameplayConfig;
use taskbots::resources::worldtime::WorldTime;
use taskbots::states::{MoogleState, PlayerBotState, TaskBotState, TrapState};
use taskbots::systems::agent::agent_system;
use taskbots::systems::contact::contact_system;
use taskbots::systems::intelligence::{current_state, enter_state, intelligence_system};
use taskbots::systems::movement::movement_system;

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn make_world(dt: f32) -> World {
    let mut world = World::new();
    world.init_resource::<GameplayConfig>();
    world.insert_resource(WorldTime {
        elapsed: 0.0,
        delta: dt,
        time_scale: 1.0,
        frame_count: 0,
    });
    let atlases = TextureAtlases::placeholder(2);
    let mut store = AnimationStore::default();
    for set in AnimationSet::ALL {
        store.insert(set, load_animation_set(set, &atlases).unwrap());
    }
    world.insert_resource(store);
    world
}

fn bad_ground_bot(world: &mut World, at: Vec2) -> Entity {
    entities::spawn_ground_bot(
        world,
        GroundBotSpawn {
            good_path: vec![at, at + Vec2::new(0.0, 300.0)],
            bad_path: vec![at, at + Vec2::new(0.0, -300.0)],
            starts_bad: true,
            facing: CompassDirection::East,
        },
    )
    .unwrap()
}

fn aim_at(world: &mut World, bot: Entity, offset: Vec2) {
    let target = world.get::<Agent>(bot).unwrap().position + offset;
    world.get_mut::<GroundBot>(bot).unwrap().target_position = Some(target);
}

fn speeds(world: &World, bot: Entity) -> (f32, f32) {
    let movement = world.get::<Movement>(bot).unwrap();
    (movement.movement_speed, movement.angular_speed)
}

fn task_bot_state(world: &World, bot: Entity) -> Option<TaskBotState> {
    current_state::<TaskBotState>(world, bot)
}

#[test]
fn attack_boosts_speeds_and_restores_them_on_exit() {
    let mut world = make_world(1.0 / 60.0);
    let bot = bad_ground_bot(&mut world, Vec2::ZERO);
    aim_at(&mut world, bot, Vec2::new(200.0, 0.0));
    let (speed, angular) = speeds(&world, bot);
    let multipliers = {
        let ground_bot = &world.resource::<GameplayConfig>().ground_bot;
        (
            ground_bot.movement_speed_multiplier_when_attacking,
            ground_bot.angular_speed_multiplier_when_attacking,
        )
    };

    assert!(enter_state(&mut world, bot, TaskBotState::RotateToAttack));
    assert!(enter_state(&mut world, bot, TaskBotState::PreAttack));
    assert!(enter_state(&mut world, bot, TaskBotState::Attack));
    let (boosted_speed, boosted_angular) = speeds(&world, bot);
    assert!(approx_eq(boosted_speed, speed * multipliers.0));
    assert!(approx_eq(boosted_angular, angular * multipliers.1));

    assert!(enter_state(&mut world, bot, TaskBotState::AgentControlled));
    let (restored_speed, restored_angular) = speeds(&world, bot);
    assert!(approx_eq(restored_speed, speed));
    assert!(approx_eq(restored_angular, angular));
}

#[test]
fn ticked_attack_runs_to_the_target_and_hands_back_control() {
    let mut world = make_world(1.0 / 60.0);
    let bot = bad_ground_bot(&mut world, Vec2::ZERO);
    aim_at(&mut world, bot, Vec2::new(200.0, 0.0));
    let original = speeds(&world, bot);
    let target = world.get::<GroundBot>(bot).unwrap().target_position.unwrap();

    let mut schedule = Schedule::default();
    schedule.add_systems((intelligence_system::<TaskBotState>, movement_system, agent_system).chain());

    assert!(enter_state(&mut world, bot, TaskBotState::RotateToAttack));
    let mut visited = Vec::new();
    for _ in 0..240 {
        schedule.run(&mut world);
        let state = task_bot_state(&world, bot).unwrap();
        if visited.last() != Some(&state) {
            visited.push(state);
        }
        if state == TaskBotState::AgentControlled {
            break;
        }
    }

    assert_eq!(
        visited,
        vec![
            TaskBotState::PreAttack,
            TaskBotState::Attack,
            TaskBotState::AgentControlled
        ]
    );
    let position = world.get::<Agent>(bot).unwrap().position;
    assert!(position.distance(target) < 20.0, "stopped at {:?}", position);
    let restored = speeds(&world, bot);
    assert!(approx_eq(restored.0, original.0));
    assert!(approx_eq(restored.1, original.1));
}

#[test]
fn wind_up_cannot_skip_straight_back_to_agent_control() {
    let mut world = make_world(1.0 / 60.0);
    let bot = bad_ground_bot(&mut world, Vec2::ZERO);
    aim_at(&mut world, bot, Vec2::new(150.0, 0.0));
    assert!(enter_state(&mut world, bot, TaskBotState::RotateToAttack));
    assert!(enter_state(&mut world, bot, TaskBotState::PreAttack));
    world.get_mut::<Intelligence<TaskBotState>>(bot).unwrap().time_in_state = 0.2;

    assert!(!enter_state(&mut world, bot, TaskBotState::AgentControlled));
    assert!(!enter_state(&mut world, bot, TaskBotState::RotateToAttack));

    let intelligence = world.get::<Intelligence<TaskBotState>>(bot).unwrap();
    assert_eq!(intelligence.current(), Some(TaskBotState::PreAttack));
    assert_eq!(intelligence.time_in_state, 0.2);
}

#[test]
fn zapping_a_zapped_bot_restarts_the_stun() {
    let mut world = make_world(0.25);
    let bot = bad_ground_bot(&mut world, Vec2::ZERO);
    assert!(enter_state(&mut world, bot, TaskBotState::Zapped));

    let mut schedule = Schedule::default();
    schedule.add_systems(intelligence_system::<TaskBotState>);
    schedule.run(&mut world);
    schedule.run(&mut world);
    assert_eq!(
        world.get::<Intelligence<TaskBotState>>(bot).unwrap().time_in_state,
        0.5
    );

    assert!(!enter_state(&mut world, bot, TaskBotState::Zapped));
    assert_eq!(
        world.get::<Intelligence<TaskBotState>>(bot).unwrap().time_in_state,
        0.0
    );

    // zapped_state_duration is 0.75
    schedule.run(&mut world);
    schedule.run(&mut world);
    assert_eq!(task_bot_state(&world, bot), Some(TaskBotState::Zapped));
    schedule.run(&mut world);
    assert_eq!(task_bot_state(&world, bot), Some(TaskBotState::AgentControlled));
}

#[test]
fn turning_good_mid_wind_up_passes_through_zapped() {
    let mut world = make_world(1.0 / 60.0);
    let bot = bad_ground_bot(&mut world, Vec2::ZERO);
    aim_at(&mut world, bot, Vec2::new(150.0, 0.0));
    assert!(enter_state(&mut world, bot, TaskBotState::RotateToAttack));
    assert!(enter_state(&mut world, bot, TaskBotState::PreAttack));

    entities::set_task_bot_good(&mut world, bot, true);
    assert!(world.get::<TaskBot>(bot).unwrap().is_good);
    assert_eq!(task_bot_state(&world, bot), Some(TaskBotState::Zapped));

    let mut schedule = Schedule::default();
    schedule.add_systems(intelligence_system::<TaskBotState>);
    schedule.run(&mut world);
    assert_eq!(task_bot_state(&world, bot), Some(TaskBotState::AgentControlled));
    assert_eq!(world.get::<Charge>(bot).unwrap().charge(), 0.0);
}

#[test]
fn set_trap_drains_whoever_touches_it_then_springs() {
    let mut world = make_world(1.0 / 60.0);
    let trap = entities::spawn_trap(&mut world, Vec2::ZERO, CompassDirection::North).unwrap();
    let player = entities::spawn_player_bot(&mut world, Vec2::new(0.0, 10.0), CompassDirection::South).unwrap();

    let mut schedule = Schedule::default();
    schedule.add_systems((contact_system, intelligence_system::<TrapState>).chain());
    schedule.run(&mut world);

    assert!(world.get::<PhysicsBody>(trap).unwrap().is_touching(player));
    assert_eq!(world.get::<Charge>(player).unwrap().charge(), 50.0);
    assert_eq!(current_state::<TrapState>(&world, trap), Some(TrapState::Sprung));

    // sprung traps do no further damage
    schedule.run(&mut world);
    assert_eq!(world.get::<Charge>(player).unwrap().charge(), 50.0);

    assert!(entities::rearm_trap(&mut world, trap));
    assert_eq!(current_state::<TrapState>(&world, trap), Some(TrapState::Set));
}

#[test]
fn player_in_control_frees_a_touching_moogle() {
    let mut world = make_world(1.0 / 60.0);
    let moogle = entities::spawn_moogle(&mut world, Vec2::new(40.0, 0.0), CompassDirection::West).unwrap();
    let player = entities::spawn_player_bot(&mut world, Vec2::ZERO, CompassDirection::East).unwrap();

    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            contact_system,
            intelligence_system::<PlayerBotState>,
            intelligence_system::<MoogleState>,
        )
            .chain(),
    );

    // still beaming in: touching does not rescue
    schedule.run(&mut world);
    assert!(world.get::<Captive>(moogle).unwrap().is_captive);

    assert!(enter_state(&mut world, player, PlayerBotState::PlayerControlled));
    schedule.run(&mut world);
    assert!(!world.get::<Captive>(moogle).unwrap().is_captive);
    assert_eq!(current_state::<MoogleState>(&world, moogle), Some(MoogleState::Free));
    assert!(world.get::<PhysicsBody>(moogle).is_none());

    schedule.run(&mut world);
    assert!(!world.get::<PhysicsBody>(player).unwrap().is_touching(moogle));
}

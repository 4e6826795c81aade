//! Entity assembly and cross-entity operations.
//!
//! Each `spawn_*` constructor inserts the full component set of one
//! [`EntityKind`], registers the entity in [`LevelEntities`], validates the
//! assembly and enters the initial state. Animation tables come from the
//! [`AnimationStore`], so the matching set must be loaded first.
//!
//! The setters at the bottom ([`set_task_bot_good`], [`set_captive`],
//! [`rearm_trap`]) and [`apply_damage`] change a flag together with every
//! side effect that flag implies; states and systems always go through them.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::debug;
use thiserror::Error;

use crate::components::agent::Agent;
use crate::components::animation::{Animation, AnimationTable};
use crate::components::captive::Captive;
use crate::components::charge::Charge;
use crate::components::entitykind::EntityKind;
use crate::components::input::Input;
use crate::components::intelligence::Intelligence;
use crate::components::mapposition::MapPosition;
use crate::components::movement::Movement;
use crate::components::orientation::{CompassDirection, Orientation};
use crate::components::physics::{ColliderType, PhysicsBody};
use crate::components::playerbot::PlayerBot;
use crate::components::rules::Rules;
use crate::components::shadow::Shadow;
use crate::components::sprite::Sprite;
use crate::components::taskbot::{GroundBot, Mandate, TaskBot, closest_point_on_path};
use crate::components::zindex::ZIndex;
use crate::resources::animationstore::{AnimationAssets, AnimationSet, AnimationStore};
use crate::resources::gameplayconfig::GameplayConfig;
use crate::resources::levelentities::LevelEntities;
use crate::states::taskbot::refresh_behavior;
use crate::states::{MoogleState, PlayerBotState, TaskBotState, TrapState};
use crate::systems::charge::lose_charge;
use crate::systems::intelligence::{current_state, enter_state};

const PLAYER_BOT_TEXTURE_SIZE: Vec2 = Vec2::new(75.0, 75.0);
const PLAYER_BOT_SHADOW_SIZE: Vec2 = Vec2::new(60.0, 30.0);
const GROUND_BOT_TEXTURE_SIZE: Vec2 = Vec2::new(75.0, 75.0);
const GROUND_BOT_SHADOW_SIZE: Vec2 = Vec2::new(80.0, 30.0);
const MOOGLE_TEXTURE_SIZE: Vec2 = Vec2::new(100.0, 100.0);
const MOOGLE_SHADOW_SIZE: Vec2 = Vec2::new(90.0, 40.0);
const TRAP_TEXTURE_SIZE: Vec2 = Vec2::new(100.0, 100.0);
const SHADOW_OFFSET: Vec2 = Vec2::new(0.0, -40.0);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("{kind} is missing its {component} component")]
    MissingComponent { kind: &'static str, component: &'static str },
    #[error("entity has no EntityKind")]
    UnknownKind,
    #[error("animations for {0:?} are not loaded")]
    AnimationsNotLoaded(AnimationSet),
    #[error("a {0} needs a non-empty patrol path")]
    EmptyPatrolPath(&'static str),
}

fn require<T: Component>(world: &World, entity: Entity, kind: EntityKind, component: &'static str) -> Result<(), AssemblyError> {
    if world.get::<T>(entity).is_some() {
        return Ok(());
    }
    Err(AssemblyError::MissingComponent {
        kind: kind.name(),
        component,
    })
}

/// Check that `entity` carries every component its kind's states rely on.
pub fn validate_assembly(world: &World, entity: Entity) -> Result<(), AssemblyError> {
    let kind = *world.get::<EntityKind>(entity).ok_or(AssemblyError::UnknownKind)?;

    require::<MapPosition>(world, entity, kind, "MapPosition")?;
    require::<Orientation>(world, entity, kind, "Orientation")?;
    require::<Sprite>(world, entity, kind, "Sprite")?;
    require::<PhysicsBody>(world, entity, kind, "PhysicsBody")?;
    require::<Animation>(world, entity, kind, "Animation")?;
    require::<Agent>(world, entity, kind, "Agent")?;

    match kind {
        EntityKind::PlayerBot => {
            require::<PlayerBot>(world, entity, kind, "PlayerBot")?;
            require::<Input>(world, entity, kind, "Input")?;
            require::<Movement>(world, entity, kind, "Movement")?;
            require::<Charge>(world, entity, kind, "Charge")?;
            require::<Intelligence<PlayerBotState>>(world, entity, kind, "Intelligence")
        }
        EntityKind::TaskBot => {
            require::<TaskBot>(world, entity, kind, "TaskBot")?;
            require::<GroundBot>(world, entity, kind, "GroundBot")?;
            require::<Rules>(world, entity, kind, "Rules")?;
            require::<Movement>(world, entity, kind, "Movement")?;
            require::<Charge>(world, entity, kind, "Charge")?;
            require::<Intelligence<TaskBotState>>(world, entity, kind, "Intelligence")
        }
        EntityKind::Moogle => {
            require::<Captive>(world, entity, kind, "Captive")?;
            require::<Intelligence<MoogleState>>(world, entity, kind, "Intelligence")
        }
        EntityKind::Trap => require::<Intelligence<TrapState>>(world, entity, kind, "Intelligence"),
    }
}

fn animation_assets(world: &World, set: AnimationSet) -> Result<AnimationAssets, AssemblyError> {
    world
        .get_resource::<AnimationStore>()
        .and_then(|store| store.get(set))
        .cloned()
        .ok_or(AssemblyError::AnimationsNotLoaded(set))
}

/// Components shared by every kind.
fn base_bundle(
    kind: EntityKind,
    position: Vec2,
    facing: CompassDirection,
    texture_size: Vec2,
    collider_type: ColliderType,
    radius: f32,
    offset: Vec2,
    animations: Arc<AnimationTable>,
) -> impl Bundle {
    let mut agent = Agent::new(radius, offset);
    agent.sync_from_node(position, facing.z_rotation());
    (
        kind,
        MapPosition::from_vec(position),
        Orientation::facing(facing),
        Sprite::new(texture_size),
        PhysicsBody::circle(collider_type, radius, offset),
        Animation::new(animations),
        agent,
        ZIndex::default(),
    )
}

/// Register, validate and start a freshly spawned entity.
fn finish_spawn<S: crate::components::intelligence::MachineState>(
    world: &mut World,
    entity: Entity,
    initial_state: S,
) -> Result<Entity, AssemblyError> {
    if let Err(e) = validate_assembly(world, entity) {
        world.despawn(entity);
        return Err(e);
    }
    world.get_resource_or_init::<LevelEntities>().add(entity);
    enter_state(world, entity, initial_state);
    debug!("spawned {:?} as {:?}", entity, world.get::<EntityKind>(entity));
    Ok(entity)
}

pub fn spawn_player_bot(world: &mut World, position: Vec2, facing: CompassDirection) -> Result<Entity, AssemblyError> {
    let assets = animation_assets(world, AnimationSet::PlayerBot)?;
    let config = world.get_resource_or_init::<GameplayConfig>().player_bot.clone();

    let entity = world
        .spawn(base_bundle(
            EntityKind::PlayerBot,
            position,
            facing,
            PLAYER_BOT_TEXTURE_SIZE,
            ColliderType::PLAYER_BOT,
            config.physics_body_radius,
            config.physics_body_offset,
            assets.animations,
        ))
        .insert((
            PlayerBot::default(),
            Shadow::new("PlayerBotShadow", PLAYER_BOT_SHADOW_SIZE, SHADOW_OFFSET),
            Input::default(),
            Movement::new(config.movement_speed, config.angular_speed),
            Charge::new(config.initial_charge, config.maximum_charge).with_charge_bar(),
            Intelligence::<PlayerBotState>::new(),
        ))
        .id();
    finish_spawn(world, entity, PlayerBotState::Appear)
}

/// Placement of a ground bot in a level.
#[derive(Debug, Clone)]
pub struct GroundBotSpawn {
    pub good_path: Vec<Vec2>,
    pub bad_path: Vec<Vec2>,
    pub starts_bad: bool,
    pub facing: CompassDirection,
}

/// Spawn a ground bot at the start of its patrol path.
pub fn spawn_ground_bot(world: &mut World, spawn: GroundBotSpawn) -> Result<Entity, AssemblyError> {
    let is_good = !spawn.starts_bad;
    let start = if is_good {
        spawn.good_path.first()
    } else {
        spawn.bad_path.first()
    };
    let start = *start.ok_or(AssemblyError::EmptyPatrolPath(EntityKind::TaskBot.name()))?;

    let assets = animation_assets(world, AnimationSet::GroundBot)?;
    let good_animations = assets.animations;
    let bad_animations = assets.bad_animations.unwrap_or_else(|| good_animations.clone());

    let (task_bot_config, ground_bot_config, movement_speed, angular_speed) = {
        let config = world.get_resource_or_init::<GameplayConfig>();
        (
            config.task_bot.clone(),
            config.ground_bot.clone(),
            config.player_bot.movement_speed,
            config.player_bot.angular_speed,
        )
    };

    let task_bot = TaskBot::new(
        is_good,
        spawn.good_path,
        spawn.bad_path,
        good_animations,
        bad_animations,
    );
    let initial_animations = task_bot.animations_for(is_good);
    let initial_charge = if is_good { 0.0 } else { ground_bot_config.maximum_charge };

    let entity = world
        .spawn(base_bundle(
            EntityKind::TaskBot,
            start,
            spawn.facing,
            GROUND_BOT_TEXTURE_SIZE,
            ColliderType::TASK_BOT,
            task_bot_config.physics_body_radius,
            task_bot_config.physics_body_offset,
            initial_animations,
        ))
        .insert((
            task_bot,
            GroundBot::default(),
            Rules::default(),
            Shadow::new("GroundBotShadow", GROUND_BOT_SHADOW_SIZE, SHADOW_OFFSET),
            Movement::new(movement_speed, angular_speed),
            Charge::new(initial_charge, ground_bot_config.maximum_charge).with_charge_bar(),
            Intelligence::<TaskBotState>::new(),
        ))
        .id();

    if let Some(mut agent) = world.get_mut::<Agent>(entity) {
        let tuning = &task_bot_config;
        agent.max_speed = tuning.maximum_speed_for_is_good(is_good);
        agent.max_acceleration = tuning.maximum_acceleration;
        agent.mass = tuning.agent_mass;
    }
    finish_spawn(world, entity, TaskBotState::AgentControlled)
}

pub fn spawn_moogle(world: &mut World, position: Vec2, facing: CompassDirection) -> Result<Entity, AssemblyError> {
    let assets = animation_assets(world, AnimationSet::Moogle)?;
    let config = world.get_resource_or_init::<GameplayConfig>().moogle.clone();

    let entity = world
        .spawn(base_bundle(
            EntityKind::Moogle,
            position,
            facing,
            MOOGLE_TEXTURE_SIZE,
            ColliderType::MOOGLE,
            config.physics_body_radius,
            config.physics_body_offset,
            assets.animations,
        ))
        .insert((
            Captive::default(),
            Shadow::new("PlayerBotShadow", MOOGLE_SHADOW_SIZE, SHADOW_OFFSET),
            Intelligence::<MoogleState>::new(),
        ))
        .id();
    finish_spawn(world, entity, MoogleState::Captive)
}

pub fn spawn_trap(world: &mut World, position: Vec2, facing: CompassDirection) -> Result<Entity, AssemblyError> {
    let assets = animation_assets(world, AnimationSet::Trap)?;
    let config = world.get_resource_or_init::<GameplayConfig>().trap.clone();

    let entity = world
        .spawn(base_bundle(
            EntityKind::Trap,
            position,
            facing,
            TRAP_TEXTURE_SIZE,
            ColliderType::TRAP,
            config.physics_body_radius,
            config.physics_body_offset,
            assets.animations,
        ))
        .insert(Intelligence::<TrapState>::new())
        .id();
    finish_spawn(world, entity, TrapState::Set)
}

/// Damage dealt by an attacking ground bot or a set trap.
///
/// A player that is not powered down loses `amount` of charge; a good task
/// bot turns bad. Anything else is unaffected.
pub fn apply_damage(world: &mut World, target: Entity, amount: f64) {
    match world.get::<EntityKind>(target).copied() {
        Some(EntityKind::PlayerBot) => {
            let powered_down = world.get::<PlayerBot>(target).is_some_and(|p| p.powered_down);
            if !powered_down {
                lose_charge(world, target, amount);
            }
        }
        Some(EntityKind::TaskBot) => {
            let is_good = world.get::<TaskBot>(target).is_some_and(|t| t.is_good);
            if is_good {
                set_task_bot_good(world, target, false);
            }
        }
        Some(EntityKind::Moogle) | Some(EntityKind::Trap) | None => {}
    }
}

/// Turn a task bot good or bad. Does nothing when the flag is unchanged.
///
/// A bot turning good heads back to the closest point of its good path with
/// an empty charge; a bot turning bad heads for its bad path fully charged
/// and is zapped first.
pub fn set_task_bot_good(world: &mut World, entity: Entity, is_good: bool) {
    let (speed, acceleration) = {
        let Some(config) = world.get_resource::<GameplayConfig>() else {
            return;
        };
        (
            config.task_bot.maximum_speed_for_is_good(is_good),
            config.task_bot.maximum_acceleration,
        )
    };
    let position = world.get::<Agent>(entity).map_or(Vec2::ZERO, |agent| agent.position);

    let table = {
        let Some(mut task_bot) = world.get_mut::<TaskBot>(entity) else {
            return;
        };
        if task_bot.is_good == is_good {
            return;
        }
        task_bot.is_good = is_good;
        let closest = closest_point_on_path(position, task_bot.patrol_path());
        task_bot.mandate = match (closest, is_good) {
            (Some(point), _) => Mandate::ReturnToPositionOnPath(point),
            (None, true) => Mandate::FollowGoodPatrolPath,
            (None, false) => Mandate::FollowBadPatrolPath,
        };
        task_bot.animations_for(is_good)
    };
    debug!("task bot {:?} is now {}", entity, if is_good { "good" } else { "bad" });

    if let Some(mut agent) = world.get_mut::<Agent>(entity) {
        agent.max_speed = speed;
        agent.max_acceleration = acceleration;
    }

    if is_good {
        if !enter_state(world, entity, TaskBotState::AgentControlled) {
            if current_state::<TaskBotState>(world, entity) == Some(TaskBotState::AgentControlled) {
                refresh_behavior(world, entity);
            } else {
                // mid wind-up; the zap hands control back on the next tick
                enter_state(world, entity, TaskBotState::Zapped);
            }
        }
        if let Some(mut animation) = world.get_mut::<Animation>(entity) {
            animation.set_table(table);
        }
        if let Some(mut charge) = world.get_mut::<Charge>(entity) {
            charge.set_charge(0.0);
        }
    } else {
        if let Some(mut animation) = world.get_mut::<Animation>(entity) {
            animation.set_table(table);
        }
        if let Some(mut charge) = world.get_mut::<Charge>(entity) {
            let maximum = charge.maximum();
            charge.set_charge(maximum);
        }
        enter_state(world, entity, TaskBotState::Zapped);
    }
}

/// Capture or free a moogle. Does nothing when the flag is unchanged.
pub fn set_captive(world: &mut World, entity: Entity, is_captive: bool) {
    let Some(mut captive) = world.get_mut::<Captive>(entity) else {
        return;
    };
    if captive.is_captive == is_captive {
        return;
    }
    captive.is_captive = is_captive;
    let next = if is_captive {
        MoogleState::Captive
    } else {
        MoogleState::Free
    };
    enter_state(world, entity, next);
}

/// Return a sprung trap to its invisible armed state.
pub fn rearm_trap(world: &mut World, entity: Entity) -> bool {
    enter_state(world, entity, TrapState::Set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::animationstore::{TextureAtlases, load_animation_set};

    fn world_with_animations() -> World {
        let mut world = World::new();
        world.init_resource::<GameplayConfig>();
        let atlases = TextureAtlases::placeholder(2);
        let mut store = AnimationStore::default();
        for set in AnimationSet::ALL {
            store.insert(set, load_animation_set(set, &atlases).unwrap());
        }
        world.insert_resource(store);
        world
    }

    #[test]
    fn spawning_requires_loaded_animations() {
        let mut world = World::new();
        world.init_resource::<GameplayConfig>();
        let result = spawn_moogle(&mut world, Vec2::ZERO, CompassDirection::South);
        assert_eq!(result, Err(AssemblyError::AnimationsNotLoaded(AnimationSet::Moogle)));
    }

    #[test]
    fn spawned_entities_pass_validation_and_register() {
        let mut world = world_with_animations();
        let player = spawn_player_bot(&mut world, Vec2::new(10.0, 20.0), CompassDirection::East).unwrap();
        let trap = spawn_trap(&mut world, Vec2::new(50.0, 50.0), CompassDirection::North).unwrap();
        assert!(validate_assembly(&world, player).is_ok());
        assert!(validate_assembly(&world, trap).is_ok());
        assert_eq!(world.resource::<LevelEntities>().len(), 2);
        assert_eq!(current_state::<PlayerBotState>(&world, player), Some(PlayerBotState::Appear));
        assert_eq!(current_state::<TrapState>(&world, trap), Some(TrapState::Set));
    }

    #[test]
    fn missing_component_is_reported() {
        let mut world = world_with_animations();
        let moogle = spawn_moogle(&mut world, Vec2::ZERO, CompassDirection::South).unwrap();
        world.entity_mut(moogle).remove::<Captive>();
        assert_eq!(
            validate_assembly(&world, moogle),
            Err(AssemblyError::MissingComponent {
                kind: "Moogle",
                component: "Captive"
            })
        );
    }

    #[test]
    fn ground_bot_needs_a_path() {
        let mut world = world_with_animations();
        let result = spawn_ground_bot(
            &mut world,
            GroundBotSpawn {
                good_path: Vec::new(),
                bad_path: vec![Vec2::ZERO],
                starts_bad: false,
                facing: CompassDirection::South,
            },
        );
        assert_eq!(result, Err(AssemblyError::EmptyPatrolPath("TaskBot")));
    }

    #[test]
    fn turning_bad_zaps_and_refills() {
        let mut world = world_with_animations();
        let bot = spawn_ground_bot(
            &mut world,
            GroundBotSpawn {
                good_path: vec![Vec2::ZERO, Vec2::new(100.0, 0.0)],
                bad_path: vec![Vec2::new(0.0, 200.0), Vec2::new(100.0, 200.0)],
                starts_bad: false,
                facing: CompassDirection::South,
            },
        )
        .unwrap();
        assert_eq!(world.get::<Charge>(bot).unwrap().charge(), 0.0);

        apply_damage(&mut world, bot, 25.0);

        let task_bot = world.get::<TaskBot>(bot).unwrap();
        assert!(!task_bot.is_good);
        assert_eq!(task_bot.mandate, Mandate::ReturnToPositionOnPath(Vec2::new(0.0, 200.0)));
        assert!(world.get::<Charge>(bot).unwrap().is_fully_charged());
        assert_eq!(current_state::<TaskBotState>(&world, bot), Some(TaskBotState::Zapped));
    }

    #[test]
    fn freeing_a_moogle_hides_it() {
        let mut world = world_with_animations();
        let moogle = spawn_moogle(&mut world, Vec2::ZERO, CompassDirection::South).unwrap();
        assert!(world.get::<Sprite>(moogle).unwrap().body_hidden);

        set_captive(&mut world, moogle, false);
        assert_eq!(current_state::<MoogleState>(&world, moogle), Some(MoogleState::Free));
        let sprite = world.get::<Sprite>(moogle).unwrap();
        assert!(sprite.body_hidden);
        assert!(sprite.overlay.is_none());
    }
}

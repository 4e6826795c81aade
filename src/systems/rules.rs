//! Rule stage: periodic fuzzy evaluation for task bots.
//!
//! Every task bot advances its own [`Rules`] timer. When a bot's timer runs
//! out it grades the facts of its [`EntitySnapshot`] (building the level
//! snapshot first if nobody has this tick) and, if the bot is bad, adopts the
//! decided mandate. Ground bots may then launch an attack on their hunt
//! target.
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::agent::Agent;
use crate::components::entitykind::EntityKind;
use crate::components::intelligence::Intelligence;
use crate::components::rules::{FactGrades, MandateDecision, Rules, decide};
use crate::components::taskbot::{GroundBot, Mandate, TaskBot, closest_point_on_path};
use crate::resources::gameplayconfig::GameplayConfig;
use crate::resources::levelconfig::LevelConfiguration;
use crate::resources::levelentities::LevelEntities;
use crate::resources::obstaclegraph::ObstacleGraph;
use crate::resources::snapshot::{EntitySnapshot, LevelSnapshotData, LevelStateSnapshot, SnapshotEntry, TargetClass};
use crate::resources::worldtime::WorldTime;
use crate::states::TaskBotState;
use crate::states::player::is_targetable;
use crate::systems::intelligence::enter_state;

/// Used when no level configuration is loaded.
pub const DEFAULT_PROXIMITY_FACTOR: f32 = 1000.0;

/// Drop last tick's snapshot.
pub fn invalidate_snapshot(mut snapshot: ResMut<LevelStateSnapshot>) {
    snapshot.invalidate();
}

fn target_class(world: &World, entity: Entity) -> TargetClass {
    match world.get::<EntityKind>(entity) {
        Some(EntityKind::PlayerBot) if is_targetable(world, entity) => TargetClass::TargetablePlayerBot,
        Some(EntityKind::PlayerBot) => TargetClass::UntargetablePlayerBot,
        Some(EntityKind::TaskBot) => match world.get::<TaskBot>(entity) {
            Some(task_bot) if task_bot.is_good => TargetClass::GoodTaskBot,
            _ => TargetClass::BadTaskBot,
        },
        _ => TargetClass::Other,
    }
}

/// Build the level snapshot from every registered entity with an agent.
pub fn build_level_snapshot(world: &World) -> LevelSnapshotData {
    let proximity_factor = world
        .get_resource::<LevelConfiguration>()
        .map_or(DEFAULT_PROXIMITY_FACTOR, |level| level.proximity_factor);
    let entries: Vec<SnapshotEntry> = world
        .get_resource::<LevelEntities>()
        .map(|entities| {
            entities
                .iter()
                .filter_map(|entity| {
                    let agent = world.get::<Agent>(entity)?;
                    Some(SnapshotEntry {
                        entity,
                        agent_position: agent.position,
                        class: target_class(world, entity),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    LevelSnapshotData::build(&entries, proximity_factor)
}

fn snapshot_for(world: &mut World, entity: Entity) -> Option<std::sync::Arc<EntitySnapshot>> {
    let built = world.get_resource::<LevelStateSnapshot>().is_some_and(LevelStateSnapshot::is_built);
    if !built {
        let data = build_level_snapshot(world);
        world.get_resource_or_init::<LevelStateSnapshot>().store(data);
    }
    world.resource::<LevelStateSnapshot>().entity_snapshot(entity)
}

pub fn rules_system(world: &mut World) {
    let dt = world.resource::<WorldTime>().delta;
    let wait = world.resource::<GameplayConfig>().task_bot.rules_update_wait_duration;

    let due: Vec<Entity> = world
        .query::<(Entity, &mut Rules)>()
        .iter_mut(world)
        .filter_map(|(entity, mut rules)| rules.tick(dt, wait).then_some(entity))
        .collect();

    for entity in due {
        let Some(snapshot) = snapshot_for(world, entity) else {
            continue;
        };
        let grades = FactGrades::evaluate(&snapshot);
        if let Some(mut rules) = world.get_mut::<Rules>(entity) {
            rules.grades = grades;
        }
        apply_decision(world, entity, &snapshot, &grades);
        try_start_attack(world, entity);
    }
}

/// Pick the mandate of a bad task bot from its fact grades.
fn apply_decision(world: &mut World, entity: Entity, snapshot: &EntitySnapshot, grades: &FactGrades) {
    let position = world.get::<Agent>(entity).map(|agent| agent.position);
    let Some(mut task_bot) = world.get_mut::<TaskBot>(entity) else {
        return;
    };
    if task_bot.is_good {
        return;
    }
    let decision = decide(grades);
    match decision.mandate {
        MandateDecision::HuntPlayerBot => {
            if let Some((player, _)) = snapshot.player_bot_target {
                task_bot.mandate = Mandate::HuntAgent(player);
            }
        }
        MandateDecision::HuntTaskBot => {
            if let Some((target, _)) = snapshot.nearest_good_task_bot_target {
                task_bot.mandate = Mandate::HuntAgent(target);
            }
        }
        MandateDecision::FollowBadPatrolPath => {
            if task_bot.mandate != Mandate::FollowBadPatrolPath {
                let closest = position.and_then(|p| closest_point_on_path(p, &task_bot.bad_path_points));
                task_bot.mandate = closest.map_or(Mandate::FollowBadPatrolPath, Mandate::ReturnToPositionOnPath);
            }
        }
    }
    debug!(
        "task bot {:?}: hunt player {:.2}, hunt task bot {:.2} -> {:?}",
        entity, decision.hunt_player_bot, decision.hunt_task_bot, task_bot.mandate
    );
}

/// Launch a ground bot attack on its hunt target when it has been steering
/// long enough and the target is close and in plain view.
fn try_start_attack(world: &mut World, entity: Entity) {
    if world.get::<GroundBot>(entity).is_none() {
        return;
    }
    let (delay, maximum_distance) = {
        let ground_bot = &world.resource::<GameplayConfig>().ground_bot;
        (ground_bot.delay_between_attacks, ground_bot.maximum_attack_distance)
    };
    let ready = world
        .get::<Intelligence<TaskBotState>>(entity)
        .is_some_and(|i| i.is_in(TaskBotState::AgentControlled) && i.time_in_state >= delay);
    if !ready {
        return;
    }
    let Some(Mandate::HuntAgent(target)) = world.get::<TaskBot>(entity).map(|t| t.mandate) else {
        return;
    };
    let (Some(position), Some(target_position)) = (
        world.get::<Agent>(entity).map(|a| a.position),
        world.get::<Agent>(target).map(|a| a.position),
    ) else {
        return;
    };
    if position.distance(target_position) > maximum_distance {
        return;
    }
    let in_sight = world
        .get_resource::<ObstacleGraph>()
        .is_none_or(|graph| graph.has_line_of_sight(position, target_position));
    if !in_sight {
        return;
    }

    if let Some(mut ground_bot) = world.get_mut::<GroundBot>(entity) {
        ground_bot.target_position = Some(target_position);
    }
    debug!("ground bot {:?} attacks towards {:?}", entity, target_position);
    enter_state(world, entity, TaskBotState::RotateToAttack);
}

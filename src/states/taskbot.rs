//! Task bot states, including the ground bot attack sequence.
//!
//! While `AgentControlled` the steering agent drives the bot. The attack
//! sequence takes over movement: `RotateToAttack` turns towards the recorded
//! target point, `PreAttack` winds up and `Attack` charges in a straight line
//! at boosted speed until the target is reached or the distance stops
//! shrinking. `Zapped` can interrupt any state.

use bevy_ecs::prelude::*;
use glam::Vec2;
use smallvec::SmallVec;

use crate::components::agent::Agent;
use crate::components::animation::AnimationState;
use crate::components::charge::Charge;
use crate::components::intelligence::{Intelligence, MachineState, StateHooks, TransitionCheck};
use crate::components::movement::{Movement, MovementIntent};
use crate::components::orientation::Orientation;
use crate::components::physics::PhysicsBody;
use crate::components::taskbot::{GroundBot, Mandate, TaskBot};
use crate::entities::{apply_damage, set_task_bot_good};
use crate::geometry::shortest_angle_to_target;
use crate::resources::gameplayconfig::GameplayConfig;
use crate::resources::obstaclegraph::ObstacleGraph;
use crate::states::{clear_movement_intents, request_animation};
use crate::steering::{Behavior, behavior};
use crate::systems::intelligence::enter_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskBotState {
    AgentControlled,
    Zapped,
    RotateToAttack,
    PreAttack,
    Attack,
}

impl MachineState for TaskBotState {
    fn hooks(self) -> StateHooks<Self> {
        match self {
            TaskBotState::AgentControlled => StateHooks {
                enter: Some(agent_controlled_enter),
                update: Some(agent_controlled_update),
                exit: Some(|world, entity, _| {
                    if let Some(mut agent) = world.get_mut::<Agent>(entity) {
                        agent.behavior = None;
                    }
                }),
            },
            TaskBotState::Zapped => StateHooks {
                enter: Some(|world, entity, _| {
                    clear_movement_intents(world, entity);
                    request_animation(world, entity, AnimationState::Zapped);
                }),
                update: Some(zapped_update),
                exit: None,
            },
            TaskBotState::RotateToAttack => StateHooks {
                enter: Some(|world, entity, _| request_animation(world, entity, AnimationState::WalkForward)),
                update: Some(rotate_to_attack_update),
                exit: None,
            },
            TaskBotState::PreAttack => StateHooks {
                enter: Some(|world, entity, _| request_animation(world, entity, AnimationState::Attack)),
                update: Some(pre_attack_update),
                exit: None,
            },
            TaskBotState::Attack => StateHooks {
                enter: Some(attack_enter),
                update: Some(attack_update),
                exit: Some(attack_exit),
            },
        }
    }

    fn check_transition(self, next: Self) -> TransitionCheck {
        use TaskBotState::*;
        match self {
            AgentControlled => TransitionCheck::from_bool(matches!(next, RotateToAttack | Zapped)),
            // being zapped again extends the stun
            Zapped => match next {
                Zapped => TransitionCheck::RejectAndResetTimer,
                AgentControlled => TransitionCheck::Accept,
                _ => TransitionCheck::Reject,
            },
            RotateToAttack => TransitionCheck::from_bool(matches!(next, AgentControlled | PreAttack | Zapped)),
            PreAttack => TransitionCheck::from_bool(matches!(next, Attack | Zapped)),
            Attack => TransitionCheck::from_bool(matches!(next, AgentControlled | Zapped)),
        }
    }
}

fn time_in_state(world: &World, entity: Entity) -> f32 {
    world
        .get::<Intelligence<TaskBotState>>(entity)
        .map_or(0.0, |intelligence| intelligence.time_in_state)
}

/// Other bad task bots close enough to flock with while hunting.
fn flock_mates(world: &mut World, entity: Entity, position: Vec2) -> SmallVec<[Entity; 8]> {
    let search_distance = world
        .resource::<GameplayConfig>()
        .flocking
        .agent_search_distance_for_flocking;
    world
        .query::<(Entity, &TaskBot, &Agent)>()
        .iter(world)
        .filter(|(other, task_bot, agent)| {
            *other != entity && !task_bot.is_good && agent.distance_to(position) <= search_distance
        })
        .map(|(other, _, _)| other)
        .collect()
}

/// Goals for the bot's current mandate, plus the waypoints they follow.
pub fn behavior_for_current_mandate(world: &mut World, entity: Entity) -> Option<(Behavior, Vec<Vec2>)> {
    let (mandate, patrol_path) = {
        let task_bot = world.get::<TaskBot>(entity)?;
        (task_bot.mandate, task_bot.patrol_path().to_vec())
    };
    let (position, max_speed) = {
        let agent = world.get::<Agent>(entity)?;
        (agent.position, agent.max_speed)
    };
    let (hunt_target, flock) = match mandate {
        Mandate::HuntAgent(target) => (
            world.get::<Agent>(target).map(|agent| agent.position),
            flock_mates(world, entity, position),
        ),
        _ => (None, SmallVec::new()),
    };

    world.try_resource_scope(|world, mut graph: Mut<ObstacleGraph>| {
        let config = world.resource::<GameplayConfig>();
        let tuning = &config.task_bot;
        match (mandate, hunt_target) {
            (Mandate::HuntAgent(_), Some(target)) => behavior::hunting(
                position,
                max_speed,
                target,
                flock,
                tuning.hunt_path_radius,
                &mut graph,
                config,
            ),
            (Mandate::ReturnToPositionOnPath(point), _) => behavior::returning(
                position,
                max_speed,
                point,
                tuning.return_to_patrol_path_radius,
                &mut graph,
                config,
            ),
            // patrol, or a hunt whose target left the level
            _ => (
                behavior::patrolling(max_speed, &patrol_path, tuning.patrol_path_radius, &graph, config),
                patrol_path,
            ),
        }
    })
}

/// Rebuild the agent's behavior from the current mandate.
pub fn refresh_behavior(world: &mut World, entity: Entity) {
    let Some((behavior, path_points)) = behavior_for_current_mandate(world, entity) else {
        return;
    };
    if let Some(mut agent) = world.get_mut::<Agent>(entity) {
        agent.behavior = Some(behavior);
        agent.path_points = path_points;
    }
}

fn agent_controlled_enter(world: &mut World, entity: Entity, _previous: Option<TaskBotState>) {
    if let Some(mut task_bot) = world.get_mut::<TaskBot>(entity) {
        task_bot.time_since_behavior_update = 0.0;
    }
    refresh_behavior(world, entity);
    if let Some(mut charge) = world.get_mut::<Charge>(entity) {
        if charge.has_charge() {
            let maximum = charge.maximum();
            charge.set_charge(maximum);
        }
    }
}

fn agent_controlled_update(world: &mut World, entity: Entity, dt: f32) {
    let (wait, threshold) = {
        let tuning = &world.resource::<GameplayConfig>().task_bot;
        (
            tuning.behavior_update_wait_duration,
            tuning.threshold_proximity_to_patrol_path_start_point,
        )
    };
    let position = world.get::<Agent>(entity).map(|agent| agent.position);
    let Some(mut task_bot) = world.get_mut::<TaskBot>(entity) else {
        return;
    };
    task_bot.time_since_behavior_update += dt;
    if task_bot.time_since_behavior_update < wait {
        return;
    }
    if let (Mandate::ReturnToPositionOnPath(point), Some(position)) = (task_bot.mandate, position) {
        if position.distance(point) <= threshold {
            task_bot.mandate = if task_bot.is_good {
                Mandate::FollowGoodPatrolPath
            } else {
                Mandate::FollowBadPatrolPath
            };
        }
    }
    task_bot.time_since_behavior_update = 0.0;
    refresh_behavior(world, entity);
}

fn zapped_update(world: &mut World, entity: Entity, _dt: f32) {
    let duration = world.resource::<GameplayConfig>().task_bot.zapped_state_duration;
    let is_good = world.get::<TaskBot>(entity).is_some_and(|task_bot| task_bot.is_good);
    if is_good || time_in_state(world, entity) >= duration {
        enter_state(world, entity, TaskBotState::AgentControlled);
    }
}

fn target_position(world: &World, entity: Entity) -> Option<Vec2> {
    world.get::<GroundBot>(entity)?.target_position
}

fn agent_position(world: &World, entity: Entity) -> Option<Vec2> {
    world.get::<Agent>(entity).map(|agent| agent.position)
}

fn rotate_to_attack_update(world: &mut World, entity: Entity, dt: f32) {
    let (Some(target), Some(position)) = (target_position(world, entity), agent_position(world, entity)) else {
        enter_state(world, entity, TaskBotState::AgentControlled);
        return;
    };
    let speed = world.resource::<GameplayConfig>().ground_bot.pre_attack_rotation_speed;
    let Some(mut orientation) = world.get_mut::<Orientation>(entity) else {
        return;
    };
    let angle = shortest_angle_to_target(position, orientation.z_rotation, target);
    let delta = (dt * speed).copysign(angle);

    if delta.abs() >= angle.abs() {
        orientation.z_rotation += angle;
        enter_state(world, entity, TaskBotState::PreAttack);
        return;
    }
    orientation.z_rotation += delta;
    request_animation(world, entity, AnimationState::WalkForward);
}

fn pre_attack_update(world: &mut World, entity: Entity, _dt: f32) {
    let duration = world.resource::<GameplayConfig>().task_bot.pre_attack_state_duration;
    if time_in_state(world, entity) >= duration {
        enter_state(world, entity, TaskBotState::Attack);
    }
}

fn attack_enter(world: &mut World, entity: Entity, _previous: Option<TaskBotState>) {
    let (charge_loss, speed_multiplier, angular_multiplier) = {
        let ground_bot = &world.resource::<GameplayConfig>().ground_bot;
        (
            ground_bot.charge_loss_per_contact,
            ground_bot.movement_speed_multiplier_when_attacking,
            ground_bot.angular_speed_multiplier_when_attacking,
        )
    };

    let contacts: Vec<Entity> = world
        .get::<PhysicsBody>(entity)
        .map(|body| body.all_contacted_bodies().to_vec())
        .unwrap_or_default();
    for other in contacts {
        apply_damage(world, other, charge_loss);
    }

    let target_vector = match (target_position(world, entity), agent_position(world, entity)) {
        (Some(target), Some(position)) => target - position,
        _ => Vec2::ZERO,
    };
    if let Some(mut ground_bot) = world.get_mut::<GroundBot>(entity) {
        ground_bot.last_distance_to_target = Some(target_vector.length());
    }
    if let Some(mut movement) = world.get_mut::<Movement>(entity) {
        movement.movement_speed *= speed_multiplier;
        movement.angular_speed *= angular_multiplier;
        movement.next_translation = Some(MovementIntent::absolute(target_vector));
        movement.next_rotation = None;
    }
}

fn attack_update(world: &mut World, entity: Entity, _dt: f32) {
    let proximity = world.resource::<GameplayConfig>().ground_bot.attack_end_proximity;
    let (Some(target), Some(position)) = (target_position(world, entity), agent_position(world, entity)) else {
        enter_state(world, entity, TaskBotState::AgentControlled);
        return;
    };
    let distance = position.distance(target);
    let last_distance = world
        .get::<GroundBot>(entity)
        .and_then(|ground_bot| ground_bot.last_distance_to_target)
        .unwrap_or(f32::INFINITY);

    if distance < proximity || distance > last_distance {
        enter_state(world, entity, TaskBotState::AgentControlled);
        return;
    }
    if let Some(mut ground_bot) = world.get_mut::<GroundBot>(entity) {
        ground_bot.last_distance_to_target = Some(distance);
    }
    // intents only last one tick
    if let Some(mut movement) = world.get_mut::<Movement>(entity) {
        movement.next_translation = Some(MovementIntent::absolute(target - position));
        movement.next_rotation = None;
    }
}

fn attack_exit(world: &mut World, entity: Entity, _next: TaskBotState) {
    let (speed_multiplier, angular_multiplier) = {
        let ground_bot = &world.resource::<GameplayConfig>().ground_bot;
        (
            ground_bot.movement_speed_multiplier_when_attacking,
            ground_bot.angular_speed_multiplier_when_attacking,
        )
    };
    if let Some(mut movement) = world.get_mut::<Movement>(entity) {
        movement.clear_intents();
        movement.movement_speed /= speed_multiplier;
        movement.angular_speed /= angular_multiplier;
    }
}

/// Ground bot reaction to a strict charge loss: an emptied bot turns good,
/// a bot with charge left turns (or stays) bad and is zapped.
pub fn charge_lost(world: &mut World, entity: Entity) {
    let has_charge = world.get::<Charge>(entity).is_some_and(Charge::has_charge);
    set_task_bot_good(world, entity, !has_charge);
    if has_charge {
        enter_state(world, entity, TaskBotState::Zapped);
    }
}

/// Contact callback: an attacking ground bot damages whatever it runs into.
pub fn contact_began(world: &mut World, entity: Entity, other: Entity) {
    let attacking = world
        .get::<Intelligence<TaskBotState>>(entity)
        .is_some_and(|intelligence| intelligence.is_in(TaskBotState::Attack));
    if attacking {
        let charge_loss = world.resource::<GameplayConfig>().ground_bot.charge_loss_per_contact;
        apply_damage(world, other, charge_loss);
    }
}

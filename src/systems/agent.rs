//! Steering stage.
//!
//! Every agent is first synced from its entity's node. Agent-controlled task
//! bots then integrate one step of their steering behavior against a
//! snapshot of all agents taken before anyone moved, and write the result
//! back to their node.
use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::agent::Agent;
use crate::components::animation::{Animation, AnimationState};
use crate::components::intelligence::Intelligence;
use crate::components::mapposition::MapPosition;
use crate::components::orientation::Orientation;
use crate::resources::worldtime::WorldTime;
use crate::states::TaskBotState;
use crate::steering::solver::{SteeringAgent, steering_force};

type AgentQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut Agent,
        &'static mut MapPosition,
        &'static mut Orientation,
        Option<&'static Intelligence<TaskBotState>>,
        Option<&'static mut Animation>,
    ),
>;

pub fn agent_system(mut query: AgentQuery, time: Res<WorldTime>) {
    for (_, mut agent, position, orientation, _, _) in query.iter_mut() {
        agent.sync_from_node(position.pos, orientation.z_rotation);
    }

    let neighbours: FxHashMap<Entity, SteeringAgent> = query
        .iter()
        .map(|(entity, agent, ..)| (entity, agent.steering_agent()))
        .collect();

    for (_, mut agent, mut position, mut orientation, intelligence, animation) in query.iter_mut() {
        let controlled = intelligence.is_some_and(|i| i.is_in(TaskBotState::AgentControlled));
        if !controlled {
            continue;
        }
        let Some(force) = agent
            .behavior
            .as_ref()
            .map(|behavior| steering_force(&agent.steering_agent(), behavior, &neighbours))
        else {
            continue;
        };
        agent.integrate(force, time.delta);

        position.pos = agent.node_position();
        if agent.rotation.is_finite() {
            orientation.z_rotation = agent.rotation;
        }
        if let Some(mut animation) = animation {
            animation.request(AnimationState::WalkForward);
        }
    }
}

//! Movement stage.
//!
//! Resolves each entity's pending intents into a new position and rotation,
//! proposes the matching walk/idle animation and clears the intents. Intents
//! only last one tick; their producers re-issue them while they hold.
use bevy_ecs::prelude::*;

use crate::components::animation::Animation;
use crate::components::mapposition::MapPosition;
use crate::components::movement::Movement;
use crate::components::orientation::Orientation;
use crate::resources::worldtime::WorldTime;

pub fn movement_system(
    mut query: Query<(
        &mut MapPosition,
        &mut Orientation,
        &mut Movement,
        Option<&mut Animation>,
    )>,
    time: Res<WorldTime>,
) {
    for (mut position, mut orientation, mut movement, animation) in query.iter_mut() {
        if movement.next_translation.is_none() && movement.next_rotation.is_none() {
            continue;
        }
        let step = movement.resolve(position.pos, orientation.z_rotation, time.delta);
        position.pos = step.position;
        orientation.z_rotation = step.rotation;
        if let (Some(state), Some(mut animation)) = (step.animation_state, animation) {
            animation.propose(state);
        }
        movement.clear_intents();
    }
}

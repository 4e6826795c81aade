//! Animation stage.
//!
//! Consumes each entity's pending animation request for its current facing,
//! then steps texture playback and publishes the frame on the [`Sprite`].
//! Entities without a matching clip keep their last texture.
//!
//! # Related
//!
//! - [`crate::components::animation::Animation`] – request arbitration and playback
//! - [`crate::resources::animationstore::AnimationStore`] – clip tables per animation set

use bevy_ecs::prelude::*;

use crate::components::animation::Animation;
use crate::components::orientation::Orientation;
use crate::components::shadow::Shadow;
use crate::components::sprite::Sprite;
use crate::resources::worldtime::WorldTime;

pub fn animation(
    mut query: Query<(&mut Animation, &Orientation, &mut Sprite, Option<&mut Shadow>)>,
    time: Res<WorldTime>,
) {
    for (mut animation, orientation, mut sprite, shadow) in query.iter_mut() {
        animation.update(orientation.compass_direction(), time.delta);
        if let Some(texture) = animation.advance_playback(time.delta) {
            sprite.texture = Some(texture);
        }
        if let Some(mut shadow) = shadow {
            shadow.action = animation.shadow_action().cloned();
        }
    }
}

//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per tick, clamping the raw delta to the level's maximum step
//! and applying `time_scale`.
use bevy_ecs::prelude::*;

use crate::resources::gameplayconfig::GameplayConfig;
use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta seconds on the `WorldTime` resource.
///
/// `dt` is the unscaled wall-clock delta in seconds. Steps longer than
/// `maximum_delta_time` (an app returning from the background, a debugger
/// pause) are cut down so steering stays stable. Returns the delta the rest
/// of the tick must use.
pub fn update_world_time(world: &mut World, dt: f32) -> f32 {
    let maximum = world
        .get_resource::<GameplayConfig>()
        .map(|config| config.level.maximum_delta_time)
        .unwrap_or(f32::INFINITY);
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt.clamp(0.0, maximum) * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame_count += 1;
    scaled_dt
}

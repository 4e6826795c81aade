//! Bridge between the ECS world and the background animation loader.
//!
//! Use [`setup_animation_loading`] once during level setup to spawn the
//! loading thread and insert the [`LoadingBridge`] and
//! `Messages<LoadMessage>` resources. Call [`shutdown_animation_loading`]
//! during teardown to stop and join the thread.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::events::loading::{LoadCmd, LoadMessage};
use crate::resources::animationstore::{AnimationSet, TextureAtlases};
use crate::systems::loading::loading_thread;
use rustc_hash::FxHashSet;

/// Shared bridge between the ECS world and the loading thread.
#[derive(Resource)]
pub struct LoadingBridge {
    /// Sender for [`LoadCmd`] messages (ECS -> loading thread).
    pub tx_cmd: Sender<LoadCmd>,
    /// Receiver for [`LoadMessage`] messages (loading thread -> ECS).
    pub rx_msg: Receiver<LoadMessage>,
    /// Join handle for the background thread.
    pub handle: std::thread::JoinHandle<()>,
    /// Sets requested and not yet answered.
    pub in_flight: FxHashSet<AnimationSet>,
}

/// Spawn the loading thread over `atlases` and register bridge resources.
pub fn setup_animation_loading(world: &mut World, atlases: TextureAtlases) {
    let (tx_cmd, rx_cmd) = unbounded::<LoadCmd>();
    let (tx_msg, rx_msg) = unbounded::<LoadMessage>();

    let handle = std::thread::spawn(move || loading_thread(rx_cmd, tx_msg, atlases));

    world.insert_resource(LoadingBridge {
        tx_cmd,
        rx_msg,
        handle,
        in_flight: FxHashSet::default(),
    });
    world.insert_resource(Messages::<LoadMessage>::default());
}

/// Request shutdown of the loading thread and join it.
pub fn shutdown_animation_loading(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<LoadingBridge>() {
        let _ = bridge.tx_cmd.send(LoadCmd::Shutdown);
        let _ = bridge.handle.join();
    }
}

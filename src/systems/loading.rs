//! Background animation loading and the systems that bridge it with the world.
//!
//! - [`loading_thread`] runs on its own OS thread and builds clip tables from
//!   the texture atlases on request.
//! - [`request_missing_animations`] asks the thread for every set the
//!   [`AnimationStore`] still needs.
//! - [`poll_loading_messages`] non-blockingly drains completions into the
//!   ECS message queue, [`apply_loaded_animations`] publishes them into the
//!   store. Completions therefore land at the start of the tick after the
//!   thread finished.
//!
//! The thread is created by [`crate::resources::loading::setup_animation_loading`].

use std::time::{Duration, Instant};

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info};

use crate::events::loading::{LoadCmd, LoadMessage};
use crate::resources::animationstore::{AnimationSet, AnimationStore, TextureAtlases, load_animation_set};
use crate::resources::loading::LoadingBridge;

/// Entry point of the loading thread. Blocks until [`LoadCmd::Shutdown`] or
/// until the command channel closes.
pub fn loading_thread(rx_cmd: Receiver<LoadCmd>, tx_msg: Sender<LoadMessage>, atlases: TextureAtlases) {
    debug!("loading thread starting (id={:?})", std::thread::current().id());
    for cmd in rx_cmd.iter() {
        match cmd {
            LoadCmd::Load { set } => {
                let message = match load_animation_set(set, &atlases) {
                    Ok(assets) => LoadMessage::Loaded { set, assets },
                    Err(e) => LoadMessage::Failed {
                        set,
                        error: e.to_string(),
                    },
                };
                if tx_msg.send(message).is_err() {
                    break;
                }
            }
            LoadCmd::Shutdown => break,
        }
    }
    debug!("loading thread exiting");
}

/// Send a load request for every set the store is missing and that is not
/// already in flight.
pub fn request_missing_animations(world: &mut World) {
    let missing: Vec<AnimationSet> = {
        let store = world.get_resource::<AnimationStore>();
        AnimationSet::ALL
            .into_iter()
            .filter(|set| store.is_none_or(|store| store.needs_loading(*set)))
            .collect()
    };
    let Some(mut bridge) = world.get_resource_mut::<LoadingBridge>() else {
        return;
    };
    for set in missing {
        if bridge.in_flight.insert(set) {
            let _ = bridge.tx_cmd.send(LoadCmd::Load { set });
        }
    }
}

/// Drain finished loads into `Messages<LoadMessage>`.
pub fn poll_loading_messages(bridge: Option<Res<LoadingBridge>>, mut writer: MessageWriter<LoadMessage>) {
    if let Some(bridge) = bridge {
        writer.write_batch(bridge.rx_msg.try_iter());
    }
}

/// Advance the ECS message queue for [`LoadMessage`].
pub fn update_loading_messages(mut messages: ResMut<Messages<LoadMessage>>) {
    messages.update();
}

/// Publish loaded sets into the [`AnimationStore`].
pub fn apply_loaded_animations(
    mut reader: MessageReader<LoadMessage>,
    mut store: ResMut<AnimationStore>,
    mut bridge: Option<ResMut<LoadingBridge>>,
) {
    for message in reader.read() {
        let set = apply_message(&mut store, message.clone());
        if let Some(bridge) = bridge.as_mut() {
            bridge.in_flight.remove(&set);
        }
    }
}

fn apply_message(store: &mut AnimationStore, message: LoadMessage) -> AnimationSet {
    match message {
        LoadMessage::Loaded { set, assets } => {
            info!("Loaded animations for {:?}", set);
            store.insert(set, assets);
            set
        }
        LoadMessage::Failed { set, error } => {
            error!("Failed to load animations for {:?}: {}", set, error);
            set
        }
    }
}

/// Block until every animation set is in the store.
///
/// Used while a level is being prepared, before any entity needs its clips.
/// Fails on the first set that could not be loaded or when `timeout` passes.
pub fn wait_for_animations(world: &mut World, timeout: Duration) -> Result<(), String> {
    world.init_resource::<AnimationStore>();
    request_missing_animations(world);
    let deadline = Instant::now() + timeout;

    while !world.resource::<AnimationStore>().all_loaded() {
        let received = {
            let bridge = world
                .get_resource::<LoadingBridge>()
                .ok_or_else(|| "animation loading was never set up".to_string())?;
            let remaining = deadline.saturating_duration_since(Instant::now());
            bridge.rx_msg.recv_timeout(remaining)
        };
        let message = match received {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) => return Err("timed out waiting for animations".to_string()),
            Err(RecvTimeoutError::Disconnected) => return Err("animation loading thread stopped".to_string()),
        };
        if let LoadMessage::Failed { set, error } = &message {
            return Err(format!("failed to load animations for {:?}: {}", set, error));
        }
        let set = apply_message(&mut world.resource_mut::<AnimationStore>(), message);
        if let Some(mut bridge) = world.get_resource_mut::<LoadingBridge>() {
            bridge.in_flight.remove(&set);
        }
    }
    Ok(())
}

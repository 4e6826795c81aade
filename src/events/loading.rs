//! Messages exchanged with the animation loading thread.

use bevy_ecs::message::Message;

use crate::resources::animationstore::{AnimationAssets, AnimationSet};

/// Commands sent *to* the loading thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCmd {
    Load { set: AnimationSet },
    Shutdown,
}

/// Completions sent *back* from the loading thread.
#[derive(Message, Debug, Clone)]
pub enum LoadMessage {
    Loaded {
        set: AnimationSet,
        assets: AnimationAssets,
    },
    Failed {
        set: AnimationSet,
        error: String,
    },
}

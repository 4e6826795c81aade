use bevy_ecs::prelude::*;

use crate::resources::leveloutcome::LevelPhase;

/// Fired whenever the level changes phase (pause, resume, success, fail).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPhaseChangedEvent {
    pub from: LevelPhase,
    pub to: LevelPhase,
}

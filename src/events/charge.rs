use bevy_ecs::prelude::*;

/// Fired after an entity's charge strictly decreased and its owner reacted.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ChargeLostEvent {
    pub entity: Entity,
    /// Charge actually removed, after saturation.
    pub amount: f64,
    pub remaining: f64,
}

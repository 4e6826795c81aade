use bevy_ecs::prelude::Component;

/// Player avatar data.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct PlayerBot {
    /// Set when charge runs out, cleared once recharging completes.
    pub powered_down: bool,
}

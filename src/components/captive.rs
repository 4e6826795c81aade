use bevy_ecs::prelude::Component;

/// Rescue flag for moogles. Use [`crate::entities::set_captive`] to change
/// it so the owning state machine follows.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Captive {
    pub is_captive: bool,
}

impl Default for Captive {
    fn default() -> Self {
        Self { is_captive: true }
    }
}

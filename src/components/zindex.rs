//! Depth component for render ordering.
//!
//! The level loop rewrites [`ZIndex`] after every tick so that characters
//! lower on screen draw on top of characters behind them. [`WorldLayer`]
//! lists the fixed depths of the non-character layers for renderers.

use bevy_ecs::prelude::Component;

/// Depth gap between two consecutive characters.
pub const Z_SPACE_PER_CHARACTER: f32 = 100.0;

/// Rendering order hint. Higher values are drawn later (on top).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct ZIndex(pub f32);

/// Fixed layers of a level scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldLayer {
    Board,
    Shadows,
    Obstacles,
    Characters,
    AboveCharacters,
    Top,
}

impl WorldLayer {
    pub fn z(self) -> f32 {
        match self {
            WorldLayer::Board => -100.0,
            WorldLayer::Shadows => -50.0,
            WorldLayer::Obstacles => -25.0,
            WorldLayer::Characters => 0.0,
            WorldLayer::AboveCharacters => 1000.0,
            WorldLayer::Top => 1100.0,
        }
    }
}

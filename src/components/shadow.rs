use bevy_ecs::prelude::Component;
use glam::Vec2;
use std::sync::Arc;

/// Decorative shadow drawn under an entity at a fixed offset.
#[derive(Component, Clone, Debug)]
pub struct Shadow {
    pub texture: Arc<str>,
    pub size: Vec2,
    pub offset: Vec2,
    pub alpha: f32,
    /// Looping action mirrored from the body animation.
    pub action: Option<Arc<str>>,
}

impl Shadow {
    pub fn new(texture: impl Into<Arc<str>>, size: Vec2, offset: Vec2) -> Self {
        Self {
            texture: texture.into(),
            size,
            offset,
            alpha: 0.25,
            action: None,
        }
    }
}

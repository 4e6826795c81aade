use bevy_ecs::prelude::Component;
use glam::Vec2;
use std::sync::Arc;

/// Visual state of an entity's body as seen by a renderer.
///
/// `texture` is the current frame written by the animation stage. `overlay`
/// is a static texture drawn instead of the body while `body_hidden` is set,
/// like the teleport effect of an appearing player or a captive moogle.
#[derive(Component, Clone, Debug, Default)]
pub struct Sprite {
    pub texture: Option<Arc<str>>,
    pub size: Vec2,
    pub body_hidden: bool,
    pub overlay: Option<Arc<str>>,
}

impl Sprite {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Hide the body behind `overlay`.
    pub fn show_overlay(&mut self, overlay: Option<Arc<str>>) {
        self.overlay = overlay;
        self.body_hidden = true;
    }

    pub fn hide_overlay(&mut self) {
        self.overlay = None;
        self.body_hidden = false;
    }
}

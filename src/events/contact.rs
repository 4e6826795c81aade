//! Contact notifications between physics bodies.
//!
//! The contact stage triggers a [`ContactEvent`] for every pair whose
//! circles started or stopped overlapping, after the entities' own contact
//! callbacks ran. Observers can subscribe to it for presentation (sounds,
//! sparks) without touching gameplay.
use bevy_ecs::prelude::*;

/// Fired when bodies `a` and `b` begin (`began == true`) or end contact.
///
/// No ordering guarantee between `a` and `b`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub a: Entity,
    pub b: Entity,
    pub began: bool,
}

//! Contact stage: circle-overlap contact detection.
//!
//! Two bodies are in contact when their circles overlap and at least one of
//! them asked for contact notifications with the other's category. The
//! stage diffs this tick's contacts against the contacted sets stored on
//! each [`PhysicsBody`], rewrites those sets, runs the begin callbacks of the
//! interested sides and finally triggers a [`ContactEvent`] per change.
use bevy_ecs::prelude::*;
use glam::Vec2;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::components::entitykind::EntityKind;
use crate::components::mapposition::MapPosition;
use crate::components::physics::{ColliderType, PhysicsBody};
use crate::events::contact::ContactEvent;
use crate::states;

#[derive(Clone, Copy)]
struct BodyInfo {
    entity: Entity,
    collider_type: ColliderType,
    center: Vec2,
    radius: f32,
}

fn ordered(a: Entity, b: Entity) -> (Entity, Entity) {
    if a < b { (a, b) } else { (b, a) }
}

fn wants_contact(a: &BodyInfo, b: &BodyInfo) -> bool {
    a.collider_type.notify_on_contact_with(b.collider_type) || b.collider_type.notify_on_contact_with(a.collider_type)
}

fn overlaps(a: &BodyInfo, b: &BodyInfo) -> bool {
    a.center.distance_squared(b.center) < (a.radius + b.radius).powi(2)
}

/// Run `entity`'s contact-begin callback.
fn contact_began(world: &mut World, entity: Entity, other: Entity) {
    match world.get::<EntityKind>(entity).copied() {
        Some(EntityKind::TaskBot) => states::taskbot::contact_began(world, entity, other),
        Some(EntityKind::Moogle) => states::moogle::contact_began(world, entity, other),
        Some(EntityKind::Trap) => states::trap::contact_began(world, entity, other),
        Some(EntityKind::PlayerBot) | None => {}
    }
}

pub fn contact_system(world: &mut World) {
    let bodies: Vec<BodyInfo> = world
        .query::<(Entity, &PhysicsBody, &MapPosition)>()
        .iter(world)
        .map(|(entity, body, position)| BodyInfo {
            entity,
            collider_type: body.collider_type,
            center: body.center(position.pos),
            radius: body.radius,
        })
        .collect();

    let mut previous: FxHashSet<(Entity, Entity)> = FxHashSet::default();
    for (entity, body) in world.query::<(Entity, &PhysicsBody)>().iter(world) {
        for other in body.all_contacted_bodies() {
            previous.insert(ordered(entity, *other));
        }
    }

    let mut current: FxHashSet<(Entity, Entity)> = FxHashSet::default();
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            if wants_contact(a, b) && overlaps(a, b) {
                current.insert(ordered(a.entity, b.entity));
            }
        }
    }

    let mut contacted: FxHashMap<Entity, SmallVec<[Entity; 4]>> = FxHashMap::default();
    for (a, b) in &current {
        contacted.entry(*a).or_default().push(*b);
        contacted.entry(*b).or_default().push(*a);
    }
    for (entity, mut body) in world.query::<(Entity, &mut PhysicsBody)>().iter_mut(world) {
        let mut contacts = contacted.remove(&entity).unwrap_or_default();
        contacts.sort();
        body.contacts = contacts;
    }

    let mut began: Vec<(Entity, Entity)> = current.difference(&previous).copied().collect();
    let mut ended: Vec<(Entity, Entity)> = previous.difference(&current).copied().collect();
    began.sort();
    ended.sort();

    let types: FxHashMap<Entity, ColliderType> = bodies.iter().map(|b| (b.entity, b.collider_type)).collect();
    for (a, b) in &began {
        debug!("contact began between {:?} and {:?}", a, b);
        for (this, other) in [(*a, *b), (*b, *a)] {
            let interested = match (types.get(&this), types.get(&other)) {
                (Some(this_type), Some(other_type)) => this_type.notify_on_contact_with(*other_type),
                _ => false,
            };
            if interested {
                contact_began(world, this, other);
            }
        }
    }

    for (a, b) in began {
        world.trigger(ContactEvent { a, b, began: true });
    }
    for (a, b) in ended {
        world.trigger(ContactEvent { a, b, began: false });
    }
}

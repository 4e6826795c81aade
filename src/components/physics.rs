//! Collision categories and circular physics bodies.
//!
//! Every body belongs to exactly one [`ColliderType`] category. Which other
//! categories it collides with and which ones it wants contact callbacks for
//! are fixed tables per category, see [`ColliderType::collision_mask`] and
//! [`ColliderType::contact_mask`].

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec2;
use smallvec::SmallVec;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColliderType(pub u32);

impl ColliderType {
    pub const OBSTACLE: ColliderType = ColliderType(1 << 0);
    pub const PLAYER_BOT: ColliderType = ColliderType(1 << 1);
    pub const TASK_BOT: ColliderType = ColliderType(1 << 2);
    pub const MOOGLE: ColliderType = ColliderType(1 << 4);
    pub const TRAP: ColliderType = ColliderType(1 << 9);

    pub fn category_mask(self) -> u32 {
        self.0
    }

    pub fn union(self, other: ColliderType) -> ColliderType {
        ColliderType(self.0 | other.0)
    }

    pub fn contains(self, other: ColliderType) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    fn defined_collisions(self) -> &'static [ColliderType] {
        match self {
            Self::PLAYER_BOT => &[
                Self::PLAYER_BOT,
                Self::TASK_BOT,
                Self::OBSTACLE,
                Self::MOOGLE,
                Self::TRAP,
            ],
            Self::TASK_BOT => &[Self::OBSTACLE, Self::PLAYER_BOT, Self::TASK_BOT, Self::MOOGLE],
            Self::MOOGLE => &[Self::OBSTACLE, Self::PLAYER_BOT, Self::TASK_BOT, Self::MOOGLE],
            Self::TRAP => &[Self::OBSTACLE, Self::PLAYER_BOT, Self::MOOGLE, Self::TRAP],
            _ => &[],
        }
    }

    fn requested_contact_notifications(self) -> &'static [ColliderType] {
        match self {
            Self::TASK_BOT => &[Self::OBSTACLE, Self::PLAYER_BOT, Self::TASK_BOT, Self::MOOGLE],
            Self::MOOGLE => &[Self::OBSTACLE, Self::PLAYER_BOT, Self::TASK_BOT, Self::MOOGLE],
            Self::TRAP => &[Self::OBSTACLE, Self::PLAYER_BOT, Self::MOOGLE, Self::TRAP],
            _ => &[],
        }
    }

    pub fn collision_mask(self) -> u32 {
        self.defined_collisions()
            .iter()
            .fold(ColliderType::default(), |mask, c| mask.union(*c))
            .0
    }

    pub fn contact_mask(self) -> u32 {
        self.requested_contact_notifications()
            .iter()
            .fold(ColliderType::default(), |mask, c| mask.union(*c))
            .0
    }

    /// Whether bodies of this category want begin/end callbacks for contacts
    /// with `other`.
    pub fn notify_on_contact_with(self, other: ColliderType) -> bool {
        self.requested_contact_notifications().contains(&other)
    }
}

impl fmt::Debug for ColliderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OBSTACLE => write!(f, "ColliderType::Obstacle"),
            Self::PLAYER_BOT => write!(f, "ColliderType::PlayerBot"),
            Self::TASK_BOT => write!(f, "ColliderType::TaskBot"),
            Self::MOOGLE => write!(f, "ColliderType::Moogle"),
            Self::TRAP => write!(f, "ColliderType::Trap"),
            other => write!(f, "UnknownColliderType({})", other.0),
        }
    }
}

/// Circle collider centred `offset` away from the entity's position.
///
/// `contacts` holds the bodies this one currently overlaps, maintained by the
/// contact stage.
#[derive(Component, Clone, Debug)]
pub struct PhysicsBody {
    pub collider_type: ColliderType,
    pub radius: f32,
    pub offset: Vec2,
    pub contacts: SmallVec<[Entity; 4]>,
}

impl PhysicsBody {
    pub fn circle(collider_type: ColliderType, radius: f32, offset: Vec2) -> Self {
        Self {
            collider_type,
            radius,
            offset,
            contacts: SmallVec::new(),
        }
    }

    pub fn center(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }

    pub fn all_contacted_bodies(&self) -> &[Entity] {
        &self.contacts
    }

    pub fn is_touching(&self, other: Entity) -> bool {
        self.contacts.contains(&other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_follow_tables() {
        let task_bot = ColliderType::TASK_BOT;
        assert_eq!(task_bot.category_mask(), 4);
        assert_eq!(task_bot.contact_mask(), 1 | 2 | 4 | 16);
        assert_eq!(ColliderType::PLAYER_BOT.contact_mask(), 0);
        assert_eq!(ColliderType::PLAYER_BOT.collision_mask(), 1 | 2 | 4 | 16 | 512);
    }

    #[test]
    fn player_never_requests_contacts() {
        assert!(!ColliderType::PLAYER_BOT.notify_on_contact_with(ColliderType::TASK_BOT));
        assert!(ColliderType::TASK_BOT.notify_on_contact_with(ColliderType::PLAYER_BOT));
        assert!(ColliderType::TRAP.notify_on_contact_with(ColliderType::PLAYER_BOT));
        assert!(!ColliderType::TRAP.notify_on_contact_with(ColliderType::TASK_BOT));
    }

    #[test]
    fn debug_names_unknown_categories() {
        assert_eq!(format!("{:?}", ColliderType::MOOGLE), "ColliderType::Moogle");
        assert_eq!(format!("{:?}", ColliderType(1 << 3)), "UnknownColliderType(8)");
    }
}

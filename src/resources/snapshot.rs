//! Level-wide distance snapshot used by rule evaluation.
//!
//! One [`LevelStateSnapshot`] is built at most once per tick, the first time
//! a task bot evaluates its rules, and dropped at the start of the next tick.
//! Every entity of the level gets an [`EntitySnapshot`] holding its distance to
//! every other entity, sorted nearest first.

use bevy_ecs::prelude::{Entity, Resource};
use glam::Vec2;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// How an entity can be targeted by an antagonist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetClass {
    TargetablePlayerBot,
    UntargetablePlayerBot,
    GoodTaskBot,
    BadTaskBot,
    Other,
}

/// One entity as seen by the snapshot builder, in level order.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotEntry {
    pub entity: Entity,
    pub agent_position: Vec2,
    pub class: TargetClass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityDistance {
    pub target: Entity,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    /// Fraction of task bots that are bad, `0` when the level has none.
    pub bad_bot_percentage: f32,
    pub proximity_factor: f32,
    pub player_bot_target: Option<(Entity, f32)>,
    pub nearest_good_task_bot_target: Option<(Entity, f32)>,
    /// Every other entity, nearest first.
    pub entity_distances: Vec<EntityDistance>,
}

impl EntitySnapshot {
    fn new(
        bad_bot_percentage: f32,
        proximity_factor: f32,
        mut entity_distances: Vec<EntityDistance>,
        class_of: impl Fn(Entity) -> TargetClass,
    ) -> Self {
        entity_distances.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let mut player_bot_target = None;
        let mut nearest_good_task_bot_target = None;
        for entry in &entity_distances {
            match class_of(entry.target) {
                TargetClass::TargetablePlayerBot if player_bot_target.is_none() => {
                    player_bot_target = Some((entry.target, entry.distance));
                }
                TargetClass::GoodTaskBot if nearest_good_task_bot_target.is_none() => {
                    nearest_good_task_bot_target = Some((entry.target, entry.distance));
                }
                _ => {}
            }
            if player_bot_target.is_some() && nearest_good_task_bot_target.is_some() {
                break;
            }
        }

        Self {
            bad_bot_percentage,
            proximity_factor,
            player_bot_target,
            nearest_good_task_bot_target,
            entity_distances,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LevelSnapshotData {
    pub entity_snapshots: FxHashMap<Entity, Arc<EntitySnapshot>>,
}

impl LevelSnapshotData {
    pub fn build(entries: &[SnapshotEntry], proximity_factor: f32) -> Self {
        let mut distances: FxHashMap<Entity, Vec<EntityDistance>> = entries
            .iter()
            .map(|entry| (entry.entity, Vec::with_capacity(entries.len())))
            .collect();

        for (index, source) in entries.iter().enumerate() {
            for target in &entries[index + 1..] {
                let distance = source.agent_position.distance(target.agent_position);
                if let Some(list) = distances.get_mut(&source.entity) {
                    list.push(EntityDistance {
                        target: target.entity,
                        distance,
                    });
                }
                if let Some(list) = distances.get_mut(&target.entity) {
                    list.push(EntityDistance {
                        target: source.entity,
                        distance,
                    });
                }
            }
        }

        let (good, bad) = entries.iter().fold((0usize, 0usize), |(good, bad), entry| {
            match entry.class {
                TargetClass::GoodTaskBot => (good + 1, bad),
                TargetClass::BadTaskBot => (good, bad + 1),
                _ => (good, bad),
            }
        });
        let bad_bot_percentage = if good + bad == 0 {
            0.0
        } else {
            bad as f32 / (good + bad) as f32
        };

        let classes: FxHashMap<Entity, TargetClass> =
            entries.iter().map(|entry| (entry.entity, entry.class)).collect();
        let class_of = |entity: Entity| classes.get(&entity).copied().unwrap_or(TargetClass::Other);

        let entity_snapshots = distances
            .into_iter()
            .map(|(entity, list)| {
                let snapshot =
                    EntitySnapshot::new(bad_bot_percentage, proximity_factor, list, class_of);
                (entity, Arc::new(snapshot))
            })
            .collect();

        Self { entity_snapshots }
    }
}

/// Lazily built snapshot for the current tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct LevelStateSnapshot {
    current: Option<LevelSnapshotData>,
}

impl LevelStateSnapshot {
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    pub fn is_built(&self) -> bool {
        self.current.is_some()
    }

    pub fn store(&mut self, data: LevelSnapshotData) {
        self.current = Some(data);
    }

    pub fn entity_snapshot(&self, entity: Entity) -> Option<Arc<EntitySnapshot>> {
        self.current
            .as_ref()
            .and_then(|data| data.entity_snapshots.get(&entity).cloned())
    }
}

use bevy_ecs::prelude::{Entity, Resource};

/// Entities of the running level in the order they were added.
///
/// Snapshot distances and depth ties follow this order, so two runs of the
/// same level see the same ordering.
#[derive(Resource, Debug, Clone, Default)]
pub struct LevelEntities {
    entities: Vec<Entity>,
}

impl LevelEntities {
    pub fn add(&mut self, entity: Entity) {
        if !self.entities.contains(&entity) {
            self.entities.push(entity);
        }
    }

    pub fn remove(&mut self, entity: Entity) {
        self.entities.retain(|e| *e != entity);
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

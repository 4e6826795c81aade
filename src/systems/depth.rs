//! Depth stage: characters lower on the board draw on top.
use bevy_ecs::prelude::*;

use crate::components::mapposition::MapPosition;
use crate::components::zindex::{Z_SPACE_PER_CHARACTER, ZIndex};

/// Sort by descending y and assign `ZIndex` 100, 200, ...
pub fn update_depth(mut query: Query<(Entity, &MapPosition, &mut ZIndex)>) {
    let mut order: Vec<(Entity, f32)> = query.iter().map(|(entity, position, _)| (entity, position.pos.y)).collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    for (rank, (entity, _)) in order.into_iter().enumerate() {
        if let Ok((_, _, mut z)) = query.get_mut(entity) {
            z.0 = (rank + 1) as f32 * Z_SPACE_PER_CHARACTER;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_entities_draw_later() {
        let mut world = World::new();
        let top = world.spawn((MapPosition::new(0.0, 300.0), ZIndex::default())).id();
        let bottom = world.spawn((MapPosition::new(0.0, -50.0), ZIndex::default())).id();
        let middle = world.spawn((MapPosition::new(40.0, 10.0), ZIndex::default())).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(update_depth);
        schedule.run(&mut world);

        assert_eq!(world.get::<ZIndex>(top).unwrap().0, 100.0);
        assert_eq!(world.get::<ZIndex>(middle).unwrap().0, 200.0);
        assert_eq!(world.get::<ZIndex>(bottom).unwrap().0, 300.0);
    }
}

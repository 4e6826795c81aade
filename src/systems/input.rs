//! Input stage: hand each enabled control source's state to movement.
//!
//! Control sources (the headless autopilot, a renderer's keyboard handler)
//! write into [`Input`] through its `did_update_*` calls at any time between
//! ticks. Disabled inputs contribute nothing.
use bevy_ecs::prelude::*;

use crate::components::input::Input;
use crate::components::movement::Movement;

pub fn apply_input(mut query: Query<(&Input, &mut Movement)>) {
    for (input, mut movement) in query.iter_mut() {
        if !input.enabled {
            continue;
        }
        let state = input.applied_state();
        movement.next_translation = state.translation;
        movement.next_rotation = state.rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn disabled_input_leaves_intents_alone() {
        let mut world = World::new();
        let mut input = Input::default();
        input.did_update_displacement(Vec2::X);
        let enabled = world.spawn((input.clone(), Movement::new(300.0, 6.0))).id();
        input.enabled = false;
        let disabled = world.spawn((input, Movement::new(300.0, 6.0))).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_input);
        schedule.run(&mut world);

        let moving = world.get::<Movement>(enabled).unwrap();
        assert_eq!(moving.next_translation.map(|t| t.displacement), Some(Vec2::X));
        assert!(world.get::<Movement>(disabled).unwrap().next_translation.is_none());
    }
}

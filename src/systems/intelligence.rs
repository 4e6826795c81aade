//! Finite-state machine driver.
//!
//! [`enter_state`] performs one transition: it asks the current state whether
//! the next one may follow, runs the outgoing state's exit hook, swaps the
//! state and runs the incoming state's enter hook, all synchronously.
//! [`intelligence_system`] advances every machine of one state type by one
//! tick.
//!
//! Both take `&mut World` so hooks can reach any component of the entity and
//! may themselves request further transitions.

use bevy_ecs::prelude::*;

use crate::components::intelligence::{Intelligence, MachineState, TransitionCheck};
use crate::resources::worldtime::WorldTime;

/// Try to make `next` the current state of `entity`.
///
/// Returns `true` when the transition happened. A rejected transition is not
/// an error; it leaves the machine untouched, except that a state may ask to
/// have its elapsed time restarted instead.
pub fn enter_state<S: MachineState>(world: &mut World, entity: Entity, next: S) -> bool {
    let Some(intelligence) = world.get::<Intelligence<S>>(entity) else {
        return false;
    };
    let current = intelligence.current();

    if let Some(current) = current {
        match current.check_transition(next) {
            TransitionCheck::Accept => {}
            TransitionCheck::Reject => return false,
            TransitionCheck::RejectAndResetTimer => {
                if let Some(mut intelligence) = world.get_mut::<Intelligence<S>>(entity) {
                    intelligence.time_in_state = 0.0;
                }
                return false;
            }
        }
        if let Some(exit) = current.hooks().exit {
            exit(world, entity, next);
        }
    }

    let Some(mut intelligence) = world.get_mut::<Intelligence<S>>(entity) else {
        return false;
    };
    intelligence.swap(next);

    if let Some(enter) = next.hooks().enter {
        enter(world, entity, current);
    }
    true
}

/// Current state of `entity`, if it runs a machine of type `S`.
pub fn current_state<S: MachineState>(world: &World, entity: Entity) -> Option<S> {
    world
        .get::<Intelligence<S>>(entity)
        .and_then(|intelligence| intelligence.current())
}

/// Advance every `Intelligence<S>` by the tick's delta and run the current
/// state's update hook.
pub fn intelligence_system<S: MachineState>(world: &mut World) {
    let dt = world.resource::<WorldTime>().delta;
    let entities: Vec<Entity> = world
        .query_filtered::<Entity, With<Intelligence<S>>>()
        .iter(world)
        .collect();

    for entity in entities {
        let state = {
            let Some(mut intelligence) = world.get_mut::<Intelligence<S>>(entity) else {
                continue;
            };
            let Some(state) = intelligence.current() else {
                continue;
            };
            intelligence.time_in_state += dt;
            state
        };
        if let Some(update) = state.hooks().update {
            update(world, entity, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::intelligence::StateHooks;

    #[derive(Component, Default)]
    struct Journal(Vec<&'static str>);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lamp {
        Off,
        On,
        Broken,
    }

    fn log(world: &mut World, entity: Entity, line: &'static str) {
        if let Some(mut journal) = world.get_mut::<Journal>(entity) {
            journal.0.push(line);
        }
    }

    impl MachineState for Lamp {
        fn hooks(self) -> StateHooks<Self> {
            match self {
                Lamp::Off => StateHooks {
                    enter: Some(|w, e, _| log(w, e, "enter off")),
                    exit: Some(|w, e, _| log(w, e, "exit off")),
                    ..StateHooks::default()
                },
                Lamp::On => StateHooks {
                    enter: Some(|w, e, _| log(w, e, "enter on")),
                    update: Some(|w, e, _| {
                        let burned_out = w
                            .get::<Intelligence<Lamp>>(e)
                            .is_some_and(|i| i.time_in_state >= 1.0);
                        if burned_out {
                            enter_state(w, e, Lamp::Broken);
                        }
                    }),
                    exit: Some(|w, e, _| log(w, e, "exit on")),
                },
                Lamp::Broken => StateHooks::default(),
            }
        }

        fn check_transition(self, next: Self) -> TransitionCheck {
            match (self, next) {
                (Lamp::Off, Lamp::On) | (Lamp::On, Lamp::Off) | (Lamp::On, Lamp::Broken) => TransitionCheck::Accept,
                (Lamp::On, Lamp::On) => TransitionCheck::RejectAndResetTimer,
                _ => TransitionCheck::Reject,
            }
        }
    }

    fn setup() -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            delta: 0.25,
            ..WorldTime::default()
        });
        let entity = world.spawn((Intelligence::<Lamp>::new(), Journal::default())).id();
        (world, entity)
    }

    #[test]
    fn exit_runs_before_enter() {
        let (mut world, entity) = setup();
        assert!(enter_state(&mut world, entity, Lamp::Off));
        assert!(enter_state(&mut world, entity, Lamp::On));
        assert_eq!(
            world.get::<Journal>(entity).unwrap().0,
            vec!["enter off", "exit off", "enter on"]
        );
        let intelligence = world.get::<Intelligence<Lamp>>(entity).unwrap();
        assert_eq!(intelligence.previous(), Some(Lamp::Off));
    }

    #[test]
    fn rejected_transition_changes_nothing() {
        let (mut world, entity) = setup();
        enter_state(&mut world, entity, Lamp::Off);
        assert!(!enter_state(&mut world, entity, Lamp::Broken));
        assert_eq!(current_state::<Lamp>(&world, entity), Some(Lamp::Off));
        assert_eq!(world.get::<Journal>(entity).unwrap().0, vec!["enter off"]);
    }

    #[test]
    fn re_entry_can_restart_the_timer() {
        let (mut world, entity) = setup();
        enter_state(&mut world, entity, Lamp::Off);
        enter_state(&mut world, entity, Lamp::On);
        intelligence_system::<Lamp>(&mut world);
        intelligence_system::<Lamp>(&mut world);
        assert_eq!(world.get::<Intelligence<Lamp>>(entity).unwrap().time_in_state, 0.5);
        assert!(!enter_state(&mut world, entity, Lamp::On));
        assert_eq!(world.get::<Intelligence<Lamp>>(entity).unwrap().time_in_state, 0.0);
    }

    #[test]
    fn update_hook_can_transition() {
        let (mut world, entity) = setup();
        enter_state(&mut world, entity, Lamp::Off);
        enter_state(&mut world, entity, Lamp::On);
        for _ in 0..4 {
            intelligence_system::<Lamp>(&mut world);
        }
        assert_eq!(current_state::<Lamp>(&world, entity), Some(Lamp::Broken));
    }
}

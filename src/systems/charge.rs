//! Charge loss dispatch and charge bar easing.

use bevy_ecs::prelude::*;

use crate::components::charge::Charge;
use crate::components::entitykind::EntityKind;
use crate::events::charge::ChargeLostEvent;
use crate::resources::worldtime::WorldTime;
use crate::states;

/// Remove `amount` of charge from `entity` and let its owner react.
///
/// Returns `true` when the charge strictly decreased. Only then is the owner
/// notified and a [`ChargeLostEvent`] triggered.
pub fn lose_charge(world: &mut World, entity: Entity, amount: f64) -> bool {
    let (lost, remaining) = {
        let Some(mut charge) = world.get_mut::<Charge>(entity) else {
            return false;
        };
        let before = charge.charge();
        if !charge.lose_charge(amount) {
            return false;
        }
        (before - charge.charge(), charge.charge())
    };

    match world.get::<EntityKind>(entity).copied() {
        Some(EntityKind::PlayerBot) => states::player::charge_lost(world, entity),
        Some(EntityKind::TaskBot) => states::taskbot::charge_lost(world, entity),
        Some(EntityKind::Moogle) | Some(EntityKind::Trap) | None => {}
    }
    world.trigger(ChargeLostEvent {
        entity,
        amount: lost,
        remaining,
    });
    true
}

/// Ease every displayed charge bar towards its level.
pub fn update_charge_bars(mut query: Query<&mut Charge>, time: Res<WorldTime>) {
    for mut charge in query.iter_mut() {
        if let Some(bar) = charge.bar_mut() {
            bar.advance(time.delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::observer::On;
    use std::sync::{Arc, Mutex};

    #[test]
    fn loss_is_reported_only_when_charge_drops() {
        let mut world = World::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        world.add_observer(move |trigger: On<ChargeLostEvent>| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(trigger.event().remaining);
            }
        });
        let entity = world.spawn(Charge::new(30.0, 100.0)).id();

        assert!(lose_charge(&mut world, entity, 20.0));
        assert!(lose_charge(&mut world, entity, 20.0));
        assert!(!lose_charge(&mut world, entity, 20.0));
        assert_eq!(*seen.lock().unwrap(), vec![10.0, 0.0]);
    }

    #[test]
    fn bars_ease_to_the_new_level() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            delta: 0.05,
            ..WorldTime::default()
        });
        let mut charge = Charge::new(100.0, 100.0).with_charge_bar();
        charge.lose_charge(50.0);
        let entity = world.spawn(charge).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(update_charge_bars);
        schedule.run(&mut world);
        let displayed = world.get::<Charge>(entity).unwrap().bar().unwrap().displayed;
        assert!(displayed < 1.0 && displayed > 0.5);

        schedule.run(&mut world);
        let displayed = world.get::<Charge>(entity).unwrap().bar().unwrap().displayed;
        assert!((displayed - 0.5).abs() < 1e-9);
    }
}

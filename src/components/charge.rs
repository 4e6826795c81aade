//! Bounded charge (health/power) of player and task bots.
//!
//! Charge is saturating: [`Charge::lose_charge`] and [`Charge::add_charge`]
//! clamp the result to `0.0..=maximum` and never report an error. Only a
//! strict decrease is a "loss" worth telling the owner about; callers that
//! need the owner's reaction go through
//! [`crate::systems::charge::lose_charge`], which dispatches on the entity
//! kind.
//!
//! A charge may display a [`ChargeBar`]. The bar's target `level` follows the
//! charge percentage immediately; its `displayed` value eases towards the
//! target in the charge stage of the tick.

use bevy_ecs::prelude::Component;

/// Seconds the charge bar takes to catch up with a new level.
pub const CHARGE_BAR_UPDATE_DURATION: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeBar {
    /// Target fill level in `0.0..=1.0`.
    pub level: f64,
    /// Level currently shown.
    pub displayed: f64,
    /// Level the current easing started from.
    from: f64,
    /// Seconds since the target last changed.
    elapsed: f32,
}

impl ChargeBar {
    fn new(level: f64) -> Self {
        Self {
            level,
            displayed: level,
            from: level,
            elapsed: CHARGE_BAR_UPDATE_DURATION,
        }
    }

    fn retarget(&mut self, level: f64) {
        self.from = self.displayed;
        self.level = level;
        self.elapsed = 0.0;
    }

    /// Ease `displayed` towards `level` with an ease-in-ease-out curve.
    pub fn advance(&mut self, dt: f32) {
        if self.elapsed >= CHARGE_BAR_UPDATE_DURATION {
            self.displayed = self.level;
            return;
        }
        self.elapsed = (self.elapsed + dt).min(CHARGE_BAR_UPDATE_DURATION);
        let t = (self.elapsed / CHARGE_BAR_UPDATE_DURATION) as f64;
        let eased = t * t * (3.0 - 2.0 * t);
        self.displayed = self.from + (self.level - self.from) * eased;
    }
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Charge {
    charge: f64,
    maximum: f64,
    bar: Option<ChargeBar>,
}

impl Charge {
    pub fn new(charge: f64, maximum: f64) -> Self {
        Self {
            charge: charge.clamp(0.0, maximum.max(0.0)),
            maximum,
            bar: None,
        }
    }

    pub fn with_charge_bar(mut self) -> Self {
        self.bar = Some(ChargeBar::new(self.percentage()));
        self
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn bar(&self) -> Option<&ChargeBar> {
        self.bar.as_ref()
    }

    pub fn bar_mut(&mut self) -> Option<&mut ChargeBar> {
        self.bar.as_mut()
    }

    pub fn percentage(&self) -> f64 {
        if self.maximum == 0.0 {
            return 0.0;
        }
        self.charge / self.maximum
    }

    pub fn has_charge(&self) -> bool {
        self.charge > 0.0
    }

    pub fn is_fully_charged(&self) -> bool {
        self.charge == self.maximum
    }

    pub fn no_charge(&self) -> bool {
        self.charge == 0.0
    }

    /// Remove charge, saturating at zero.
    ///
    /// Returns `true` when the charge strictly decreased, which is the only
    /// case in which the owner must be notified.
    pub fn lose_charge(&mut self, amount: f64) -> bool {
        let new_charge = (self.charge - amount).min(self.maximum).max(0.0);
        if new_charge < self.charge {
            self.charge = new_charge;
            self.sync_bar();
            return true;
        }
        false
    }

    /// Add charge, saturating at the maximum. Never notifies.
    pub fn add_charge(&mut self, amount: f64) {
        let new_charge = (self.charge + amount).min(self.maximum).max(0.0);
        if new_charge > self.charge {
            self.charge = new_charge;
            self.sync_bar();
        }
    }

    /// Overwrite the charge without notifying anyone.
    pub fn set_charge(&mut self, charge: f64) {
        self.charge = charge.clamp(0.0, self.maximum.max(0.0));
        self.sync_bar();
    }

    fn sync_bar(&mut self) {
        let level = self.percentage();
        if let Some(bar) = self.bar.as_mut() {
            bar.retarget(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lose_charge_saturates_at_zero_and_reports_loss_once() {
        let mut charge = Charge::new(100.0, 100.0);
        assert!(charge.lose_charge(150.0));
        assert_eq!(charge.charge(), 0.0);
        assert!(!charge.has_charge());
        assert!(charge.no_charge());
        // nothing left to lose
        assert!(!charge.lose_charge(10.0));
        assert_eq!(charge.charge(), 0.0);
    }

    #[test]
    fn negative_loss_never_raises_charge_above_maximum() {
        let mut charge = Charge::new(100.0, 100.0);
        assert!(!charge.lose_charge(-50.0));
        assert_eq!(charge.charge(), 100.0);
    }

    #[test]
    fn add_charge_saturates_at_maximum() {
        let mut charge = Charge::new(40.0, 100.0);
        charge.add_charge(500.0);
        assert_eq!(charge.charge(), 100.0);
        assert!(charge.is_fully_charged());
        charge.add_charge(-20.0);
        assert_eq!(charge.charge(), 100.0);
    }

    #[test]
    fn percentage_is_zero_without_maximum() {
        let charge = Charge::new(0.0, 0.0);
        assert_eq!(charge.percentage(), 0.0);
        assert!(charge.is_fully_charged());
    }

    #[test]
    fn bar_level_follows_charge_and_eases_display() {
        let mut charge = Charge::new(100.0, 100.0).with_charge_bar();
        charge.lose_charge(50.0);
        let bar = charge.bar().copied().unwrap();
        assert_eq!(bar.level, 0.5);
        assert_eq!(bar.displayed, 1.0);

        let bar = charge.bar_mut().unwrap();
        bar.advance(0.05);
        assert!(bar.displayed < 1.0 && bar.displayed > 0.5);
        bar.advance(0.05);
        assert!((bar.displayed - 0.5).abs() < 1e-9);
    }

    #[test]
    fn charge_without_bar_has_no_display() {
        let mut charge = Charge::new(10.0, 100.0);
        charge.add_charge(5.0);
        assert!(charge.bar().is_none());
    }
}

//! Level-wide play state.
//!
//! The level starts [`LevelPhase::Active`] with `time_limit` seconds on the
//! clock. [`crate::systems::outcome::level_outcome_system`] counts the clock
//! down and decides success or failure; pausing and resuming are requested
//! from outside the tick. Once the level succeeded or failed it stays that way.

use bevy_ecs::prelude::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelPhase {
    Active,
    Paused,
    Success,
    Fail,
}

impl LevelPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, LevelPhase::Success | LevelPhase::Fail)
    }

    fn is_valid_next(self, next: LevelPhase) -> bool {
        match self {
            LevelPhase::Active => next != LevelPhase::Active,
            LevelPhase::Paused => next == LevelPhase::Active,
            LevelPhase::Success | LevelPhase::Fail => false,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LevelOutcome {
    phase: LevelPhase,
    pub time_remaining: f32,
    pub time_limit: f32,
}

impl LevelOutcome {
    pub fn new(time_limit: f32) -> Self {
        Self {
            phase: LevelPhase::Active,
            time_remaining: time_limit,
            time_limit,
        }
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == LevelPhase::Active
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Move to `next` if the current phase allows it. Returns whether the
    /// phase changed.
    pub fn enter(&mut self, next: LevelPhase) -> bool {
        if !self.phase.is_valid_next(next) {
            return false;
        }
        self.phase = next;
        true
    }

    pub fn pause(&mut self) -> bool {
        self.enter(LevelPhase::Paused)
    }

    pub fn resume(&mut self) -> bool {
        self.enter(LevelPhase::Active)
    }

    /// Whole seconds left, never negative, as `MM:SS`.
    pub fn time_remaining_string(&self) -> String {
        let seconds = self.time_remaining.max(0.0) as u32;
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phase_is_final() {
        let mut outcome = LevelOutcome::new(30.0);
        assert!(outcome.enter(LevelPhase::Success));
        assert!(!outcome.enter(LevelPhase::Fail));
        assert!(!outcome.resume());
        assert_eq!(outcome.phase(), LevelPhase::Success);
    }

    #[test]
    fn pause_and_resume() {
        let mut outcome = LevelOutcome::new(30.0);
        assert!(outcome.pause());
        assert!(!outcome.pause());
        // a paused level cannot finish
        assert!(!outcome.enter(LevelPhase::Fail));
        assert!(outcome.resume());
        assert!(outcome.is_active());
    }

    #[test]
    fn remaining_time_formats_as_minutes_and_seconds() {
        let mut outcome = LevelOutcome::new(90.0);
        assert_eq!(outcome.time_remaining_string(), "01:30");
        outcome.time_remaining = 9.7;
        assert_eq!(outcome.time_remaining_string(), "00:09");
        outcome.time_remaining = -2.0;
        assert_eq!(outcome.time_remaining_string(), "00:00");
    }
}

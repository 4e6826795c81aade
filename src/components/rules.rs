//! Fuzzy facts graded from an [`EntitySnapshot`] and the mandate decision
//! built on top of them.
//!
//! Grades follow the rule system they model: each fact is asserted with a
//! grade clamped to `[0, 1]`, AND is the minimum grade of a fact set and OR
//! is the maximum over a fixed list of candidate sets.

use arrayvec::ArrayVec;
use bevy_ecs::prelude::Component;

use crate::resources::snapshot::EntitySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fact {
    BadTaskBotPercentageLow,
    BadTaskBotPercentageMedium,
    BadTaskBotPercentageHigh,
    PlayerBotNear,
    PlayerBotMedium,
    PlayerBotFar,
}

impl Fact {
    pub const ALL: [Fact; 6] = [
        Fact::PlayerBotNear,
        Fact::PlayerBotMedium,
        Fact::PlayerBotFar,
        Fact::BadTaskBotPercentageLow,
        Fact::BadTaskBotPercentageMedium,
        Fact::BadTaskBotPercentageHigh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Fact::BadTaskBotPercentageLow => "BadTaskBotPercentageLow",
            Fact::BadTaskBotPercentageMedium => "BadTaskBotPercentageMedium",
            Fact::BadTaskBotPercentageHigh => "BadTaskBotPercentageHigh",
            Fact::PlayerBotNear => "PlayerBotNear",
            Fact::PlayerBotMedium => "PlayerBotMedium",
            Fact::PlayerBotFar => "PlayerBotFar",
        }
    }

    /// Raw piecewise-linear grade before clamping.
    pub fn raw_grade(self, snapshot: &EntitySnapshot) -> f32 {
        let p = snapshot.bad_bot_percentage;
        match self {
            Fact::BadTaskBotPercentageLow => (1.0 - 3.0 * p).max(0.0),
            Fact::BadTaskBotPercentageMedium => {
                if p <= 1.0 / 3.0 {
                    (3.0 * p).min(1.0)
                } else {
                    (1.0 - (3.0 * p - 1.0)).max(0.0)
                }
            }
            Fact::BadTaskBotPercentageHigh => (3.0 * p - 1.0).max(0.0).min(1.0),
            Fact::PlayerBotNear | Fact::PlayerBotMedium | Fact::PlayerBotFar => {
                let Some((_, distance)) = snapshot.player_bot_target else {
                    return 0.0;
                };
                let one_third = snapshot.proximity_factor / 3.0;
                if one_third <= 0.0 {
                    return 0.0;
                }
                match self {
                    Fact::PlayerBotNear => (one_third - distance) / one_third,
                    Fact::PlayerBotMedium => 1.0 - (distance - one_third).abs() / one_third,
                    _ => (distance - one_third) / one_third,
                }
            }
        }
    }

    pub fn grade(self, snapshot: &EntitySnapshot) -> f32 {
        let raw = self.raw_grade(snapshot);
        if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
    }
}

/// Grades of every fact after one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FactGrades([f32; 6]);

impl FactGrades {
    pub fn evaluate(snapshot: &EntitySnapshot) -> Self {
        let mut grades = FactGrades::default();
        for fact in Fact::ALL {
            grades.0[fact as usize] = fact.grade(snapshot);
        }
        grades
    }

    pub fn grade(&self, fact: Fact) -> f32 {
        self.0[fact as usize]
    }

    /// Fuzzy AND of a fact set.
    pub fn minimum_grade(&self, facts: &[Fact]) -> f32 {
        facts
            .iter()
            .map(|fact| self.grade(*fact))
            .fold(f32::INFINITY, f32::min)
            .min(1.0)
    }
}

/// Which mandate the rule evaluation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandateDecision {
    HuntPlayerBot,
    HuntTaskBot,
    FollowBadPatrolPath,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub hunt_player_bot: f32,
    pub hunt_task_bot: f32,
    pub mandate: MandateDecision,
}

pub fn decide(grades: &FactGrades) -> Decision {
    use Fact::*;

    let hunt_player_bot_raw: ArrayVec<f32, 3> = [
        grades.minimum_grade(&[BadTaskBotPercentageHigh, PlayerBotNear]),
        grades.minimum_grade(&[BadTaskBotPercentageMedium, PlayerBotNear]),
        grades.minimum_grade(&[BadTaskBotPercentageHigh, PlayerBotMedium]),
    ]
    .into_iter()
    .collect();
    let hunt_player_bot = hunt_player_bot_raw.iter().copied().fold(0.0, f32::max);

    let hunt_task_bot_raw: ArrayVec<f32, 4> = [
        grades.minimum_grade(&[BadTaskBotPercentageLow]),
        grades.minimum_grade(&[BadTaskBotPercentageMedium]),
        grades.minimum_grade(&[BadTaskBotPercentageLow, PlayerBotMedium]),
        grades.minimum_grade(&[BadTaskBotPercentageMedium, PlayerBotFar]),
    ]
    .into_iter()
    .collect();
    let hunt_task_bot = hunt_task_bot_raw.iter().copied().fold(0.0, f32::max);

    let mandate = if hunt_player_bot >= hunt_task_bot && hunt_player_bot > 0.0 {
        MandateDecision::HuntPlayerBot
    } else if hunt_task_bot > hunt_player_bot {
        MandateDecision::HuntTaskBot
    } else {
        MandateDecision::FollowBadPatrolPath
    };

    Decision {
        hunt_player_bot,
        hunt_task_bot,
        mandate,
    }
}

/// Periodic fact evaluation for a task bot.
#[derive(Component, Debug, Clone, Default)]
pub struct Rules {
    pub time_since_rules_update: f32,
    /// Grades from the last evaluation.
    pub grades: FactGrades,
}

impl Rules {
    /// Advance the evaluation timer. Returns true when an evaluation is due,
    /// resetting the timer.
    pub fn tick(&mut self, dt: f32, wait_duration: f32) -> bool {
        self.time_since_rules_update += dt;
        if self.time_since_rules_update < wait_duration {
            return false;
        }
        self.time_since_rules_update = 0.0;
        true
    }
}

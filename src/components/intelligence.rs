//! Generic finite-state machine component.
//!
//! Each entity kind declares its states as a plain enum implementing
//! [`MachineState`]. A state provides its enter/update/exit hooks through
//! [`StateHooks`] and decides which states may follow it through
//! [`MachineState::check_transition`]. The driver in
//! [`crate::systems::intelligence`] runs the hooks: on a transition the
//! outgoing state's exit hook always completes before the incoming state's
//! enter hook starts.
//!
//! Hooks receive the whole [`World`] and the owning [`Entity`], so a state can
//! read and write any sibling component and even trigger further transitions.

use bevy_ecs::prelude::{Component, Entity, World};
use std::fmt::Debug;

/// Called after the state became current. Receives the previous state.
pub type EnterHook<S> = fn(&mut World, Entity, Option<S>);
/// Called once per tick while the state is current.
pub type UpdateHook = fn(&mut World, Entity, f32);
/// Called before leaving the state. Receives the next state.
pub type ExitHook<S> = fn(&mut World, Entity, S);

/// Function table of one state.
pub struct StateHooks<S> {
    pub enter: Option<EnterHook<S>>,
    pub update: Option<UpdateHook>,
    pub exit: Option<ExitHook<S>>,
}

impl<S> Default for StateHooks<S> {
    fn default() -> Self {
        Self {
            enter: None,
            update: None,
            exit: None,
        }
    }
}

/// Outcome of asking the current state whether `next` may follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    Accept,
    Reject,
    /// Reject, but restart the current state's elapsed time.
    RejectAndResetTimer,
}

impl TransitionCheck {
    pub fn from_bool(accept: bool) -> Self {
        if accept {
            TransitionCheck::Accept
        } else {
            TransitionCheck::Reject
        }
    }
}

pub trait MachineState: Copy + Eq + Debug + Send + Sync + 'static {
    fn hooks(self) -> StateHooks<Self>;

    fn check_transition(self, next: Self) -> TransitionCheck;

    fn is_valid_next_state(self, next: Self) -> bool {
        self.check_transition(next) == TransitionCheck::Accept
    }
}

#[derive(Component, Debug, Clone)]
pub struct Intelligence<S: MachineState> {
    current: Option<S>,
    previous: Option<S>,
    /// Seconds since the current state was entered.
    pub time_in_state: f32,
}

impl<S: MachineState> Default for Intelligence<S> {
    fn default() -> Self {
        Self {
            current: None,
            previous: None,
            time_in_state: 0.0,
        }
    }
}

impl<S: MachineState> Intelligence<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<S> {
        self.current
    }

    pub fn previous(&self) -> Option<S> {
        self.previous
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current == Some(state)
    }

    /// Whether a transition to `next` would be accepted. The initial entry
    /// from no state is always accepted.
    pub fn can_enter(&self, next: S) -> bool {
        self.current.is_none_or(|current| current.is_valid_next_state(next))
    }

    pub(crate) fn swap(&mut self, next: S) {
        self.previous = self.current;
        self.current = Some(next);
        self.time_in_state = 0.0;
    }
}

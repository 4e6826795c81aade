//! Simulation systems.
//!
//! This module groups the stages of a level tick. Each stage completes for
//! every entity before the next one starts; [`crate::level`] chains them in
//! this order:
//!
//! - [`time`] – clamp and scale the tick delta (runs before the schedule)
//! - [`loading`] – drain finished background loads into the animation store
//! - [`outcome`] – level clock, success and failure
//! - [`rules`] – drop the stale snapshot, then periodic fuzzy evaluation and attack triggers
//! - [`intelligence`] – advance every entity's state machine
//! - [`input`] – hand control input to movement
//! - [`movement`] – resolve movement intents into position and facing
//! - [`agent`] – steering step for agent-controlled task bots
//! - [`contact`] – circle-overlap contact detection and callbacks
//! - [`charge`] – charge loss dispatch and charge bar easing
//! - [`animation`] – consume animation requests and step texture playback
//! - [`depth`] – render order by board position

pub mod agent;
pub mod animation;
pub mod charge;
pub mod contact;
pub mod depth;
pub mod input;
pub mod intelligence;
pub mod loading;
pub mod movement;
pub mod outcome;
pub mod rules;
pub mod time;

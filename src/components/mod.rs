//! ECS components for simulated entities.
//!
//! This module groups all component types that can be attached to entities of
//! a level. Components hold the data the states and stages work on: position,
//! facing, charge, movement intents, animation playback, steering agents and
//! the per-kind gameplay records.
//!
//! Submodules overview:
//! - [`agent`] – steering agent kept at an offset from the entity
//! - [`animation`] – animation states, clips and request/playback bookkeeping
//! - [`captive`] – rescue flag of moogles
//! - [`charge`] – bounded charge with an optional easing display bar
//! - [`entitykind`] – tag naming what kind of game object an entity is
//! - [`input`] – control source state bridged into movement
//! - [`intelligence`] – generic finite-state machine component
//! - [`mapposition`] – world-space position (pivot) for an entity
//! - [`movement`] – per-tick translation/rotation intents and speeds
//! - [`orientation`] – facing angle and the sixteen compass directions
//! - [`physics`] – collider categories and circular contact bodies
//! - [`playerbot`] – player avatar data
//! - [`rules`] – fuzzy facts and the mandate decision
//! - [`shadow`] – decorative shadow under an entity
//! - [`sprite`] – current texture and overlay of an entity's body
//! - [`taskbot`] – task bot mandate, patrol paths and ground bot attack data
//! - [`zindex`] – rendering order hint and fixed world layers

pub mod agent;
pub mod animation;
pub mod captive;
pub mod charge;
pub mod entitykind;
pub mod input;
pub mod intelligence;
pub mod mapposition;
pub mod movement;
pub mod orientation;
pub mod physics;
pub mod playerbot;
pub mod rules;
pub mod shadow;
pub mod sprite;
pub mod taskbot;
pub mod zindex;

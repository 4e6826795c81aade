//! Task bot level simulation.
//!
//! This library exposes the simulation core of a top-down action level: a
//! player bot, task bots that patrol, hunt and attack under a fuzzy rule
//! system, captive moogles and traps, all driven by per-entity state
//! machines on a `bevy_ecs` world.
//!
//! - [`components`] – per-entity data (charge, movement, animation, agents, ...)
//! - [`entities`] – entity assembly and cross-entity operations
//! - [`events`] – notifications for observers outside gameplay
//! - [`geometry`] – 2D helpers shared by movement, steering and pathfinding
//! - [`level`] – the level world and its tick
//! - [`resources`] – tuning, level layout, snapshots, navigation graph, assets
//! - [`states`] – the state machines of every entity kind
//! - [`steering`] – steering goals, behaviors and the weighted solver
//! - [`systems`] – the stages of a tick

pub mod components;
pub mod entities;
pub mod events;
pub mod geometry;
pub mod level;
pub mod resources;
pub mod states;
pub mod steering;
pub mod systems;

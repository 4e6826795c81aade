//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by states and systems during a tick: tuning, level layout,
//! timing, the navigation graph and asset tables. Each submodule documents
//! the semantics and intended usage of its resource(s).
//!
//! Overview
//! - `animationstore` – animation clip tables per animation set, built from atlases
//! - `gameplayconfig` – tuning constants, optionally overridden from an INI file
//! - `levelconfig` – level layout read from JSON
//! - `levelentities` – entities of the running level in insertion order
//! - `leveloutcome` – active/paused/success/fail phase and the level clock
//! - `loading` – bridge to the background animation loading thread
//! - `obstaclegraph` – navigation graph around buffered obstacle polygons
//! - `snapshot` – per-tick distance snapshot for rule evaluation
//! - `worldtime` – simulation time and delta
pub mod animationstore;
pub mod gameplayconfig;
pub mod levelconfig;
pub mod levelentities;
pub mod leveloutcome;
pub mod loading;
pub mod obstaclegraph;
pub mod snapshot;
pub mod worldtime;

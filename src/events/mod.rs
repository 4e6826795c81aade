//! Event and message types exchanged by the simulation.
//!
//! Gameplay reacts to contacts and charge loss synchronously inside the tick;
//! the events here announce what happened to observers outside gameplay
//! (presentation, logging, tests) without coupling them to the stages.
//!
//! Submodules:
//! - [`charge`] – an entity strictly lost charge
//! - [`contact`] – two physics bodies began or ended contact
//! - [`leveloutcome`] – the level changed phase
//! - [`loading`] – commands and messages for the background loading thread
//!
//! See each submodule for concrete event data and semantics.

pub mod charge;
pub mod contact;
pub mod leveloutcome;
pub mod loading;

//! Level layout read from JSON.
//!
//! A level file names every point of interest (spawn points, patrol path
//! waypoints, trap positions), lists the static obstacle polygons and
//! describes the task bots and traps to place.
//!
//! # File Format
//!
//! ```json
//! {
//!   "nodes": { "transporter_coordinate": [0, 0], "moogle_coordinate": [400, 0],
//!              "good_1": [100, 100], "good_2": [200, 100], "bad_1": [100, -100] },
//!   "obstacles": [ [[50, 50], [80, 50], [80, 80], [50, 80]] ],
//!   "taskBotConfigurations": [
//!     { "locomotion": "ground", "initialOrientation": "East",
//!       "goodPathNodeNames": ["good_1", "good_2"], "badPathNodeNames": ["bad_1"],
//!       "startsBad": true }
//!   ],
//!   "trapConfigurations": [ { "initialOrientation": "North", "trapPosition": ["good_2"] } ],
//!   "initialPlayerBotOrientation": "East",
//!   "moogleOrientation": "South",
//!   "nextLevel": "Level_2",
//!   "timeLimit": 90.0,
//!   "proximityFactor": 1000.0
//! }
//! ```
//!
//! [`LevelConfiguration::from_json_str`] validates everything up front, so a
//! configuration that loaded successfully never fails to spawn.

use bevy_ecs::prelude::Resource;
use glam::Vec2;
use log::info;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::components::orientation::{CompassDirection, ParseCompassError};
use crate::steering::obstacles::PolygonObstacle;

/// Node the player bot beams in at.
pub const PLAYER_SPAWN_NODE: &str = "transporter_coordinate";
/// Node the captive moogle waits at.
pub const MOOGLE_SPAWN_NODE: &str = "moogle_coordinate";

#[derive(Debug, Error)]
pub enum LevelConfigError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse level file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown locomotion `{0}` found while parsing task bot data")]
    UnknownLocomotion(String),
    #[error(transparent)]
    Compass(#[from] ParseCompassError),
    #[error("level has no node named `{0}`")]
    MissingNode(String),
    #[error("{0} has no path nodes")]
    EmptyPath(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locomotion {
    Ground,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBotConfiguration {
    pub locomotion: String,
    pub initial_orientation: String,
    pub good_path_node_names: Vec<String>,
    pub bad_path_node_names: Vec<String>,
    #[serde(default)]
    pub starts_bad: bool,
}

impl TaskBotConfiguration {
    pub fn locomotion(&self) -> Result<Locomotion, LevelConfigError> {
        match self.locomotion.as_str() {
            "ground" => Ok(Locomotion::Ground),
            other => Err(LevelConfigError::UnknownLocomotion(other.to_string())),
        }
    }

    pub fn initial_orientation(&self) -> Result<CompassDirection, LevelConfigError> {
        Ok(self.initial_orientation.parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrapConfiguration {
    pub initial_orientation: String,
    /// Only the first name is used.
    pub trap_position: Vec<String>,
}

impl TrapConfiguration {
    pub fn initial_orientation(&self) -> Result<CompassDirection, LevelConfigError> {
        Ok(self.initial_orientation.parse()?)
    }
}

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfiguration {
    #[serde(default)]
    pub nodes: FxHashMap<String, Vec2>,
    #[serde(default)]
    pub obstacles: Vec<Vec<Vec2>>,
    #[serde(default)]
    pub task_bot_configurations: Vec<TaskBotConfiguration>,
    #[serde(default)]
    pub trap_configurations: Vec<TrapConfiguration>,
    pub initial_player_bot_orientation: String,
    pub moogle_orientation: String,
    #[serde(default)]
    pub next_level: Option<String>,
    pub time_limit: f32,
    pub proximity_factor: f32,
}

impl LevelConfiguration {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, LevelConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!(
            "Loaded level {} ({} task bots, {} traps, {} obstacles)",
            path.display(),
            config.task_bot_configurations.len(),
            config.trap_configurations.len(),
            config.obstacles.len()
        );
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, LevelConfigError> {
        let config: LevelConfiguration = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every name and orientation the level refers to.
    pub fn validate(&self) -> Result<(), LevelConfigError> {
        self.initial_player_bot_orientation()?;
        self.moogle_orientation()?;
        self.player_spawn_position()?;
        self.moogle_spawn_position()?;

        for bot in &self.task_bot_configurations {
            bot.locomotion()?;
            bot.initial_orientation()?;
            let good = self.path_points(&bot.good_path_node_names)?;
            let bad = self.path_points(&bot.bad_path_node_names)?;
            if bot.starts_bad && bad.is_empty() {
                return Err(LevelConfigError::EmptyPath("bad patrol path"));
            }
            if !bot.starts_bad && good.is_empty() {
                return Err(LevelConfigError::EmptyPath("good patrol path"));
            }
        }

        for trap in &self.trap_configurations {
            trap.initial_orientation()?;
            self.trap_position(trap)?;
        }
        Ok(())
    }

    pub fn node_position(&self, name: &str) -> Result<Vec2, LevelConfigError> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| LevelConfigError::MissingNode(name.to_string()))
    }

    pub fn path_points(&self, names: &[String]) -> Result<Vec<Vec2>, LevelConfigError> {
        names.iter().map(|name| self.node_position(name)).collect()
    }

    pub fn player_spawn_position(&self) -> Result<Vec2, LevelConfigError> {
        self.node_position(PLAYER_SPAWN_NODE)
    }

    pub fn moogle_spawn_position(&self) -> Result<Vec2, LevelConfigError> {
        self.node_position(MOOGLE_SPAWN_NODE)
    }

    pub fn trap_position(&self, trap: &TrapConfiguration) -> Result<Vec2, LevelConfigError> {
        let name = trap
            .trap_position
            .first()
            .ok_or(LevelConfigError::EmptyPath("trap position"))?;
        self.node_position(name)
    }

    pub fn initial_player_bot_orientation(&self) -> Result<CompassDirection, LevelConfigError> {
        Ok(self.initial_player_bot_orientation.parse()?)
    }

    pub fn moogle_orientation(&self) -> Result<CompassDirection, LevelConfigError> {
        Ok(self.moogle_orientation.parse()?)
    }

    pub fn polygon_obstacles(&self) -> Vec<PolygonObstacle> {
        self.obstacles
            .iter()
            .filter(|vertices| vertices.len() >= 3)
            .map(|vertices| PolygonObstacle::new(vertices.clone()))
            .collect()
    }
}

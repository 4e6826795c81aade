//! Facing angle of an entity and its 16-point compass quantisation.
//!
//! Animation tables are keyed by [`CompassDirection`], so the facing angle in
//! [`Orientation`] is always read back through [`Orientation::compass_direction`]
//! when a clip is selected.

use bevy_ecs::prelude::Component;
use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sixteen compass points, counter-clockwise from east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompassDirection {
    East = 0,
    EastByNorthEast,
    NorthEast,
    NorthByNorthEast,
    North,
    NorthByNorthWest,
    NorthWest,
    WestByNorthWest,
    West,
    WestBySouthWest,
    SouthWest,
    SouthBySouthWest,
    South,
    SouthBySouthEast,
    SouthEast,
    EastBySouthEast,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown or unsupported compass direction `{0}`")]
pub struct ParseCompassError(pub String);

impl CompassDirection {
    pub const ALL: [CompassDirection; 16] = [
        CompassDirection::East,
        CompassDirection::EastByNorthEast,
        CompassDirection::NorthEast,
        CompassDirection::NorthByNorthEast,
        CompassDirection::North,
        CompassDirection::NorthByNorthWest,
        CompassDirection::NorthWest,
        CompassDirection::WestByNorthWest,
        CompassDirection::West,
        CompassDirection::WestBySouthWest,
        CompassDirection::SouthWest,
        CompassDirection::SouthBySouthWest,
        CompassDirection::South,
        CompassDirection::SouthBySouthEast,
        CompassDirection::SouthEast,
        CompassDirection::EastBySouthEast,
    ];

    pub fn raw(self) -> usize {
        self as usize
    }

    pub fn from_raw(raw: usize) -> Self {
        Self::ALL[raw % Self::ALL.len()]
    }

    /// Quantise a rotation in radians to the nearest compass point.
    pub fn from_rotation(z_rotation: f32) -> Self {
        let orientation = z_rotation.rem_euclid(TAU) / TAU;
        let raw = (orientation * 16.0).round() as usize % 16;
        Self::from_raw(raw)
    }

    /// Rotation in radians pointing exactly at this compass point.
    pub fn z_rotation(self) -> f32 {
        self.raw() as f32 * TAU / 16.0
    }
}

impl FromStr for CompassDirection {
    type Err = ParseCompassError;

    /// Only the eight principal directions have names in level files.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "North" => Ok(CompassDirection::North),
            "NorthEast" => Ok(CompassDirection::NorthEast),
            "East" => Ok(CompassDirection::East),
            "SouthEast" => Ok(CompassDirection::SouthEast),
            "South" => Ok(CompassDirection::South),
            "SouthWest" => Ok(CompassDirection::SouthWest),
            "West" => Ok(CompassDirection::West),
            "NorthWest" => Ok(CompassDirection::NorthWest),
            other => Err(ParseCompassError(other.to_string())),
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.raw())
    }
}

/// Facing angle in radians.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    pub z_rotation: f32,
}

impl Orientation {
    pub fn new(z_rotation: f32) -> Self {
        Self { z_rotation }
    }

    pub fn facing(direction: CompassDirection) -> Self {
        Self {
            z_rotation: direction.z_rotation(),
        }
    }

    pub fn compass_direction(&self) -> CompassDirection {
        CompassDirection::from_rotation(self.z_rotation)
    }

    pub fn set_compass_direction(&mut self, direction: CompassDirection) {
        self.z_rotation = direction.z_rotation();
    }
}

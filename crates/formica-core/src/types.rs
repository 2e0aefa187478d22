//! Shared types used across all Formica crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation frame counter.
pub type Frame = u64;

/// Unique identifier for an agent in the colony.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u64);

/// Unique identifier for a brood item (egg, larva or pupa).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BroodId(pub u64);

/// Unique identifier for a food source or store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ant#{}", self.0)
    }
}

/// A position in continuous cell units. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Center of a grid cell.
    pub fn of_cell(col: i32, row: i32) -> Self {
        Self::new(col as f64 + 0.5, row as f64 + 0.5)
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Angle from this position toward another, in radians.
    pub fn angle_to(&self, other: &Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// The grid cell containing this position.
    pub fn cell(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

/// Fixed reference points of the nest, set at world generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NestLayout {
    /// First solid row; everything above is open air.
    pub surface_row: i32,
    /// Column of the nest entrance and the main shaft.
    pub entrance_col: i32,
}

impl NestLayout {
    /// Whether a row lies below ground.
    pub fn is_underground(&self, row: i32) -> bool {
        row >= self.surface_row
    }

    /// Standing spot on the surface two cells east of the entrance hole.
    pub fn landing(&self) -> Position {
        Position::of_cell(self.entrance_col + 2, self.surface_row - 1)
    }
}

impl Default for NestLayout {
    fn default() -> Self {
        Self { surface_row: 12, entrance_col: 60 }
    }
}

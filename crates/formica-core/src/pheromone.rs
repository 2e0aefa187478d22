//! Pheromone field: chemical memory written into the soil.
//!
//! Three channels share the terrain's dimensions:
//! - **trail**: laid by every moving worker, marks the paths of the nest
//! - **food**: laid by foragers carrying food home
//! - **dig**: laid at active dig faces, recruits and spaces out diggers
//!
//! Values are capped at [`MAX_STRENGTH`] and fade by a per-channel
//! retention factor each decay pass. Trail persists the longest, dig
//! fades fastest. Anything below [`EPSILON`] snaps to zero so the sparse
//! checkpoint encoding stays small.

use crate::types::Position;
use serde::{Deserialize, Serialize};

/// Upper bound for any cell on any channel.
pub const MAX_STRENGTH: f32 = 1.5;
/// Values below this are cleared during decay.
pub const EPSILON: f32 = 0.005;
/// A sample must beat the local value by this much to count as a gradient.
const GRADIENT_MARGIN: f32 = 0.02;
/// Number of directions sampled by [`PheromoneField::gradient`].
const GRADIENT_DIRECTIONS: usize = 12;

/// A pheromone channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Trail,
    Food,
    Dig,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Trail, Channel::Food, Channel::Dig];

    /// Fraction of strength kept per decay pass.
    pub fn retention(self) -> f32 {
        match self {
            Channel::Trail => 0.995,
            Channel::Food => 0.99,
            Channel::Dig => 0.98,
        }
    }
}

/// Direction and strength of the strongest nearby sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    /// Angle in radians toward the strongest sample.
    pub angle: f64,
    /// Value of the strongest sample.
    pub strength: f32,
}

/// Sparse encoding of one channel: only non-zero cells are listed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseLayer {
    #[serde(default)]
    pub length: usize,
    #[serde(default)]
    pub entries: Vec<(usize, f32)>,
}

/// Three dense float layers over the terrain grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneField {
    cols: usize,
    rows: usize,
    trail: Vec<f32>,
    food: Vec<f32>,
    dig: Vec<f32>,
}

impl PheromoneField {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            trail: vec![0.0; cols * rows],
            food: vec![0.0; cols * rows],
            dig: vec![0.0; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn layer(&self, channel: Channel) -> &[f32] {
        match channel {
            Channel::Trail => &self.trail,
            Channel::Food => &self.food,
            Channel::Dig => &self.dig,
        }
    }

    fn layer_mut(&mut self, channel: Channel) -> &mut Vec<f32> {
        match channel {
            Channel::Trail => &mut self.trail,
            Channel::Food => &mut self.food,
            Channel::Dig => &mut self.dig,
        }
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows {
            Some(row as usize * self.cols + col as usize)
        } else {
            None
        }
    }

    /// Value at a cell; zero outside the grid.
    pub fn get(&self, channel: Channel, col: i32, row: i32) -> f32 {
        self.index(col, row).map_or(0.0, |i| self.layer(channel)[i])
    }

    /// Value under a continuous position.
    pub fn sample(&self, channel: Channel, pos: &Position) -> f32 {
        let (c, r) = pos.cell();
        self.get(channel, c, r)
    }

    /// Add strength at a cell, capped at [`MAX_STRENGTH`]. Ignored outside the grid.
    pub fn deposit(&mut self, channel: Channel, col: i32, row: i32, amount: f32) {
        if let Some(i) = self.index(col, row) {
            let cell = &mut self.layer_mut(channel)[i];
            *cell = (*cell + amount.max(0.0)).min(MAX_STRENGTH);
        }
    }

    /// Deposit under a continuous position.
    pub fn deposit_at(&mut self, channel: Channel, pos: &Position, amount: f32) {
        let (c, r) = pos.cell();
        self.deposit(channel, c, r, amount);
    }

    /// One decay pass over every channel.
    pub fn decay(&mut self) {
        for channel in Channel::ALL {
            let retention = channel.retention();
            for v in self.layer_mut(channel).iter_mut() {
                *v *= retention;
                if *v < EPSILON {
                    *v = 0.0;
                }
            }
        }
    }

    /// Sample twelve directions at `radius` and report the strongest one.
    ///
    /// Returns `None` unless the best sample clearly exceeds the value
    /// under `pos`, so a flat or empty field yields no direction.
    pub fn gradient(&self, channel: Channel, pos: &Position, radius: f64) -> Option<Gradient> {
        let here = self.sample(channel, pos);
        let mut best: Option<Gradient> = None;
        for k in 0..GRADIENT_DIRECTIONS {
            let angle = k as f64 * std::f64::consts::TAU / GRADIENT_DIRECTIONS as f64;
            let spot = Position::new(pos.x + angle.cos() * radius, pos.y + angle.sin() * radius);
            let strength = self.sample(channel, &spot);
            if best.map_or(true, |b| strength > b.strength) {
                best = Some(Gradient { angle, strength });
            }
        }
        best.filter(|b| b.strength > 0.0 && b.strength > here + GRADIENT_MARGIN)
    }

    /// Sum of a channel over the whole grid.
    pub fn total(&self, channel: Channel) -> f32 {
        self.layer(channel).iter().sum()
    }

    /// Encode a channel as `(index, value)` pairs, rounded to three decimals.
    pub fn to_sparse(&self, channel: Channel) -> SparseLayer {
        let entries = self
            .layer(channel)
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > 0.0)
            .map(|(i, &v)| (i, (v * 1000.0).round() / 1000.0))
            .filter(|(_, v)| *v > 0.0)
            .collect();
        SparseLayer { length: self.cols * self.rows, entries }
    }

    /// Load a channel from its sparse encoding. Out-of-range indices are skipped
    /// and values are clamped to the valid range.
    pub fn load_sparse(&mut self, channel: Channel, sparse: &SparseLayer) {
        let layer = self.layer_mut(channel);
        layer.iter_mut().for_each(|v| *v = 0.0);
        for &(i, v) in &sparse.entries {
            if let Some(cell) = layer.get_mut(i) {
                *cell = if v.is_finite() { v.clamp(0.0, MAX_STRENGTH) } else { 0.0 };
            }
        }
    }
}

//! Terrain grid: the diggable soil the nest is carved from.
//!
//! Every cell holds a hardness from 0 (open) to 5 (rock). Digging wears a
//! cell down one step at a time; the final step clears it and reinforces
//! the soil around the new hole so tunnels hold their shape. Loose material
//! (hardness 1–2) is subject to a periodic gravity pass, which is how spoil
//! dumped on the surface slumps into mounds.
//!
//! Reads outside the grid return [`BEDROCK`], so callers never need bounds
//! checks of their own.

use crate::error::CheckpointError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An open (dug or air) cell.
pub const OPEN: u8 = 0;
/// Hardest loose material. Anything at or below this can fall.
pub const LOOSE_MAX: u8 = 2;
/// Hardness given to walls next to a freshly cleared cell.
pub const REINFORCED: u8 = 3;
/// Maximum hardness; also what out-of-bounds reads return.
pub const BEDROCK: u8 = 5;

/// Dense row-major hardness grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    cols: usize,
    rows: usize,
    surface_row: i32,
    cells: Vec<u8>,
    total_dug: u64,
}

impl TerrainGrid {
    /// A grid filled with a single hardness.
    pub fn filled(cols: usize, rows: usize, surface_row: i32, hardness: u8) -> Self {
        Self {
            cols,
            rows,
            surface_row,
            cells: vec![hardness.min(BEDROCK); cols * rows],
            total_dug: 0,
        }
    }

    /// Rebuild a grid from raw cells, as read from a checkpoint.
    pub fn from_cells(
        cols: usize,
        rows: usize,
        surface_row: i32,
        mut cells: Vec<u8>,
        total_dug: u64,
    ) -> Result<Self, CheckpointError> {
        if cols == 0 || rows == 0 {
            return Err(CheckpointError::Dimensions { cols, rows });
        }
        if cells.len() != cols * rows {
            return Err(CheckpointError::TerrainSize { expected: cols * rows, found: cells.len() });
        }
        for c in cells.iter_mut() {
            *c = (*c).min(BEDROCK);
        }
        Ok(Self { cols, rows, surface_row, cells, total_dug })
    }

    /// Decode a base64 terrain blob.
    pub fn from_base64(
        cols: usize,
        rows: usize,
        surface_row: i32,
        blob: &str,
        total_dug: u64,
    ) -> Result<Self, CheckpointError> {
        let cells = STANDARD.decode(blob.trim())?;
        Self::from_cells(cols, rows, surface_row, cells, total_dug)
    }

    /// Encode the cells as a base64 blob.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.cells)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn surface_row(&self) -> i32 {
        self.surface_row
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Cells cleared by digging since the colony was founded.
    pub fn total_dug(&self) -> u64 {
        self.total_dug
    }

    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if self.in_bounds(col, row) {
            Some(row as usize * self.cols + col as usize)
        } else {
            None
        }
    }

    /// Hardness at a cell; [`BEDROCK`] outside the grid.
    pub fn hardness(&self, col: i32, row: i32) -> u8 {
        self.index(col, row).map_or(BEDROCK, |i| self.cells[i])
    }

    pub fn is_open(&self, col: i32, row: i32) -> bool {
        self.hardness(col, row) == OPEN
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        !self.is_open(col, row)
    }

    /// Whether the cell holds material that gravity can move.
    pub fn is_loose(&self, col: i32, row: i32) -> bool {
        let h = self.hardness(col, row);
        h > OPEN && h <= LOOSE_MAX
    }

    /// Whether any of the eight surrounding cells is solid. The row above the
    /// grid does not count, so nothing can cling to the sky.
    pub fn has_foothold(&self, col: i32, row: i32) -> bool {
        for dr in -1..=1 {
            for dc in -1..=1 {
                if (dc, dr) == (0, 0) || row + dr < 0 {
                    continue;
                }
                if self.is_solid(col + dc, row + dr) {
                    return true;
                }
            }
        }
        false
    }

    /// Set a cell's hardness, clamped to `0..=5`. Ignored outside the grid.
    pub fn set(&mut self, col: i32, row: i32, hardness: u8) {
        if let Some(i) = self.index(col, row) {
            self.cells[i] = hardness.min(BEDROCK);
        }
    }

    /// Cells on the outer frame (side columns and bottom row) cannot be dug.
    pub fn is_frame(&self, col: i32, row: i32) -> bool {
        col <= 0
            || col as usize >= self.cols.saturating_sub(1)
            || row as usize >= self.rows.saturating_sub(1)
    }

    /// Dig once at a cell.
    ///
    /// Hardness 1 clears the cell, counts it as dug and reinforces the
    /// surrounding walls. Harder cells lose one point of hardness. Open
    /// cells, bedrock, frame cells and cells outside the grid are left
    /// untouched.
    /// Returns `true` only when the cell was cleared.
    pub fn dig(&mut self, col: i32, row: i32) -> bool {
        let Some(i) = self.index(col, row) else {
            return false;
        };
        if self.is_frame(col, row) {
            return false;
        }
        match self.cells[i] {
            OPEN | BEDROCK..=u8::MAX => false,
            1 => {
                self.cells[i] = OPEN;
                self.total_dug += 1;
                self.stabilize_around(col, row);
                true
            }
            h => {
                self.cells[i] = h - 1;
                false
            }
        }
    }

    /// Raise loose walls above and beside a cleared cell so they stop falling.
    pub fn stabilize_around(&mut self, col: i32, row: i32) {
        const WALLS: [(i32, i32); 5] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0)];
        for (dc, dr) in WALLS {
            let (c, r) = (col + dc, row + dr);
            if r < self.surface_row {
                continue;
            }
            if self.is_loose(c, r) {
                self.set(c, r, REINFORCED);
            }
        }
    }

    /// Topmost solid row in a column, if any.
    pub fn top_solid(&self, col: i32) -> Option<i32> {
        (0..self.rows as i32).find(|&row| self.is_solid(col, row))
    }

    /// Drop one unit of loose spoil on top of the ground near `col`.
    ///
    /// Tries the column itself plus a small random jitter. A column whose
    /// first solid cell lies below the surface is a hole and is skipped.
    /// Returns the cell that received the material.
    pub fn deposit_sand<R: Rng>(&mut self, col: i32, rng: &mut R) -> Option<(i32, i32)> {
        let jitter = rng.gen_range(-2..=2);
        for c in [col + jitter, col] {
            if !self.in_bounds(c, 0) || self.is_frame(c, 0) {
                continue;
            }
            let Some(top) = self.top_solid(c) else {
                continue;
            };
            if top > self.surface_row || top == 0 {
                continue;
            }
            self.set(c, top - 1, 1);
            return Some((c, top - 1));
        }
        None
    }

    /// One gravity pass over loose material, scanning bottom-up.
    ///
    /// A loose cell falls straight down into an open cell. Otherwise it
    /// slides to a lower diagonal whose side cell is also open, choosing
    /// randomly when both sides are free. Returns how many cells moved.
    pub fn apply_gravity<R: Rng>(&mut self, rng: &mut R) -> usize {
        let mut moved = 0;
        for row in (0..self.rows as i32 - 1).rev() {
            for col in 0..self.cols as i32 {
                if !self.is_loose(col, row) {
                    continue;
                }
                let h = self.hardness(col, row);
                let target = if self.is_open(col, row + 1) {
                    Some(col)
                } else {
                    let left = self.is_open(col - 1, row + 1) && self.is_open(col - 1, row);
                    let right = self.is_open(col + 1, row + 1) && self.is_open(col + 1, row);
                    match (left, right) {
                        (true, true) => Some(if rng.gen_bool(0.5) { col - 1 } else { col + 1 }),
                        (true, false) => Some(col - 1),
                        (false, true) => Some(col + 1),
                        (false, false) => None,
                    }
                };
                if let Some(c) = target {
                    self.set(col, row, OPEN);
                    self.set(c, row + 1, h);
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Number of cells below the surface.
    pub fn underground_cells(&self) -> usize {
        let surface = self.surface_row.clamp(0, self.rows as i32) as usize;
        (self.rows - surface) * self.cols
    }

    /// Number of open cells below the surface.
    pub fn open_underground_cells(&self) -> usize {
        let surface = self.surface_row.clamp(0, self.rows as i32) as usize;
        self.cells[surface * self.cols..].iter().filter(|&&h| h == OPEN).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn grid() -> TerrainGrid {
        TerrainGrid::filled(10, 10, 2, 4)
    }

    #[test]
    fn out_of_bounds_reads_as_bedrock() {
        let g = grid();
        assert_eq!(g.hardness(-1, 0), BEDROCK);
        assert_eq!(g.hardness(0, 10), BEDROCK);
        assert!(g.is_solid(100, 100));
    }

    #[test]
    fn dig_hardness_one_clears_and_counts() {
        let mut g = grid();
        g.set(4, 5, 1);
        assert!(g.dig(4, 5));
        assert!(g.is_open(4, 5));
        assert_eq!(g.total_dug(), 1);
    }

    #[test]
    fn dig_hard_cell_only_softens() {
        let mut g = grid();
        g.set(4, 5, 3);
        assert!(!g.dig(4, 5));
        assert_eq!(g.hardness(4, 5), 2);
        assert_eq!(g.total_dug(), 0);
    }

    #[test]
    fn bedrock_cannot_be_dug() {
        let mut g = TerrainGrid::filled(60, 60, 10, 3);
        g.set(30, 40, BEDROCK);
        for _ in 0..10 {
            assert!(!g.dig(30, 40));
        }
        assert_eq!(g.hardness(30, 40), BEDROCK);
        assert_eq!(g.total_dug(), 0);

        g.set(30, 41, BEDROCK - 1);
        assert!(!g.dig(30, 41));
        assert_eq!(g.hardness(30, 41), BEDROCK - 2);
    }

    #[test]
    fn dig_open_cell_is_noop() {
        let mut g = grid();
        g.set(4, 5, OPEN);
        assert!(!g.dig(4, 5));
        assert_eq!(g.total_dug(), 0);
        assert!(!g.dig(-3, 5));
    }

    #[test]
    fn frame_cells_cannot_be_dug() {
        let mut g = grid();
        g.set(0, 5, 1);
        assert!(!g.dig(0, 5));
        assert_eq!(g.hardness(0, 5), 1);
    }

    #[test]
    fn clearing_reinforces_loose_walls() {
        let mut g = TerrainGrid::filled(10, 10, 2, 1);
        assert!(g.dig(5, 5));
        for (c, r) in [(4, 4), (5, 4), (6, 4), (4, 5), (6, 5)] {
            assert_eq!(g.hardness(c, r), REINFORCED, "wall at {c},{r}");
        }
        // Floor is not touched.
        assert_eq!(g.hardness(5, 6), 1);
    }

    #[test]
    fn stabilization_skips_air_rows() {
        let mut g = TerrainGrid::filled(10, 10, 5, 1);
        g.stabilize_around(5, 5);
        assert_eq!(g.hardness(5, 4), 1);
        assert_eq!(g.hardness(4, 5), REINFORCED);
    }

    #[test]
    fn foothold_ignores_sky() {
        let mut g = TerrainGrid::filled(5, 5, 3, 2);
        for r in 0..3 {
            for c in 0..5 {
                g.set(c, r, OPEN);
            }
        }
        assert!(!g.has_foothold(2, 0));
        assert!(!g.has_foothold(2, 1));
        assert!(g.has_foothold(2, 2));
        assert!(g.has_foothold(-1, 0));
    }

    #[test]
    fn hardness_is_clamped() {
        let mut g = grid();
        g.set(1, 1, 200);
        assert_eq!(g.hardness(1, 1), BEDROCK);
    }

    #[test]
    fn gravity_leaves_bedrock_pocket_alone() {
        let mut g = TerrainGrid::filled(5, 5, 0, BEDROCK);
        g.set(2, 2, OPEN);
        let before = g.clone();
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(g.apply_gravity(&mut rng), 0);
        assert_eq!(g, before);
    }

    #[test]
    fn loose_cell_falls_into_open_space() {
        let mut g = TerrainGrid::filled(5, 6, 0, OPEN);
        for c in 0..5 {
            g.set(c, 5, BEDROCK);
        }
        g.set(2, 1, 2);
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..10 {
            g.apply_gravity(&mut rng);
        }
        assert_eq!(g.hardness(2, 4), 2);
        assert!(g.is_open(2, 1));
    }

    #[test]
    fn reinforced_cells_never_fall() {
        let mut g = TerrainGrid::filled(5, 6, 0, OPEN);
        g.set(2, 1, REINFORCED);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(g.apply_gravity(&mut rng), 0);
        assert_eq!(g.hardness(2, 1), REINFORCED);
    }

    #[test]
    fn deposit_sand_lands_on_surface() {
        let mut g = TerrainGrid::filled(20, 10, 4, 3);
        for r in 0..4 {
            for c in 0..20 {
                g.set(c, r, OPEN);
            }
        }
        let mut rng = SmallRng::seed_from_u64(9);
        let (c, r) = g.deposit_sand(10, &mut rng).expect("placed");
        assert_eq!(r, 3);
        assert!((8..=12).contains(&c));
        assert_eq!(g.hardness(c, r), 1);
    }

    #[test]
    fn deposit_sand_skips_holes() {
        let mut g = TerrainGrid::filled(3, 10, 4, 3);
        for r in 0..10 {
            for c in 0..3 {
                if r < 4 || c == 1 {
                    g.set(c, r, OPEN);
                }
            }
        }
        let mut rng = SmallRng::seed_from_u64(2);
        // Only column 1 is interior and it is an open hole.
        assert_eq!(g.deposit_sand(1, &mut rng), None);
    }

    #[test]
    fn base64_blob_restores_cells() {
        let mut g = grid();
        g.dig(3, 3);
        g.set(5, 5, 1);
        assert!(g.dig(5, 5));
        let blob = g.to_base64();
        let restored = TerrainGrid::from_base64(10, 10, 2, &blob, g.total_dug()).unwrap();
        assert_eq!(restored, g);
    }

    #[test]
    fn wrong_size_blob_is_rejected() {
        let blob = STANDARD.encode([1u8, 2, 3]);
        let err = TerrainGrid::from_base64(10, 10, 2, &blob, 0).unwrap_err();
        assert_eq!(err, CheckpointError::TerrainSize { expected: 100, found: 3 });
        assert!(TerrainGrid::from_base64(10, 10, 2, "***", 0).is_err());
    }

    #[test]
    fn underground_counts() {
        let mut g = TerrainGrid::filled(10, 10, 2, 1);
        assert_eq!(g.underground_cells(), 80);
        g.dig(5, 5);
        g.set(5, 0, OPEN);
        assert_eq!(g.open_underground_cells(), 1);
    }
}

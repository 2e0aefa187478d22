//! Chamber detection and typing.
//!
//! Chambers are found from scratch on every pass by flood-filling the
//! *roomy* open cells below the surface: cells with most of their eight
//! neighbours open. Single-width tunnels are not roomy, so they connect
//! rooms without merging them into one component.
//!
//! Typing is a second pass over the fresh list. Rules claim chambers in a
//! fixed order (royal, brood, food); anything left keeps the type of the
//! previous chamber at roughly the same spot, and the shallowest small
//! leftover becomes the midden.

use formica_core::brood::Brood;
use formica_core::chamber::{radius_for, Chamber, ChamberType};
use formica_core::food::{FoodKind, FoodSource};
use formica_core::terrain::TerrainGrid;
use formica_core::types::Position;
use std::collections::VecDeque;

/// Finds chambers in the terrain and assigns them functions.
#[derive(Debug, Clone)]
pub struct ChamberDetector {
    /// Smallest component recorded as a chamber.
    pub min_size: usize,
    /// Open neighbours (of 8) a cell needs to count as roomy.
    pub min_open_neighbours: usize,
    /// Previous chamber within this distance passes its type on.
    pub continuity_radius: f64,
    /// Chambers up to this size are candidates for the midden.
    pub midden_max_size: usize,
}

impl Default for ChamberDetector {
    fn default() -> Self {
        Self { min_size: 12, min_open_neighbours: 5, continuity_radius: 4.0, midden_max_size: 24 }
    }
}

impl ChamberDetector {
    fn is_roomy(&self, grid: &TerrainGrid, col: i32, row: i32) -> bool {
        if !grid.is_open(col, row) {
            return false;
        }
        let mut open = 0;
        for dr in -1..=1 {
            for dc in -1..=1 {
                if (dc, dr) != (0, 0) && grid.is_open(col + dc, row + dr) {
                    open += 1;
                }
            }
        }
        open >= self.min_open_neighbours
    }

    /// Flood-fill roomy cells below the surface into untyped chambers.
    pub fn detect(&self, grid: &TerrainGrid) -> Vec<Chamber> {
        let cols = grid.cols();
        let rows = grid.rows();
        let surface = grid.surface_row().max(0);
        let mut seen = vec![false; cols * rows];
        let mut chambers = Vec::new();

        for row in surface..rows as i32 {
            for col in 0..cols as i32 {
                let start = row as usize * cols + col as usize;
                if seen[start] || !self.is_roomy(grid, col, row) {
                    continue;
                }
                seen[start] = true;
                let mut queue = VecDeque::from([(col, row)]);
                let (mut size, mut sum_x, mut sum_y) = (0usize, 0.0, 0.0);
                while let Some((c, r)) = queue.pop_front() {
                    size += 1;
                    sum_x += c as f64 + 0.5;
                    sum_y += r as f64 + 0.5;
                    for (dc, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                        let (nc, nr) = (c + dc, r + dr);
                        if nr < surface || !grid.in_bounds(nc, nr) {
                            continue;
                        }
                        let i = nr as usize * cols + nc as usize;
                        if !seen[i] && self.is_roomy(grid, nc, nr) {
                            seen[i] = true;
                            queue.push_back((nc, nr));
                        }
                    }
                }
                if size >= self.min_size {
                    let centroid = Position::new(sum_x / size as f64, sum_y / size as f64);
                    chambers.push(Chamber {
                        centroid,
                        size,
                        depth: centroid.y - surface as f64,
                        radius: radius_for(size),
                        chamber_type: ChamberType::General,
                    });
                }
            }
        }
        chambers
    }

    /// Assign functions to freshly detected chambers.
    pub fn assign_types(
        &self,
        chambers: &mut [Chamber],
        previous: &[Chamber],
        queen: Option<Position>,
        brood: &[Brood],
        food: &[FoodSource],
    ) {
        for ch in chambers.iter_mut() {
            ch.chamber_type = ChamberType::General;
        }
        let mut deepest_first: Vec<usize> = (0..chambers.len()).collect();
        deepest_first.sort_by(|&a, &b| chambers[b].depth.total_cmp(&chambers[a].depth));

        let claim = |chambers: &mut [Chamber], kind: ChamberType, test: &dyn Fn(&Chamber) -> bool| {
            let hit = deepest_first
                .iter()
                .copied()
                .find(|&i| chambers[i].chamber_type == ChamberType::General && test(&chambers[i]));
            if let Some(i) = hit {
                chambers[i].chamber_type = kind;
            }
        };

        if let Some(q) = queen {
            claim(&mut *chambers, ChamberType::Royal, &|c: &Chamber| c.contains(&q));
        }
        claim(&mut *chambers, ChamberType::Brood, &|c: &Chamber| brood.iter().any(|b| c.contains(&b.position)));
        claim(&mut *chambers, ChamberType::Food, &|c: &Chamber| {
            food.iter()
                .any(|f| f.kind == FoodKind::Store && !f.is_depleted() && c.contains(&f.position))
        });

        // Continuity: unclaimed chambers inherit a type nobody took this pass.
        for i in 0..chambers.len() {
            if chambers[i].chamber_type != ChamberType::General {
                continue;
            }
            let inherited = previous
                .iter()
                .filter(|p| p.chamber_type != ChamberType::General)
                .filter(|p| p.centroid.distance_to(&chambers[i].centroid) <= self.continuity_radius)
                .map(|p| p.chamber_type)
                .find(|kind| chambers.iter().all(|c| c.chamber_type != *kind));
            if let Some(kind) = inherited {
                chambers[i].chamber_type = kind;
            }
        }

        if chambers.iter().all(|c| c.chamber_type != ChamberType::Midden) {
            let midden = (0..chambers.len())
                .filter(|&i| chambers[i].chamber_type == ChamberType::General && chambers[i].size <= self.midden_max_size)
                .min_by(|&a, &b| chambers[a].depth.total_cmp(&chambers[b].depth));
            if let Some(i) = midden {
                chambers[i].chamber_type = ChamberType::Midden;
            }
        }
    }
}

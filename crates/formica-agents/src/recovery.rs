//! Stuck recovery.
//!
//! An agent that has failed to move for too long is lifted out: first to the
//! nearest standable cell above it, then sideways along its row, and as a
//! last resort back to the surface beside the entrance.

use crate::nav::{is_walkable, surface_cell};
use formica_core::agent::Agent;
use formica_core::terrain::TerrainGrid;
use formica_core::types::{NestLayout, Position};

/// Stuck frames after which an agent is relocated.
pub const STUCK_LIMIT: u32 = 90;
const SEARCH_UP: i32 = 12;
const SEARCH_SIDE: i32 = 10;

/// Where a stuck agent should be moved to.
pub fn find_escape(grid: &TerrainGrid, layout: &NestLayout, from: (i32, i32)) -> Position {
    let (c, r) = from;
    for dy in 1..=SEARCH_UP {
        if is_walkable(grid, c, r - dy) {
            return Position::of_cell(c, r - dy);
        }
    }
    for d in 1..=SEARCH_SIDE {
        for side in [-1, 1] {
            if is_walkable(grid, c + side * d, r) {
                return Position::of_cell(c + side * d, r);
            }
        }
    }
    let landing = layout.landing().cell();
    let (lc, lr) = surface_cell(grid, landing.0);
    Position::of_cell(lc, lr)
}

/// Relocate an agent if it has been stuck too long. Returns whether it moved.
pub fn escape_if_stuck(agent: &mut Agent, grid: &TerrainGrid, layout: &NestLayout) -> bool {
    if agent.stuck <= STUCK_LIMIT {
        return false;
    }
    agent.position = find_escape(grid, layout, agent.position.cell());
    agent.stuck = 0;
    agent.stop();
    agent.path.clear();
    true
}

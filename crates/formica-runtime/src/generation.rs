//! Nest generation, the world a fresh colony is founded in.
//!
//! Air above the surface row; below it, soil that gets harder with depth,
//! a scattering of rock pockets, and a bedrock frame. A short starter shaft
//! under the entrance opens into the pocket where the queen waits. Cells
//! opened here are not counted as dug.

use crate::colony::{Colony, ColonyConfig};
use formica_agents::nav::surface_cell;
use formica_core::agent::Agent;
use formica_core::context::SimulationContext;
use formica_core::food::{FoodKind, FoodSource};
use formica_core::terrain::{TerrainGrid, BEDROCK, OPEN};
use formica_core::types::{NestLayout, Position};
use tracing::debug;

/// Length of the starter shaft in cells.
pub const STARTER_SHAFT: i32 = 4;
/// Half-width and height of the queen's pocket.
const POCKET_HALF_WIDTH: i32 = 2;
const POCKET_HEIGHT: i32 = 4;
/// Workers are placed at most this far from the entrance.
const WORKER_SPREAD: u32 = 10;
/// Forage sources keep at least this far from the entrance.
const FORAGE_MIN_DISTANCE: i32 = 12;

/// Everything a fresh colony starts with.
pub struct Nest {
    pub layout: NestLayout,
    pub terrain: TerrainGrid,
    pub agents: Vec<Agent>,
    pub food: Vec<FoodSource>,
}

/// Soil hardness for a cell `depth` rows below the surface.
fn soil(depth: i32, ctx: &mut SimulationContext) -> u8 {
    let bump = u8::from(ctx.chance(0.5));
    match depth {
        d if d < 4 => 1 + bump,
        d if d < 16 => 2 + bump,
        _ => 3 + bump,
    }
}

/// Lay out the terrain: soil, rock pockets, frame, starter shaft and royal pocket.
pub fn generate_terrain(config: &ColonyConfig, layout: &NestLayout, ctx: &mut SimulationContext) -> TerrainGrid {
    let (cols, rows) = (config.cols as i32, config.rows as i32);
    let surface = layout.surface_row;
    let mut grid = TerrainGrid::filled(config.cols, config.rows, surface, OPEN);

    for row in surface..rows {
        for col in 0..cols {
            grid.set(col, row, soil(row - surface, ctx));
        }
    }

    // Rock pockets, kept clear of the starter nest.
    let pockets = (config.cols * config.rows) / 600;
    for _ in 0..pockets {
        let cx = ctx.between(1, cols as u32 - 2) as i32;
        let cy = ctx.between((surface + 8) as u32, rows as u32 - 3) as i32;
        if (cx - layout.entrance_col).abs() <= POCKET_HALF_WIDTH + 4 && cy <= surface + STARTER_SHAFT + POCKET_HEIGHT + 4 {
            continue;
        }
        let radius = ctx.between(1, 2) as i32;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    grid.set(cx + dx, cy + dy, BEDROCK);
                }
            }
        }
    }

    // Bedrock frame: side columns and the two bottom rows.
    for row in surface..rows {
        grid.set(0, row, BEDROCK);
        grid.set(cols - 1, row, BEDROCK);
    }
    for col in 0..cols {
        grid.set(col, rows - 1, BEDROCK);
        grid.set(col, rows - 2, BEDROCK);
    }

    let mut opened = Vec::new();
    for row in surface..surface + STARTER_SHAFT {
        opened.push((layout.entrance_col, row));
    }
    let pocket_top = surface + STARTER_SHAFT;
    for row in pocket_top..pocket_top + POCKET_HEIGHT {
        for col in layout.entrance_col - POCKET_HALF_WIDTH..=layout.entrance_col + POCKET_HALF_WIDTH {
            opened.push((col, row));
        }
    }
    for &(col, row) in &opened {
        grid.set(col, row, OPEN);
    }
    for &(col, row) in &opened {
        grid.stabilize_around(col, row);
    }
    grid
}

/// Floor cell of the royal pocket, where the queen starts.
pub fn royal_floor(layout: &NestLayout) -> (i32, i32) {
    (layout.entrance_col, layout.surface_row + STARTER_SHAFT + POCKET_HEIGHT - 1)
}

/// A forage source at a random surface column away from the entrance.
fn forage_source(grid: &TerrainGrid, layout: &NestLayout, ctx: &mut SimulationContext) -> Option<FoodSource> {
    let cols = grid.cols() as i32;
    for _ in 0..20 {
        let col = ctx.between(3, (cols - 4) as u32) as i32;
        if (col - layout.entrance_col).abs() < FORAGE_MIN_DISTANCE {
            continue;
        }
        let (c, r) = surface_cell(grid, col);
        let amount = ctx.between(20, 40);
        return Some(FoodSource::new(ctx, Position::of_cell(c, r), amount, FoodKind::Forage));
    }
    None
}

/// Generate the full starting state for a colony.
pub fn generate(config: &ColonyConfig, ctx: &mut SimulationContext) -> Nest {
    let layout = NestLayout { surface_row: config.surface_row, entrance_col: config.cols as i32 / 2 };
    let terrain = generate_terrain(config, &layout, ctx);

    let mut agents = Vec::with_capacity(config.initial_workers + 1);
    let (qc, qr) = royal_floor(&layout);
    agents.push(Agent::queen(ctx, Position::of_cell(qc, qr), 100.0));
    for _ in 0..config.initial_workers {
        let offset = ctx.between(3, WORKER_SPREAD) as i32;
        let col = if ctx.chance(0.5) { layout.entrance_col + offset } else { layout.entrance_col - offset };
        let (c, r) = surface_cell(&terrain, col);
        let maturity = ctx.uniform(0.2, 0.6);
        agents.push(Agent::worker(ctx, Position::of_cell(c, r), maturity, 80.0));
    }

    let mut food = Vec::new();
    if config.initial_stored_food > 0 {
        food.push(FoodSource::new(ctx, Position::of_cell(qc + 1, qr), config.initial_stored_food, FoodKind::Store));
    }
    for _ in 0..config.initial_food_sources {
        if let Some(source) = forage_source(&terrain, &layout, ctx) {
            food.push(source);
        }
    }

    Nest { layout, terrain, agents, food }
}

/// Top the surface back up with forage sources.
pub fn respawn_forage(colony: &mut Colony) {
    let live = colony.food.iter().filter(|f| f.kind == FoodKind::Forage).count();
    if live >= colony.config.max_forage_sources {
        return;
    }
    if let Some(source) = forage_source(&colony.terrain, &colony.layout, &mut colony.ctx) {
        debug!(frame = colony.frame, amount = source.amount, "Forage respawned");
        colony.food.push(source);
    }
}

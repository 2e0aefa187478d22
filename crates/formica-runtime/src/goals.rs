//! Colony goal manager.
//!
//! Every goal pass measures the nest (shaft depth, galleries, chambers,
//! food reserves, hungry larvae), derives the construction phase and the
//! colony-wide dig priority, and sets role quotas for idle initiative.
//! External directives are merged here too: they override the dig
//! priority, patch the tuning parameters, and shift a few workers per pass.

use crate::colony::{Colony, ColonyEvent};
use formica_core::agent::{role_of, AgentState, Role};
use formica_core::chamber::{find_chamber, Chamber, ChamberType};
use formica_core::food::stored_food;
use formica_core::goals::{entry_state, ActiveDirective, Directive, Phase, RoleQuotas};
use formica_core::terrain::TerrainGrid;
use formica_core::types::NestLayout;
use tracing::{debug, info};

/// Shaft depth that ends the shaft phase.
pub const SHAFT_TARGET: u32 = 24;
/// Galleries that end the gallery phase.
pub const GALLERY_TARGET: usize = 2;
/// Chambers that end the chamber phase.
pub const CHAMBER_TARGET: usize = 3;
/// Shortest horizontal run counted as a gallery.
pub const GALLERY_MIN_RUN: i32 = 8;
/// Dig priority multiplier when reserves are short.
const LEAN_TIMES: f64 = 0.6;
/// Workers moved per shift per pass.
const SHIFT_STEP: u32 = 2;

/// Open cells straight down the entrance column, starting at the surface row.
pub fn measure_shaft(grid: &TerrainGrid, layout: &NestLayout) -> u32 {
    let mut depth = 0;
    let mut row = layout.surface_row;
    while row < grid.rows() as i32 && grid.is_open(layout.entrance_col, row) {
        depth += 1;
        row += 1;
    }
    depth
}

/// Horizontal runs of open cells deep enough to be galleries.
///
/// The entrance column breaks runs, and a run directly under a counted
/// run on the row above belongs to the same gallery.
pub fn count_galleries(grid: &TerrainGrid, layout: &NestLayout) -> usize {
    let mut counted: Vec<(i32, i32)> = Vec::new();
    let mut galleries = 0;
    for row in layout.surface_row + 3..grid.rows() as i32 {
        let mut runs = Vec::new();
        let mut start: Option<i32> = None;
        for col in 0..=grid.cols() as i32 {
            let open = col < grid.cols() as i32 && col != layout.entrance_col && grid.is_open(col, row);
            match (open, start) {
                (true, None) => start = Some(col),
                (false, Some(s)) => {
                    if col - s >= GALLERY_MIN_RUN {
                        runs.push((s, col - 1));
                    }
                    start = None;
                }
                _ => {}
            }
        }
        for &(s, e) in &runs {
            if !counted.iter().any(|&(ps, pe)| s <= pe && ps <= e) {
                galleries += 1;
            }
        }
        counted = runs;
    }
    galleries
}

/// Phase implied by the nest's measurements.
pub fn derive_phase(shaft_depth: u32, galleries: usize, chambers: usize) -> Phase {
    if shaft_depth < SHAFT_TARGET {
        Phase::Shaft
    } else if galleries < GALLERY_TARGET {
        Phase::Gallery
    } else if chambers < CHAMBER_TARGET {
        Phase::Chamber
    } else {
        Phase::Expand
    }
}

/// Role quotas for a phase, adjusted for hunger and waiting larvae.
pub fn quotas_for(phase: Phase, short_of_food: bool, larvae_waiting: bool) -> RoleQuotas {
    let mut q = match phase {
        Phase::Shaft => RoleQuotas { digger: 0.6, forager: 0.2, nurse: 0.1, explorer: 0.1 },
        Phase::Gallery => RoleQuotas { digger: 0.5, forager: 0.25, nurse: 0.1, explorer: 0.15 },
        Phase::Chamber => RoleQuotas { digger: 0.45, forager: 0.25, nurse: 0.15, explorer: 0.15 },
        Phase::Expand => RoleQuotas { digger: 0.35, forager: 0.35, nurse: 0.15, explorer: 0.15 },
    };
    if short_of_food {
        q.forager += 0.1;
        q.digger -= 0.1;
    }
    if larvae_waiting {
        q.nurse = q.nurse.max(0.2);
    }
    q
}

fn count_chambers(chambers: &[Chamber]) -> (usize, bool) {
    (chambers.len(), find_chamber(chambers, ChamberType::Brood).is_some())
}

/// Recompute the goal snapshot. The phase never moves backwards.
pub fn recompute(colony: &mut Colony) {
    let shaft_depth = measure_shaft(&colony.terrain, &colony.layout);
    let gallery_count = count_galleries(&colony.terrain, &colony.layout);
    let (chamber_count, has_brood_chamber) = count_chambers(&colony.chambers);
    let food_reserves = stored_food(&colony.food);
    let larvae_needing_food = colony.brood.iter().filter(|b| b.needs_feeding()).count();
    let population = colony.agents.len();

    let goals = &mut colony.goals;
    let phase = derive_phase(shaft_depth, gallery_count, chamber_count).max(goals.phase);
    let short_of_food = (food_reserves as usize) < population;

    let intrinsic = phase.base_dig_priority() * if short_of_food { LEAN_TIMES } else { 1.0 };
    let dig_priority = goals
        .directive
        .as_ref()
        .and_then(|d| d.directive.dig_priority)
        .unwrap_or(intrinsic)
        .clamp(0.0, 1.0);

    goals.phase = phase;
    goals.dig_priority = dig_priority;
    goals.shaft_depth = shaft_depth;
    goals.gallery_count = gallery_count;
    goals.chamber_count = chamber_count;
    goals.has_brood_chamber = has_brood_chamber;
    goals.food_reserves = food_reserves;
    goals.larvae_needing_food = larvae_needing_food;
    goals.quotas = quotas_for(phase, short_of_food, larvae_needing_food > 0);
    goals.updated_at = colony.frame;
}

/// Drop the active directive once its lifetime is over.
pub fn expire_directive(colony: &mut Colony, events: &mut Vec<ColonyEvent>) {
    let expired = colony
        .goals
        .directive
        .as_ref()
        .is_some_and(|d| d.is_expired(colony.frame));
    if expired {
        colony.goals.directive = None;
        info!(frame = colony.frame, "Directive expired");
        events.push(ColonyEvent::DirectiveExpired);
    }
}

/// Merge a directive: tuning applies at once, the rest through the goal snapshot.
pub fn apply_directive(colony: &mut Colony, directive: Directive) {
    if !directive.tuning.is_empty() {
        colony.params.apply(&directive.tuning);
    }
    info!(
        frame = colony.frame,
        focus = directive.focus.len(),
        shifts = directive.role_shifts.len(),
        dig_priority = ?directive.dig_priority,
        note = directive.note.as_deref().unwrap_or(""),
        "Directive applied"
    );
    colony.goals.directive = Some(ActiveDirective::new(directive, colony.frame));
    recompute(colony);
}

/// Move a few workers per pending shift into their new role.
pub fn apply_pending_shifts(colony: &mut Colony) {
    let Some(active) = colony.goals.directive.as_mut() else {
        return;
    };
    let agents = &mut colony.agents;
    for shift in active.pending_shifts.iter_mut() {
        let Some(state) = entry_state(shift.to) else {
            shift.count = 0;
            continue;
        };
        let mut moved = 0;
        for agent in agents.iter_mut() {
            if moved >= SHIFT_STEP.min(shift.count) {
                break;
            }
            let role = role_of(agent);
            let eligible = match shift.from {
                Some(from) => role == from,
                None => role == Role::Idle,
            };
            let busy = agent.carrying_sand > 0 || agent.carrying_food > 0;
            if agent.is_queen || !eligible || busy || role == shift.to {
                continue;
            }
            agent.set_state(state);
            if state == AgentState::Rest {
                agent.resume_state = None;
            }
            moved += 1;
        }
        if moved == 0 {
            debug!(to = shift.to.as_str(), "No workers available for role shift");
            shift.count = 0;
        } else {
            shift.count -= moved;
        }
    }
    active.pending_shifts.retain(|s| s.count > 0);
}

//! Physics: collision against terrain and falling.
//!
//! Agents move through open cells only. A blocked move is retried along
//! each axis alone, so an ant slides along a wall instead of stopping dead.
//! When nothing works the agent's stuck counter grows; successful moves
//! wear it back down. An ant with nothing solid within reach falls.

use formica_core::agent::{is_supported, Agent};
use formica_core::terrain::TerrainGrid;
use formica_core::types::Position;

/// Downward acceleration per frame for an unsupported agent.
const GRAVITY: f64 = 0.12;
/// Terminal falling speed, kept below one cell per frame.
const MAX_FALL: f64 = 0.8;
/// Speeds below this count as standing still.
const MIN_MOVE: f64 = 0.01;
/// Largest per-axis step in one frame. Below one cell, so a move only ever
/// lands in a neighbouring cell and [`can_step`] sees every wall.
const MAX_STEP: f64 = 0.9;

fn clamp_velocity(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(-MAX_STEP, MAX_STEP)
    } else {
        0.0
    }
}

/// Whether a one-step move between two cells is possible.
///
/// Diagonal steps also need one of the two orthogonal cells open, so
/// agents cannot squeeze between two touching corners.
fn can_step(grid: &TerrainGrid, from: (i32, i32), to: (i32, i32)) -> bool {
    if !grid.is_open(to.0, to.1) {
        return false;
    }
    if from.0 != to.0 && from.1 != to.1 {
        return grid.is_open(to.0, from.1) || grid.is_open(from.0, to.1);
    }
    true
}

/// Apply gravity, then move the agent by its velocity with collision.
pub fn apply_physics(agent: &mut Agent, grid: &TerrainGrid) {
    agent.vx = clamp_velocity(agent.vx);
    agent.vy = clamp_velocity(agent.vy);
    if !is_supported(agent, grid) {
        agent.vy = (agent.vy.max(0.0) + GRAVITY).min(MAX_FALL);
        agent.vx *= 0.5;
    }

    let speed = (agent.vx * agent.vx + agent.vy * agent.vy).sqrt();
    if speed < MIN_MOVE {
        return;
    }

    let from = agent.position.cell();
    let full = Position::new(agent.position.x + agent.vx, agent.position.y + agent.vy);
    let x_only = Position::new(agent.position.x + agent.vx, agent.position.y);
    let y_only = Position::new(agent.position.x, agent.position.y + agent.vy);

    if can_step(grid, from, full.cell()) {
        agent.position = full;
    } else if agent.vx.abs() > MIN_MOVE && can_step(grid, from, x_only.cell()) {
        agent.position = x_only;
        agent.vy = 0.0;
    } else if agent.vy.abs() > MIN_MOVE && can_step(grid, from, y_only.cell()) {
        agent.position = y_only;
        agent.vx = 0.0;
    } else {
        agent.stop();
        agent.stuck += 1;
        return;
    }
    agent.stuck = agent.stuck.saturating_sub(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_core::context::SimulationContext;
    use formica_core::terrain::OPEN;

    fn corridor() -> TerrainGrid {
        // Horizontal tunnel along row 5, cols 2..8.
        let mut g = TerrainGrid::filled(10, 10, 0, 3);
        for c in 2..8 {
            g.set(c, 5, OPEN);
        }
        g
    }

    fn ant_at(col: i32, row: i32) -> Agent {
        let mut ctx = SimulationContext::seeded(5);
        Agent::worker(&mut ctx, Position::of_cell(col, row), 0.5, 50.0)
    }

    #[test]
    fn moves_through_open_cells() {
        let g = corridor();
        let mut a = ant_at(3, 5);
        a.vx = 0.3;
        apply_physics(&mut a, &g);
        assert!((a.position.x - 3.8).abs() < 1e-9);
        assert_eq!(a.stuck, 0);
    }

    #[test]
    fn slides_along_wall() {
        let g = corridor();
        let mut a = ant_at(3, 5);
        a.vx = 0.3;
        a.vy = 0.6;
        apply_physics(&mut a, &g);
        assert_eq!(a.position.cell(), (3, 5));
        assert!(a.position.x > 3.5);
        assert_eq!(a.vy, 0.0);
    }

    #[test]
    fn blocked_move_counts_as_stuck() {
        let g = corridor();
        let mut a = ant_at(7, 5);
        a.vx = 0.6;
        apply_physics(&mut a, &g);
        assert_eq!(a.position.cell(), (7, 5));
        assert_eq!(a.stuck, 1);
        assert_eq!(a.vx, 0.0);
    }

    #[test]
    fn runaway_velocity_stops_at_wall() {
        let g = corridor();
        let mut a = ant_at(3, 5);
        a.vx = 30.0;
        apply_physics(&mut a, &g);
        assert_eq!(a.position.cell(), (4, 5));
        assert!(a.vx <= MAX_STEP);
        for _ in 0..10 {
            a.vx = 30.0;
            apply_physics(&mut a, &g);
            assert!(a.position.x < 8.0);
        }
        assert_eq!(a.position.cell(), (7, 5));
        assert!(a.stuck > 0);
    }

    #[test]
    fn non_finite_velocity_is_dropped() {
        let g = corridor();
        let mut a = ant_at(3, 5);
        a.vx = f64::NAN;
        a.vy = f64::INFINITY;
        apply_physics(&mut a, &g);
        assert_eq!(a.position, Position::of_cell(3, 5));
        assert!(a.position.x.is_finite());
    }

    #[test]
    fn unsupported_agent_falls() {
        let mut g = TerrainGrid::filled(9, 12, 10, 3);
        for r in 0..10 {
            for c in 0..9 {
                g.set(c, r, OPEN);
            }
        }
        let mut a = ant_at(4, 2);
        for _ in 0..40 {
            apply_physics(&mut a, &g);
        }
        assert_eq!(a.position.cell(), (4, 9));
    }

    #[test]
    fn no_corner_squeeze() {
        let mut g = TerrainGrid::filled(6, 6, 0, 3);
        g.set(2, 2, OPEN);
        g.set(3, 3, OPEN);
        let mut a = ant_at(2, 2);
        a.vx = 0.7;
        a.vy = 0.7;
        apply_physics(&mut a, &g);
        assert_eq!(a.position.cell(), (2, 2));
    }
}

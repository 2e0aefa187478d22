//! Navigation: getting from one cell to another through the nest.
//!
//! Ants walk on surfaces: a cell is walkable when it is open and some
//! neighbouring cell is solid to hold on to. Paths are found with a
//! breadth-first search over walkable cells and cached on the agent; the
//! cache is thrown away when the terrain in front of the agent changes or
//! the agent stops making progress.

use formica_core::agent::{max_speed, Agent};
use formica_core::params::Params;
use formica_core::terrain::TerrainGrid;
use formica_core::types::Position;
use std::collections::VecDeque;

/// Upper bound on cells visited by a single path search.
const SEARCH_BUDGET: usize = 8000;
/// Waypoint counts as reached within this distance of its center.
const WAYPOINT_RADIUS: f64 = 0.35;

/// Outcome of one navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavStatus {
    /// Still on the way.
    Moving,
    /// Standing in the goal cell.
    Arrived,
    /// No walkable route; the agent steers straight at the goal instead.
    Blind,
}

/// Whether an ant can stand in a cell.
pub fn is_walkable(grid: &TerrainGrid, col: i32, row: i32) -> bool {
    grid.in_bounds(col, row) && grid.is_open(col, row) && grid.has_foothold(col, row)
}

/// Drop a cell straight down to the first walkable cell below it.
pub fn settle(grid: &TerrainGrid, col: i32, row: i32) -> (i32, i32) {
    let mut r = row;
    for _ in 0..grid.rows() {
        if is_walkable(grid, col, r) || !grid.is_open(col, r + 1) {
            break;
        }
        r += 1;
    }
    (col, r)
}

/// Standable surface cell in a column: just above its topmost solid cell.
pub fn surface_cell(grid: &TerrainGrid, col: i32) -> (i32, i32) {
    let top = grid.top_solid(col).unwrap_or(grid.rows() as i32);
    (col, (top - 1).max(0))
}

/// Breadth-first search over walkable cells.
///
/// The returned path excludes `from` and is stored next-step-last so it
/// can be consumed with `pop`.
pub fn find_path(grid: &TerrainGrid, from: (i32, i32), to: (i32, i32)) -> Option<Vec<(i32, i32)>> {
    if from == to {
        return Some(Vec::new());
    }
    if !grid.in_bounds(to.0, to.1) || !grid.is_open(to.0, to.1) {
        return None;
    }
    let cols = grid.cols();
    let index = |c: i32, r: i32| r as usize * cols + c as usize;
    let mut parent: Vec<u32> = vec![u32::MAX; cols * grid.rows()];
    let mut queue = VecDeque::new();

    // The start cell may be unwalkable (mid-fall, or embedded in spoil); search from it anyway.
    if !grid.in_bounds(from.0, from.1) {
        return None;
    }
    parent[index(from.0, from.1)] = index(from.0, from.1) as u32;
    queue.push_back(from);
    let mut visited = 0;

    while let Some((c, r)) = queue.pop_front() {
        visited += 1;
        if visited > SEARCH_BUDGET {
            return None;
        }
        if (c, r) == to {
            let mut path = Vec::new();
            let mut at = index(c, r);
            let start = index(from.0, from.1);
            while at != start {
                path.push(((at % cols) as i32, (at / cols) as i32));
                at = parent[at] as usize;
            }
            return Some(path);
        }
        for (dc, dr) in [(0, -1), (1, 0), (-1, 0), (0, 1)] {
            let (nc, nr) = (c + dc, r + dr);
            if !grid.in_bounds(nc, nr) {
                continue;
            }
            let i = index(nc, nr);
            if parent[i] != u32::MAX {
                continue;
            }
            if (nc, nr) == to || is_walkable(grid, nc, nr) {
                parent[i] = index(c, r) as u32;
                queue.push_back((nc, nr));
            }
        }
    }
    None
}

/// Point the agent's velocity at a position.
pub fn steer_toward(agent: &mut Agent, target: &Position, speed: f64) {
    let dx = target.x - agent.position.x;
    let dy = target.y - agent.position.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < 1e-6 {
        agent.stop();
        return;
    }
    let step = speed.min(dist);
    agent.vx = dx / dist * step;
    agent.vy = dy / dist * step;
    agent.heading = dy.atan2(dx);
}

/// Take one step toward a goal cell, planning a path when needed.
pub fn navigate(agent: &mut Agent, goal: (i32, i32), grid: &TerrainGrid, params: &Params) -> NavStatus {
    let here = agent.position.cell();
    let goal_pos = Position::of_cell(goal.0, goal.1);
    if here == goal {
        agent.path.clear();
        steer_toward(agent, &goal_pos, max_speed(agent, params) * 0.5);
        return NavStatus::Arrived;
    }

    let retarget = agent.target.map_or(true, |t| t.cell() != goal);
    let blocked = agent.path.last().is_some_and(|&(c, r)| !grid.is_open(c, r));
    if retarget || blocked || agent.path.is_empty() || agent.stuck > 20 {
        agent.target = Some(goal_pos);
        agent.path = find_path(grid, here, goal).unwrap_or_default();
    }

    let speed = max_speed(agent, params);
    let Some(&next) = agent.path.last() else {
        steer_toward(agent, &goal_pos, speed);
        return NavStatus::Blind;
    };
    let waypoint = Position::of_cell(next.0, next.1);
    if agent.position.distance_to(&waypoint) < WAYPOINT_RADIUS {
        agent.path.pop();
    }
    let aim = agent
        .path
        .last()
        .map_or(waypoint, |&(c, r)| Position::of_cell(c, r));
    steer_toward(agent, &aim, speed);
    NavStatus::Moving
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_core::terrain::OPEN;

    /// 12x12 grid, air above row 4, an L-shaped tunnel from the surface.
    fn nest() -> TerrainGrid {
        let mut g = TerrainGrid::filled(12, 12, 4, 3);
        for r in 0..4 {
            for c in 0..12 {
                g.set(c, r, OPEN);
            }
        }
        for r in 4..9 {
            g.set(6, r, OPEN);
        }
        for c in 6..10 {
            g.set(c, 8, OPEN);
        }
        g
    }

    #[test]
    fn walkable_needs_something_to_hold() {
        let g = nest();
        assert!(is_walkable(&g, 2, 3));
        assert!(!is_walkable(&g, 2, 1));
        assert!(is_walkable(&g, 6, 6));
        // Rim of the entrance hole: held by the diagonal walls.
        assert!(is_walkable(&g, 6, 3));
        assert!(!is_walkable(&g, 6, 9));
    }

    #[test]
    fn path_follows_tunnel() {
        let g = nest();
        let path = find_path(&g, (3, 3), (9, 8)).expect("path");
        assert_eq!(path.first(), Some(&(9, 8)));
        assert!(path.contains(&(6, 5)));
        for &(c, r) in &path {
            assert!(g.is_open(c, r));
        }
    }

    #[test]
    fn no_path_into_rock() {
        let g = nest();
        assert!(find_path(&g, (3, 3), (1, 10)).is_none());
    }

    #[test]
    fn settle_drops_to_floor() {
        let g = nest();
        assert_eq!(settle(&g, 2, 0), (2, 3));
        let mut open = TerrainGrid::filled(5, 10, 8, 3);
        for r in 0..8 {
            for c in 0..5 {
                open.set(c, r, OPEN);
            }
        }
        assert_eq!(settle(&open, 2, 1), (2, 7));
        assert_eq!(surface_cell(&open, 2), (2, 7));
    }
}

//! Per-state actions.
//!
//! Each handler moves the agent toward whatever its state is about, does
//! the work when it gets there, and switches state when the work is done.
//! Handlers only set velocity; the engine applies physics afterwards.

use crate::initiative::evaluate_initiative;
use crate::nav::{is_walkable, navigate, settle, steer_toward, surface_cell, NavStatus};
use crate::sense::Senses;
use formica_core::agent::{energy_fraction, max_speed, Agent, AgentState};
use formica_core::chamber::{find_chamber, ChamberType};
use formica_core::context::SimulationContext;
use formica_core::food::{nearest_food, stash_food, FoodKind};
use formica_core::goals::Phase;
use formica_core::pheromone::Channel;
use formica_core::terrain::{TerrainGrid, BEDROCK};
use formica_core::types::Position;
use formica_core::world::{AgentEvent, WorldView};
use std::f64::consts::{FRAC_PI_2, PI};

/// Energy restored by one unit of food.
pub const FOOD_ENERGY: f64 = 40.0;
/// Energy fraction at which a hungry agent stops eating.
pub const SATED: f64 = 0.6;
/// Energy regained per frame of rest.
pub const REST_GAIN: f64 = 0.03;
/// Extra energy spent per dig stroke.
pub const DIG_COST: f64 = 0.02;

const DIG_COOLDOWN: u32 = 8;
const DIG_GIVE_UP: u32 = 4000;
const ENTER_GIVE_UP: u32 = 2500;
const HAUL_GIVE_UP: u32 = 2500;
const FORAGE_GIVE_UP: u32 = 3000;
const CARRY_GIVE_UP: u32 = 4000;
const NURSE_GIVE_UP: u32 = 4000;
const HUNGRY_GIVE_UP: u32 = 1500;
const EXPLORE_REPORT: u32 = 1500;

/// Food units a forager picks up per trip.
const FOOD_PER_TRIP: u32 = 2;
/// Reach for picking up, dropping and feeding.
const CONTACT: f64 = 1.5;
/// Idle nestmates within this distance can be recruited.
const RECRUIT_RADIUS: f64 = 5.0;
/// How far idle surface workers drift from the entrance.
const IDLE_LEASH: i32 = 12;
/// Rows near the surface where diggers refuse to tunnel upward.
const CEILING_MARGIN: i32 = 3;

const TRAIL_MARK: f32 = 0.02;
const FOOD_MARK: f32 = 0.08;
const DIG_MARK: f32 = 0.25;

/// Run the handler for the agent's current state.
pub fn act(
    agent: &mut Agent,
    senses: &Senses,
    world: &mut WorldView<'_>,
    ctx: &mut SimulationContext,
    events: &mut Vec<AgentEvent>,
) {
    match agent.state {
        AgentState::Idle => idle(agent, senses, world, ctx),
        AgentState::Enter => enter(agent, senses, world, ctx),
        AgentState::Dig => dig(agent, senses, world, ctx, events),
        AgentState::Haul => haul(agent, world, ctx, events),
        AgentState::Forage => forage(agent, senses, world, ctx, events),
        AgentState::Carry => carry(agent, world, ctx, events),
        AgentState::Explore => explore(agent, senses, world, ctx),
        AgentState::Rest => rest(agent, world, ctx),
        AgentState::Nurse => nurse(agent, world, ctx, events),
        AgentState::Hungry => hungry(agent, senses, world, ctx, events),
    }
    lay_trail(agent, world);
}

fn lay_trail(agent: &Agent, world: &mut WorldView<'_>) {
    let moving = agent.vx.abs() + agent.vy.abs() > 0.01;
    if !moving {
        return;
    }
    world.pheromones.deposit_at(Channel::Trail, &agent.position, TRAIL_MARK);
    if agent.state == AgentState::Carry {
        world.pheromones.deposit_at(Channel::Food, &agent.position, FOOD_MARK);
    }
}

// --- Movement helpers ------------------------------------------------------

/// Step to a neighbouring walkable cell, preferring `bias` (or the current heading).
fn local_walk(agent: &mut Agent, grid: &TerrainGrid, ctx: &mut SimulationContext, speed: f64, bias: Option<f64>) {
    let here = agent.position.cell();
    if let Some(t) = agent.target {
        if t.cell() != here && t.distance_to(&agent.position) < 1.6 && is_walkable(grid, t.cell().0, t.cell().1) {
            steer_toward(agent, &t, speed);
            return;
        }
    }
    let prefer = bias.unwrap_or(agent.heading);
    let mut best: Option<((i32, i32), f64)> = None;
    for (dc, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
        let cell = (here.0 + dc, here.1 + dr);
        if !is_walkable(grid, cell.0, cell.1) {
            continue;
        }
        let angle = (dr as f64).atan2(dc as f64);
        let score = (angle - prefer).cos() + ctx.uniform(0.0, 1.2);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((cell, score));
        }
    }
    match best {
        Some((cell, _)) => {
            let t = Position::of_cell(cell.0, cell.1);
            agent.target = Some(t);
            agent.path.clear();
            steer_toward(agent, &t, speed);
        }
        None => agent.stop(),
    }
}

/// Horizontal angle toward a column, or `None` when already within `leash`.
fn leash_bias(agent: &Agent, col: i32, leash: i32) -> Option<f64> {
    let here = agent.position.cell().0;
    if (here - col).abs() <= leash {
        None
    } else if here < col {
        Some(0.0)
    } else {
        Some(PI)
    }
}

/// Deepest open cell of the shaft below the entrance, or the cell above a plugged entrance.
pub fn shaft_bottom(grid: &TerrainGrid, col: i32) -> (i32, i32) {
    let surface = grid.surface_row();
    let mut row = surface - 1;
    while grid.is_open(col, row + 1) && row + 1 < grid.rows() as i32 {
        row += 1;
    }
    (col, row)
}

/// Pick the next dig face: one orthogonal step, axis chosen in proportion to the heading.
fn choose_face(agent: &Agent, ctx: &mut SimulationContext) -> (i32, i32) {
    let (c, r) = agent.position.cell();
    let (dx, dy) = (agent.heading.cos(), agent.heading.sin());
    let horizontal = ctx.chance(dx.abs() / (dx.abs() + dy.abs()).max(1e-9));
    if horizontal {
        (c + if dx >= 0.0 { 1 } else { -1 }, r)
    } else {
        (c, r + if dy >= 0.0 { 1 } else { -1 })
    }
}

/// Initial heading for a digger, shaped by the construction phase.
fn phase_heading(phase: Phase, ctx: &mut SimulationContext) -> f64 {
    let side = if ctx.chance(0.5) { 0.0 } else { PI };
    match phase {
        Phase::Shaft => FRAC_PI_2,
        Phase::Gallery => side + ctx.uniform(-0.15, 0.15),
        Phase::Chamber => ctx.angle(),
        Phase::Expand => side + ctx.uniform(-0.6, 0.6),
    }
}

// --- States ----------------------------------------------------------------

fn idle(agent: &mut Agent, senses: &Senses, world: &mut WorldView<'_>, ctx: &mut SimulationContext) {
    if let Some(next) = evaluate_initiative(agent, world, ctx) {
        agent.set_state(next);
        return;
    }
    if agent.state_ticks > agent.traits.patience {
        agent.set_state(AgentState::Enter);
        return;
    }
    let speed = max_speed(agent, world.params) * 0.4;
    if senses.underground {
        local_walk(agent, world.terrain, ctx, speed, None);
    } else {
        let bias = leash_bias(agent, world.layout.entrance_col, IDLE_LEASH);
        local_walk(agent, world.terrain, ctx, speed, bias);
    }
}

fn enter(agent: &mut Agent, senses: &Senses, world: &mut WorldView<'_>, ctx: &mut SimulationContext) {
    if agent.state_ticks > ENTER_GIVE_UP {
        agent.set_state(AgentState::Explore);
        return;
    }
    let goals = world.goals;
    let layout = world.layout;
    let bottom = shaft_bottom(world.terrain, layout.entrance_col);

    if goals.phase == Phase::Shaft {
        if navigate(agent, bottom, world.terrain, world.params) == NavStatus::Arrived {
            agent.set_state(AgentState::Dig);
            agent.heading = FRAC_PI_2;
        }
        return;
    }

    let (_, row) = agent.position.cell();
    if senses.underground && row >= layout.surface_row + 2 {
        if ctx.chance((goals.dig_priority * (0.5 + agent.traits.dig_drive)).min(1.0)) {
            agent.set_state(AgentState::Dig);
            agent.heading = phase_heading(goals.phase, ctx);
        } else {
            agent.set_state(AgentState::Explore);
        }
        return;
    }
    let goal = match agent.target {
        Some(t) if t.cell().0 == layout.entrance_col && t.cell().1 > layout.surface_row => t.cell(),
        _ => {
            let depth = ctx.between(2, (bottom.1 - layout.surface_row).max(2) as u32) as i32;
            (layout.entrance_col, (layout.surface_row + depth).min(bottom.1))
        }
    };
    navigate(agent, goal, world.terrain, world.params);
}

fn dig(
    agent: &mut Agent,
    senses: &Senses,
    world: &mut WorldView<'_>,
    ctx: &mut SimulationContext,
    events: &mut Vec<AgentEvent>,
) {
    let params = world.params;
    let goals = world.goals;
    let layout = world.layout;
    if agent.carrying_sand >= params.sand_carry_capacity {
        agent.set_state(AgentState::Haul);
        return;
    }
    if agent.state_ticks > DIG_GIVE_UP && agent.carrying_sand == 0 {
        agent.set_state(AgentState::Explore);
        return;
    }
    agent.dig_cooldown = agent.dig_cooldown.saturating_sub(1);

    // Crowded faces branch off more often.
    let crowded = senses.local_dig > 0.8 || senses.crowding >= 2;
    let branch_odds = params.branching_chance * if crowded { 5.0 } else { 1.0 };
    if goals.phase != Phase::Shaft && ctx.chance(branch_odds) {
        agent.heading += if ctx.chance(0.5) { FRAC_PI_2 } else { -FRAC_PI_2 };
        agent.target = None;
    }

    let (col, row) = agent.position.cell();
    if agent.heading.sin() < -0.2 && row <= layout.surface_row + CEILING_MARGIN {
        agent.heading = FRAC_PI_2;
        agent.target = None;
    }
    if agent.heading.sin() > 0.2 && row >= world.terrain.rows() as i32 - 4 {
        agent.heading = if agent.heading.cos() >= 0.0 { 0.0 } else { PI };
        agent.target = None;
    }
    if goals.phase == Phase::Shaft && col != layout.entrance_col && row > layout.surface_row {
        agent.heading = if col < layout.entrance_col { 0.0 } else { PI };
    }

    let face = match agent.target {
        Some(t) if t.cell() != (col, row) => t.cell(),
        _ => {
            let f = choose_face(agent, ctx);
            agent.target = Some(Position::of_cell(f.0, f.1));
            f
        }
    };

    let speed = max_speed(agent, params) * 0.6;
    if world.terrain.is_open(face.0, face.1) {
        steer_toward(agent, &Position::of_cell(face.0, face.1), speed);
        return;
    }
    agent.stop();
    if agent.dig_cooldown > 0 {
        return;
    }
    if world.terrain.is_frame(face.0, face.1) || world.terrain.hardness(face.0, face.1) >= BEDROCK {
        agent.heading += if ctx.chance(0.5) { FRAC_PI_2 } else { -FRAC_PI_2 };
        agent.target = None;
        return;
    }

    agent.dig_cooldown = DIG_COOLDOWN;
    agent.energy -= DIG_COST;
    world.pheromones.deposit(Channel::Dig, face.0, face.1, DIG_MARK);
    world.pheromones.deposit(Channel::Dig, col, row, DIG_MARK * 0.5);
    if world.terrain.dig(face.0, face.1) {
        agent.carrying_sand += 1;
        events.push(AgentEvent::Dug { agent: agent.id, col: face.0, row: face.1 });
        reshape_heading(agent, goals.phase, row, layout.surface_row, ctx);
    }
}

/// Adjust the heading after a cell is cleared so tunnels take the phase's shape.
fn reshape_heading(agent: &mut Agent, phase: Phase, row: i32, surface_row: i32, ctx: &mut SimulationContext) {
    match phase {
        Phase::Shaft => {}
        Phase::Gallery => {
            if agent.heading.sin().abs() > 0.7 && row >= surface_row + 6 {
                agent.heading = if ctx.chance(0.5) { 0.0 } else { PI };
            } else {
                agent.heading += ctx.uniform(-0.2, 0.2);
            }
        }
        Phase::Chamber => {
            let turn = ctx.uniform(PI / 3.0, 2.0 * PI / 3.0);
            agent.heading += if ctx.chance(0.5) { turn } else { -turn };
        }
        Phase::Expand => agent.heading += ctx.uniform(-0.5, 0.5),
    }
}

/// Surface column where this agent dumps spoil. Stable per agent so mounds form.
fn dump_column(agent: &Agent, grid: &TerrainGrid, entrance_col: i32) -> i32 {
    let side = if agent.id.0 % 2 == 0 { 1 } else { -1 };
    let offset = 4 + (agent.id.0 % 7) as i32;
    (entrance_col + side * offset).clamp(2, grid.cols() as i32 - 3)
}

fn haul(agent: &mut Agent, world: &mut WorldView<'_>, ctx: &mut SimulationContext, events: &mut Vec<AgentEvent>) {
    if agent.state_ticks > HAUL_GIVE_UP {
        agent.carrying_sand = 0;
        agent.set_state(AgentState::Explore);
        return;
    }
    let layout = world.layout;
    let dump = dump_column(agent, world.terrain, layout.entrance_col);
    let goal = surface_cell(world.terrain, dump);
    if navigate(agent, goal, world.terrain, world.params) != NavStatus::Arrived {
        return;
    }
    let side = if dump >= layout.entrance_col { 1 } else { -1 };
    for _ in 0..agent.carrying_sand {
        if let Some((col, row)) = world.terrain.deposit_sand(dump + side * 3, ctx.rng()) {
            events.push(AgentEvent::SandDeposited { agent: agent.id, col, row });
        }
    }
    agent.carrying_sand = 0;
    let keep_digging = (world.goals.dig_priority * (0.5 + agent.traits.dig_drive)).min(1.0);
    agent.set_state(if ctx.chance(keep_digging) { AgentState::Enter } else { AgentState::Idle });
}

/// Drop any tandem link whose partner is gone or no longer foraging.
fn check_tandem(agent: &mut Agent, world: &WorldView<'_>) {
    let foraging = |id| {
        world
            .census
            .iter()
            .any(|s| s.id == id && s.state == AgentState::Forage)
    };
    if agent.tandem_leader.is_some_and(|id| !foraging(id)) {
        agent.tandem_leader = None;
    }
    if agent.tandem_follower.is_some_and(|id| !foraging(id)) {
        agent.tandem_follower = None;
    }
}

fn forage(
    agent: &mut Agent,
    senses: &Senses,
    world: &mut WorldView<'_>,
    ctx: &mut SimulationContext,
    events: &mut Vec<AgentEvent>,
) {
    if agent.state_ticks > FORAGE_GIVE_UP {
        agent.tandem_leader = None;
        agent.set_state(AgentState::Idle);
        return;
    }
    check_tandem(agent, world);
    let params = world.params;
    let layout = world.layout;
    if senses.underground {
        let exit = surface_cell(world.terrain, layout.landing().cell().0);
        navigate(agent, exit, world.terrain, params);
        return;
    }

    if let Some(seen) = senses.forage {
        if seen.distance < CONTACT {
            let taken = world
                .food
                .iter_mut()
                .find(|f| f.id == seen.id)
                .map_or(0, |f| f.take(FOOD_PER_TRIP));
            if taken > 0 {
                agent.carrying_food += taken;
                agent.tandem_leader = None;
                events.push(AgentEvent::FoodCollected { agent: agent.id, amount: taken });
                agent.set_state(AgentState::Carry);
            }
            return;
        }
        let (c, r) = seen.position.cell();
        navigate(agent, settle(world.terrain, c, r), world.terrain, params);
        return;
    }

    if let Some(leader) = agent.tandem_leader {
        if let Some(s) = world.census.iter().find(|s| s.id == leader) {
            if s.position.distance_to(&agent.position) > 1.5 {
                let (c, r) = s.position.cell();
                navigate(agent, (c, r), world.terrain, params);
                return;
            }
        }
    }

    let speed = max_speed(agent, params) * 0.8;
    let bias = leash_bias(agent, layout.entrance_col, params.forage_radius as i32)
        .or(senses.food_scent.map(|g| g.angle));
    local_walk(agent, world.terrain, ctx, speed, bias);
}

fn carry(agent: &mut Agent, world: &mut WorldView<'_>, ctx: &mut SimulationContext, events: &mut Vec<AgentEvent>) {
    check_tandem(agent, world);
    if agent.carrying_food == 0 {
        agent.set_state(AgentState::Forage);
        return;
    }
    let give_up = agent.state_ticks > CARRY_GIVE_UP;
    let layout = world.layout;
    let store = find_chamber(world.chambers, ChamberType::Food);
    let (goal, underground) = match store {
        Some(ch) => {
            let (c, r) = ch.centroid.cell();
            (settle(world.terrain, c, r), true)
        }
        None => (surface_cell(world.terrain, layout.entrance_col - 3), false),
    };
    let goal_pos = Position::of_cell(goal.0, goal.1);
    let arrived = navigate(agent, goal, world.terrain, world.params) == NavStatus::Arrived
        || agent.position.distance_to(&goal_pos) < CONTACT;
    if !arrived && !give_up {
        return;
    }

    let amount = agent.carrying_food;
    stash_food(world.food, ctx, agent.position, amount, 3.0);
    agent.carrying_food = 0;
    events.push(AgentEvent::FoodStored { agent: agent.id, amount, underground: arrived && underground });

    if agent.tandem_follower.is_none() {
        let recruit = world.census.iter().find(|s| {
            s.id != agent.id
                && !s.is_queen
                && s.state == AgentState::Idle
                && s.position.distance_to(&agent.position) <= RECRUIT_RADIUS
        });
        if let Some(follower) = recruit {
            events.push(AgentEvent::Recruited { leader: agent.id, follower: follower.id });
        }
    }
    agent.set_state(if ctx.chance(agent.traits.forage_drive) { AgentState::Forage } else { AgentState::Idle });
}

fn explore(agent: &mut Agent, senses: &Senses, world: &mut WorldView<'_>, ctx: &mut SimulationContext) {
    if agent.state_ticks > EXPLORE_REPORT {
        agent.set_state(AgentState::Idle);
        return;
    }
    let goals = world.goals;
    let speed = max_speed(agent, world.params) * 0.7;

    if !senses.underground {
        if senses.forage.is_some() {
            agent.set_state(AgentState::Forage);
            return;
        }
        let bias = leash_bias(agent, world.layout.entrance_col, world.params.forage_radius as i32);
        local_walk(agent, world.terrain, ctx, speed, bias);
        return;
    }

    if agent.state_ticks % 30 == 0 {
        if let Some(g) = senses.dig_scent {
            if g.strength > 0.3 && ctx.chance(goals.dig_priority) {
                agent.set_state(AgentState::Dig);
                agent.heading = g.angle;
                return;
            }
        }
    }
    if ctx.chance(0.002 * goals.dig_priority * agent.traits.dig_drive) {
        let (c, r) = agent.position.cell();
        let walls: Vec<(i32, i32)> = [(1, 0), (-1, 0), (0, 1)]
            .into_iter()
            .filter(|(dc, dr)| {
                let (fc, fr) = (c + dc, r + dr);
                world.terrain.is_solid(fc, fr) && !world.terrain.is_frame(fc, fr)
            })
            .collect();
        if !walls.is_empty() {
            let (dc, dr) = walls[ctx.between(0, walls.len() as u32 - 1) as usize];
            agent.set_state(AgentState::Dig);
            agent.heading = (dr as f64).atan2(dc as f64);
            return;
        }
    }
    let bias = if ctx.chance(0.3) { senses.trail.map(|g| g.angle) } else { None };
    local_walk(agent, world.terrain, ctx, speed, bias);
}

fn rest(agent: &mut Agent, world: &mut WorldView<'_>, ctx: &mut SimulationContext) {
    agent.stop();
    agent.energy = (agent.energy + REST_GAIN).min(world.params.max_energy);
    agent.ticks_since_rest = 0;
    if agent.state_ticks >= agent.rest_duration {
        agent.rest_window = ctx.between(6000, 9000);
        agent.rest_duration = ctx.between(400, 900);
        let next = agent
            .resume_state
            .take()
            .filter(|s| !matches!(s, AgentState::Rest | AgentState::Hungry))
            .unwrap_or(AgentState::Idle);
        agent.set_state(next);
    }
}

fn nurse(agent: &mut Agent, world: &mut WorldView<'_>, ctx: &mut SimulationContext, events: &mut Vec<AgentEvent>) {
    let pos = agent.position;
    let larva = world
        .brood
        .iter()
        .filter(|b| b.needs_feeding())
        .min_by(|a, b| a.position.distance_to(&pos).total_cmp(&b.position.distance_to(&pos)))
        .map(|b| (b.id, b.position));

    let Some((larva_id, larva_pos)) = larva.filter(|_| agent.state_ticks <= NURSE_GIVE_UP) else {
        if agent.carrying_food > 0 {
            stash_food(world.food, ctx, pos, agent.carrying_food, 3.0);
            events.push(AgentEvent::FoodStored { agent: agent.id, amount: agent.carrying_food, underground: true });
            agent.carrying_food = 0;
        }
        agent.set_state(AgentState::Idle);
        return;
    };

    if agent.carrying_food == 0 {
        let Some(store) = nearest_food(world.food, &pos, |f| f.kind == FoodKind::Store) else {
            agent.set_state(AgentState::Idle);
            return;
        };
        let (store_id, store_pos) = (store.id, store.position);
        if store_pos.distance_to(&pos) < CONTACT {
            if let Some(s) = world.food.iter_mut().find(|f| f.id == store_id) {
                agent.carrying_food += s.take(1);
            }
            return;
        }
        let (c, r) = store_pos.cell();
        navigate(agent, settle(world.terrain, c, r), world.terrain, world.params);
        return;
    }

    if larva_pos.distance_to(&pos) < CONTACT {
        if let Some(b) = world.brood.iter_mut().find(|b| b.id == larva_id) {
            if b.feed() {
                agent.carrying_food -= 1;
                events.push(AgentEvent::LarvaFed { agent: agent.id, brood: larva_id });
            }
        }
        return;
    }
    let (c, r) = larva_pos.cell();
    navigate(agent, settle(world.terrain, c, r), world.terrain, world.params);
}

fn hungry(
    agent: &mut Agent,
    senses: &Senses,
    world: &mut WorldView<'_>,
    ctx: &mut SimulationContext,
    events: &mut Vec<AgentEvent>,
) {
    let params = world.params;
    if energy_fraction(agent, params) >= SATED {
        agent.set_state(AgentState::Idle);
        return;
    }
    if agent.state_ticks > HUNGRY_GIVE_UP {
        agent.resume_state = None;
        agent.set_state(AgentState::Rest);
        return;
    }
    let pos = agent.position;
    let Some(meal) = nearest_food(world.food, &pos, |_| true) else {
        let speed = max_speed(agent, params) * 0.6;
        let bias = if senses.underground { Some(-FRAC_PI_2) } else { senses.food_scent.map(|g| g.angle) };
        local_walk(agent, world.terrain, ctx, speed, bias);
        return;
    };
    let (meal_id, meal_pos) = (meal.id, meal.position);
    if meal_pos.distance_to(&pos) < CONTACT {
        let eaten = world
            .food
            .iter_mut()
            .find(|f| f.id == meal_id)
            .map_or(0, |f| f.take(1));
        if eaten > 0 {
            agent.energy = (agent.energy + FOOD_ENERGY).min(params.max_energy);
            events.push(AgentEvent::Ate { agent: agent.id });
        }
        agent.stop();
        return;
    }
    let (c, r) = meal_pos.cell();
    navigate(agent, settle(world.terrain, c, r), world.terrain, params);
}

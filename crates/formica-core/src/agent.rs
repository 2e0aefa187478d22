//! Agent record: one ant and the pure queries derived from it.
//!
//! The record is plain data. Everything the behaviour engine needs to know
//! about an ant's situation (is it underground, is it holding on to a wall,
//! is it hungry) is a free function over the agent and the terrain, so the
//! same questions can be asked from the engine, the goal manager and tests.

use crate::context::SimulationContext;
use crate::params::Params;
use crate::terrain::TerrainGrid;
use crate::types::{AgentId, NestLayout, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of max energy below which a worker goes looking for food.
pub const HUNGER_THRESHOLD: f64 = 0.3;
/// Maturity gained per frame: full maturity after five simulated days.
pub const MATURITY_PER_FRAME: f64 = 1.0 / 90_000.0;

/// What an agent is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentState {
    /// Waiting for something to do.
    #[default]
    Idle,
    /// Walking to the entrance and down into the nest.
    Enter,
    /// Working a dig face.
    Dig,
    /// Carrying spoil up to the surface.
    Haul,
    /// Searching the surface for food.
    Forage,
    /// Bringing food home.
    Carry,
    /// Wandering the tunnels looking for work.
    Explore,
    /// Recovering energy.
    Rest,
    /// Feeding larvae.
    Nurse,
    /// Looking for something to eat.
    Hungry,
}

impl AgentState {
    pub const ALL: [AgentState; 10] = [
        AgentState::Idle,
        AgentState::Enter,
        AgentState::Dig,
        AgentState::Haul,
        AgentState::Forage,
        AgentState::Carry,
        AgentState::Explore,
        AgentState::Rest,
        AgentState::Nurse,
        AgentState::Hungry,
    ];

    /// Integer code used in checkpoints.
    pub fn code(self) -> u8 {
        match self {
            AgentState::Idle => 0,
            AgentState::Enter => 1,
            AgentState::Dig => 2,
            AgentState::Haul => 3,
            AgentState::Forage => 4,
            AgentState::Carry => 5,
            AgentState::Explore => 6,
            AgentState::Rest => 7,
            AgentState::Nurse => 8,
            AgentState::Hungry => 9,
        }
    }

    /// Decode a checkpoint state code. Unknown codes become `Idle`.
    pub fn from_code(code: u8) -> Self {
        Self::ALL.get(code as usize).copied().unwrap_or(AgentState::Idle)
    }

    /// Whether the agent is doing colony work that a rest can wait for.
    pub fn is_excavating(self) -> bool {
        matches!(self, AgentState::Dig | AgentState::Haul)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentState::Idle => "IDLE",
            AgentState::Enter => "ENTER",
            AgentState::Dig => "DIG",
            AgentState::Haul => "HAUL",
            AgentState::Forage => "FORAGE",
            AgentState::Carry => "CARRY",
            AgentState::Explore => "EXPLORE",
            AgentState::Rest => "REST",
            AgentState::Nurse => "NURSE",
            AgentState::Hungry => "HUNGRY",
        };
        f.write_str(s)
    }
}

/// Coarse job category, derived from state for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Queen,
    Idle,
    Digger,
    Forager,
    Explorer,
    Nurse,
    Resting,
    Hungry,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Queen => "queen",
            Role::Idle => "idle",
            Role::Digger => "digger",
            Role::Forager => "forager",
            Role::Explorer => "explorer",
            Role::Nurse => "nurse",
            Role::Resting => "resting",
            Role::Hungry => "hungry",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        Some(match s {
            "queen" => Role::Queen,
            "idle" => Role::Idle,
            "digger" => Role::Digger,
            "forager" => Role::Forager,
            "explorer" => Role::Explorer,
            "nurse" => Role::Nurse,
            "resting" => Role::Resting,
            "hungry" => Role::Hungry,
            _ => return None,
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-agent response thresholds, drawn once at birth.
///
/// Higher drive means the agent answers that kind of stimulus sooner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Traits {
    pub dig_drive: f64,
    pub forage_drive: f64,
    pub explore_drive: f64,
    /// Frames an idle agent waits before heading underground on its own.
    pub patience: u32,
}

impl Default for Traits {
    fn default() -> Self {
        Self { dig_drive: 0.5, forage_drive: 0.5, explore_drive: 0.5, patience: 500 }
    }
}

impl Traits {
    /// Draw traits centered on 0.5 (mean of two uniforms).
    pub fn random(ctx: &mut SimulationContext) -> Self {
        let drive = |ctx: &mut SimulationContext| -> f64 {
            let a = ctx.uniform(0.0, 1.0);
            let b = ctx.uniform(0.0, 1.0);
            ((a + b) / 2.0).clamp(0.05, 0.95)
        };
        Self {
            dig_drive: drive(ctx),
            forage_drive: drive(ctx),
            explore_drive: drive(ctx),
            patience: ctx.between(300, 700),
        }
    }
}

const NAMES: &[&str] = &[
    "Ada", "Bix", "Cora", "Dru", "Ember", "Fenn", "Gale", "Hazel", "Iva", "Juno", "Kit", "Lark",
    "Moss", "Nell", "Opal", "Pip", "Quill", "Rue", "Sorrel", "Tansy", "Umber", "Vetch", "Wren",
    "Yarrow", "Zinnia",
];

/// One ant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub is_queen: bool,
    pub position: Position,
    pub vx: f64,
    pub vy: f64,
    /// Preferred travel and dig direction, radians.
    pub heading: f64,
    pub state: AgentState,
    /// State to return to after a rest.
    pub resume_state: Option<AgentState>,

    // Physiology
    pub energy: f64,
    /// 0.0 for a fresh callow worker, 1.0 for a veteran.
    pub maturity: f64,
    pub traits: Traits,

    // Cargo
    pub carrying_sand: u32,
    pub carrying_food: u32,

    // Navigation and timers
    pub target: Option<Position>,
    /// Remaining waypoints toward `target`, next step last.
    #[serde(skip)]
    pub path: Vec<(i32, i32)>,
    pub state_ticks: u32,
    pub ticks_since_rest: u32,
    /// Frames of activity allowed before a rest is due.
    pub rest_window: u32,
    /// Length of the current or next rest.
    pub rest_duration: u32,
    pub dig_cooldown: u32,
    pub stuck: u32,

    // Tandem running
    pub tandem_leader: Option<AgentId>,
    pub tandem_follower: Option<AgentId>,

    /// Display-only tint.
    pub hue: u16,
    pub alive: bool,
}

impl Agent {
    /// A new worker with randomized traits.
    pub fn worker(ctx: &mut SimulationContext, position: Position, maturity: f64, energy: f64) -> Self {
        let id = ctx.agent_id();
        let name = format!("{}-{}", NAMES[ctx.between(0, NAMES.len() as u32 - 1) as usize], id.0);
        let traits = Traits::random(ctx);
        Self {
            id,
            name,
            is_queen: false,
            position,
            vx: 0.0,
            vy: 0.0,
            heading: ctx.angle(),
            state: AgentState::Idle,
            resume_state: None,
            energy,
            maturity: maturity.clamp(0.0, 1.0),
            traits,
            carrying_sand: 0,
            carrying_food: 0,
            target: None,
            path: Vec::new(),
            state_ticks: 0,
            ticks_since_rest: 0,
            rest_window: ctx.between(6000, 9000),
            rest_duration: ctx.between(400, 900),
            dig_cooldown: 0,
            stuck: 0,
            tandem_leader: None,
            tandem_follower: None,
            hue: ctx.between(20, 40) as u16,
            alive: true,
        }
    }

    /// The colony's queen.
    pub fn queen(ctx: &mut SimulationContext, position: Position, energy: f64) -> Self {
        let mut queen = Self::worker(ctx, position, 1.0, energy);
        queen.name = format!("Queen-{}", queen.id.0);
        queen.is_queen = true;
        queen.hue = 0;
        queen
    }

    /// Switch state, resetting the per-state timer and target.
    pub fn set_state(&mut self, state: AgentState) {
        if self.state != state {
            self.state = state;
            self.state_ticks = 0;
            self.target = None;
            self.path.clear();
        }
    }

    pub fn stop(&mut self) {
        self.vx = 0.0;
        self.vy = 0.0;
    }
}

// --- Derived queries -------------------------------------------------------

/// Grid cell the agent occupies.
pub fn grid_cell(agent: &Agent) -> (i32, i32) {
    agent.position.cell()
}

/// Whether the agent is below the surface row.
pub fn is_underground(agent: &Agent, layout: &NestLayout) -> bool {
    layout.is_underground(grid_cell(agent).1)
}

/// Whether the agent is standing on solid ground above the surface.
pub fn is_on_surface(agent: &Agent, grid: &TerrainGrid) -> bool {
    let (c, r) = grid_cell(agent);
    r < grid.surface_row() && grid.is_solid(c, r + 1)
}

/// Whether there is solid ground within reach for the ant to cling to.
pub fn is_supported(agent: &Agent, grid: &TerrainGrid) -> bool {
    let (c, r) = grid_cell(agent);
    grid.has_foothold(c, r)
}

/// Energy as a fraction of the cap.
pub fn energy_fraction(agent: &Agent, params: &Params) -> f64 {
    if params.max_energy <= 0.0 {
        return 0.0;
    }
    (agent.energy / params.max_energy).clamp(0.0, 1.0)
}

pub fn is_hungry(agent: &Agent, params: &Params) -> bool {
    energy_fraction(agent, params) < HUNGER_THRESHOLD
}

/// Rest is due after a long stretch of activity or when energy runs low.
pub fn needs_rest(agent: &Agent, params: &Params) -> bool {
    agent.ticks_since_rest >= agent.rest_window || energy_fraction(agent, params) < params.rest_threshold
}

/// Job category implied by the agent's state.
pub fn role_of(agent: &Agent) -> Role {
    if agent.is_queen {
        return Role::Queen;
    }
    match agent.state {
        AgentState::Idle => Role::Idle,
        AgentState::Enter | AgentState::Dig | AgentState::Haul => Role::Digger,
        AgentState::Forage | AgentState::Carry => Role::Forager,
        AgentState::Explore => Role::Explorer,
        AgentState::Nurse => Role::Nurse,
        AgentState::Rest => Role::Resting,
        AgentState::Hungry => Role::Hungry,
    }
}

/// Top speed in cells per frame. Young, tired or loaded ants are slower.
pub fn max_speed(agent: &Agent, params: &Params) -> f64 {
    let base = if agent.is_queen { 0.12 } else { 0.3 };
    let vigor = 0.6 + 0.4 * energy_fraction(agent, params);
    let age = 0.8 + 0.2 * agent.maturity;
    let load = if agent.carrying_sand > 0 || agent.carrying_food > 0 { 0.8 } else { 1.0 };
    base * vigor * age * load
}

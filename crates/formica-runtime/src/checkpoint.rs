//! Checkpoint codec.
//!
//! A checkpoint is one JSON document holding everything needed to bring a
//! colony back: the terrain as a base64 blob of `cols * rows` hardness bytes,
//! each pheromone channel as a sparse `{length, entries}` list, agents as flat
//! records that refer to each other by id, and the brood, chambers, food,
//! parameters, goals and counters as they are.
//!
//! Decoding is forgiving. Every field has a default, so documents written by
//! older versions still load. A record that does not fit its type is dropped
//! on its own and the rest of the colony comes back. A document whose terrain
//! cannot be decoded is treated as no checkpoint at all and [`deserialize`]
//! founds a fresh colony.

use crate::chambers::ChamberDetector;
use crate::colony::{Colony, ColonyConfig, ColonyCounters};
use formica_agents::behavior::BehaviorEngine;
use formica_core::agent::{role_of, Agent, AgentState, Traits};
use formica_core::brood::Brood;
use formica_core::chamber::Chamber;
use formica_core::context::SimulationContext;
use formica_core::error::{FormicaError, Result};
use formica_core::food::FoodSource;
use formica_core::goals::ColonyGoals;
use formica_core::lenient::{or_default, skip_invalid};
use formica_core::params::Params;
use formica_core::pheromone::{Channel, PheromoneField, SparseLayer};
use formica_core::terrain::TerrainGrid;
use formica_core::types::{AgentId, Frame, NestLayout, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

/// Format version written into new checkpoints.
pub const CHECKPOINT_VERSION: u32 = 1;

/// The three pheromone channels in sparse form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PheromoneRecord {
    pub trail: SparseLayer,
    pub food: SparseLayer,
    pub dig: SparseLayer,
}

/// One agent as a flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentRecord {
    pub id: u64,
    pub name: String,
    pub is_queen: bool,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub heading: f64,
    /// Integer state code, see [`AgentState::code`].
    pub state: u8,
    pub resume_state: Option<u8>,
    /// Role at save time. Informational; recomputed from state on load.
    pub role: String,
    pub energy: f64,
    pub maturity: f64,
    pub traits: Traits,
    pub carrying_sand: u32,
    pub carrying_food: u32,
    pub target: Option<Position>,
    pub state_ticks: u32,
    pub ticks_since_rest: u32,
    pub rest_window: u32,
    pub rest_duration: u32,
    pub dig_cooldown: u32,
    pub stuck: u32,
    pub tandem_leader: Option<u64>,
    pub tandem_follower: Option<u64>,
    pub hue: u16,
}

impl Default for AgentRecord {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            is_queen: false,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            heading: 0.0,
            state: AgentState::Idle.code(),
            resume_state: None,
            role: String::new(),
            energy: 80.0,
            maturity: 0.5,
            traits: Traits::default(),
            carrying_sand: 0,
            carrying_food: 0,
            target: None,
            state_ticks: 0,
            ticks_since_rest: 0,
            rest_window: 7500,
            rest_duration: 600,
            dig_cooldown: 0,
            stuck: 0,
            tandem_leader: None,
            tandem_follower: None,
            hue: 30,
        }
    }
}

impl From<&Agent> for AgentRecord {
    fn from(a: &Agent) -> Self {
        Self {
            id: a.id.0,
            name: a.name.clone(),
            is_queen: a.is_queen,
            x: a.position.x,
            y: a.position.y,
            vx: a.vx,
            vy: a.vy,
            heading: a.heading,
            state: a.state.code(),
            resume_state: a.resume_state.map(AgentState::code),
            role: role_of(a).as_str().to_string(),
            energy: a.energy,
            maturity: a.maturity,
            traits: a.traits,
            carrying_sand: a.carrying_sand,
            carrying_food: a.carrying_food,
            target: a.target,
            state_ticks: a.state_ticks,
            ticks_since_rest: a.ticks_since_rest,
            rest_window: a.rest_window,
            rest_duration: a.rest_duration,
            dig_cooldown: a.dig_cooldown,
            stuck: a.stuck,
            tandem_leader: a.tandem_leader.map(|id| id.0),
            tandem_follower: a.tandem_follower.map(|id| id.0),
            hue: a.hue,
        }
    }
}

impl AgentRecord {
    /// Rebuild the agent. Records without an id get a fresh one.
    fn into_agent(self, ctx: &mut SimulationContext) -> Agent {
        let id = if self.id == 0 { ctx.agent_id() } else { AgentId(self.id) };
        let name = if self.name.is_empty() { format!("Ant-{}", id.0) } else { self.name };
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Agent {
            id,
            name,
            is_queen: self.is_queen,
            position: Position::new(finite(self.x, 0.0), finite(self.y, 0.0)),
            vx: finite(self.vx, 0.0),
            vy: finite(self.vy, 0.0),
            heading: finite(self.heading, 0.0),
            state: AgentState::from_code(self.state),
            resume_state: self.resume_state.map(AgentState::from_code),
            energy: finite(self.energy, 0.0),
            maturity: finite(self.maturity, 0.0).clamp(0.0, 1.0),
            traits: self.traits,
            carrying_sand: self.carrying_sand,
            carrying_food: self.carrying_food,
            target: self.target,
            path: Vec::new(),
            state_ticks: self.state_ticks,
            ticks_since_rest: self.ticks_since_rest,
            rest_window: self.rest_window,
            rest_duration: self.rest_duration,
            dig_cooldown: self.dig_cooldown,
            stuck: self.stuck,
            tandem_leader: self.tandem_leader.map(AgentId),
            tandem_follower: self.tandem_follower.map(AgentId),
            hue: self.hue,
            alive: true,
        }
    }
}

/// Serialized colony state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checkpoint {
    pub version: u32,
    pub session_id: String,
    pub cols: usize,
    pub rows: usize,
    pub surface_row: Option<i32>,
    pub entrance_col: Option<i32>,
    /// Base64 terrain blob, one hardness byte per cell, row-major.
    pub terrain: String,
    pub total_dug: u64,
    #[serde(deserialize_with = "or_default")]
    pub pheromones: PheromoneRecord,
    #[serde(deserialize_with = "skip_invalid")]
    pub agents: Vec<AgentRecord>,
    #[serde(deserialize_with = "skip_invalid")]
    pub brood: Vec<Brood>,
    #[serde(deserialize_with = "skip_invalid")]
    pub chambers: Vec<Chamber>,
    #[serde(deserialize_with = "skip_invalid")]
    pub food: Vec<FoodSource>,
    #[serde(deserialize_with = "or_default")]
    pub params: Params,
    #[serde(deserialize_with = "or_default")]
    pub goals: ColonyGoals,
    #[serde(deserialize_with = "or_default")]
    pub counters: ColonyCounters,
    #[serde(deserialize_with = "or_default")]
    pub config: ColonyConfig,
    pub frame: Frame,
    pub sim_day: u64,
    pub next_id: u64,
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            session_id: String::new(),
            cols: 0,
            rows: 0,
            surface_row: None,
            entrance_col: None,
            terrain: String::new(),
            total_dug: 0,
            pheromones: PheromoneRecord::default(),
            agents: Vec::new(),
            brood: Vec::new(),
            chambers: Vec::new(),
            food: Vec::new(),
            params: Params::default(),
            goals: ColonyGoals::default(),
            counters: ColonyCounters::default(),
            config: ColonyConfig::default(),
            frame: 0,
            sim_day: 1,
            next_id: 1,
        }
    }
}

impl Checkpoint {
    /// Capture the full state of a colony.
    pub fn capture(colony: &Colony) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            session_id: colony.session_id.clone(),
            cols: colony.terrain.cols(),
            rows: colony.terrain.rows(),
            surface_row: Some(colony.layout.surface_row),
            entrance_col: Some(colony.layout.entrance_col),
            terrain: colony.terrain.to_base64(),
            total_dug: colony.terrain.total_dug(),
            pheromones: PheromoneRecord {
                trail: colony.pheromones.to_sparse(Channel::Trail),
                food: colony.pheromones.to_sparse(Channel::Food),
                dig: colony.pheromones.to_sparse(Channel::Dig),
            },
            agents: colony.agents.iter().map(AgentRecord::from).collect(),
            brood: colony.brood.clone(),
            chambers: colony.chambers.clone(),
            food: colony.food.clone(),
            params: colony.params.clone(),
            goals: colony.goals.clone(),
            counters: colony.counters.clone(),
            config: colony.config.clone(),
            frame: colony.frame,
            sim_day: colony.sim_day,
            next_id: colony.ctx.next_id(),
        }
    }

    /// Rebuild a colony. Fails only when the terrain cannot be recovered.
    pub fn restore(self) -> Result<Colony> {
        let mut config = self.config;
        if self.cols > 0 {
            config.cols = self.cols;
        }
        if self.rows > 0 {
            config.rows = self.rows;
        }
        let surface_row = self.surface_row.unwrap_or(config.surface_row);
        config.surface_row = surface_row;
        config.validate()?;

        let terrain = TerrainGrid::from_base64(config.cols, config.rows, surface_row, &self.terrain, self.total_dug)?;
        let entrance_col = self
            .entrance_col
            .filter(|&c| c > 0 && (c as usize) < config.cols - 1)
            .unwrap_or(config.cols as i32 / 2);
        let layout = NestLayout { surface_row, entrance_col };

        let mut pheromones = PheromoneField::new(config.cols, config.rows);
        pheromones.load_sparse(Channel::Trail, &self.pheromones.trail);
        pheromones.load_sparse(Channel::Food, &self.pheromones.food);
        pheromones.load_sparse(Channel::Dig, &self.pheromones.dig);

        let mut ctx = SimulationContext::new();
        ctx.restore_next_id(self.next_id);
        let highest = self
            .agents
            .iter()
            .map(|a| a.id)
            .chain(self.brood.iter().map(|b| b.id.0))
            .chain(self.food.iter().map(|f| f.id.0))
            .max()
            .unwrap_or(0);
        ctx.reserve_ids_through(highest);

        let mut agents: Vec<Agent> = self.agents.into_iter().map(|r| r.into_agent(&mut ctx)).collect();
        resolve_links(&mut agents);
        let has_queen = agents.iter().any(|a| a.is_queen);

        let mut brood = self.brood;
        for b in brood.iter_mut().filter(|b| b.id.0 == 0) {
            b.id = ctx.brood_id();
        }
        let mut food = self.food;
        for f in food.iter_mut().filter(|f| f.id.0 == 0) {
            f.id = ctx.food_id();
        }
        let mut chambers = self.chambers;
        for ch in chambers.iter_mut() {
            ch.repair();
        }

        let session_id = if self.session_id.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            self.session_id
        };

        let colony = Colony {
            config,
            ctx,
            engine: BehaviorEngine::new(),
            detector: ChamberDetector::default(),
            session_id,
            layout,
            terrain,
            pheromones,
            agents,
            brood,
            chambers,
            food,
            params: self.params.sanitized(),
            goals: self.goals,
            counters: self.counters,
            frame: self.frame,
            sim_day: self.sim_day.max(1),
            has_queen,
        };
        info!(
            session = %colony.session_id,
            frame = colony.frame,
            day = colony.sim_day,
            agents = colony.agents.len(),
            "Colony restored from checkpoint"
        );
        Ok(colony)
    }
}

/// Drop tandem links that point at agents no longer in the list.
fn resolve_links(agents: &mut [Agent]) {
    let live: HashSet<AgentId> = agents.iter().map(|a| a.id).collect();
    for agent in agents.iter_mut() {
        agent.tandem_leader = agent.tandem_leader.filter(|id| live.contains(id) && *id != agent.id);
        agent.tandem_follower = agent.tandem_follower.filter(|id| live.contains(id) && *id != agent.id);
    }
}

/// Encode a colony as a checkpoint document.
pub fn serialize(colony: &Colony) -> Result<String> {
    Ok(serde_json::to_string(&Checkpoint::capture(colony))?)
}

/// Decode a checkpoint document, reporting why it was rejected.
pub fn try_deserialize(json: &str) -> Result<Colony> {
    let checkpoint: Checkpoint = serde_json::from_str(json)?;
    if checkpoint.terrain.is_empty() {
        return Err(FormicaError::malformed_checkpoint("no terrain"));
    }
    checkpoint.restore()
}

/// Decode a checkpoint document. An unusable document yields a fresh colony.
pub fn deserialize(json: &str) -> Colony {
    match try_deserialize(json) {
        Ok(colony) => colony,
        Err(e) => {
            warn!(error = %e, "Checkpoint rejected, founding a fresh colony");
            Colony::new()
        }
    }
}

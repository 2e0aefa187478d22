//! Colony: the tick orchestrator.
//!
//! The colony owns every piece of simulation state and is the only thing
//! that mutates it. One call to [`Colony::tick`] advances the world by one
//! frame, in a fixed order:
//!
//! 1. Advance the frame counter
//! 2. Recompute colony goals (periodic)
//! 3. Carry out pending directive role shifts (periodic)
//! 4. Decay pheromones (periodic)
//! 5. Let loose sand fall (periodic)
//! 6. Update every agent, fold their events, remove the dead
//! 7. Age brood, emerge new workers, let the queen lay
//! 8. Roll the day counter over
//! 9. Detect and type chambers (periodic)
//! 10. Prune exhausted food and respawn forage (periodic)

use crate::chambers::ChamberDetector;
use crate::generation;
use crate::goals;
use crate::lifecycle;
use formica_agents::behavior::BehaviorEngine;
use formica_core::agent::{role_of, Agent, AgentState};
use formica_core::brood::Brood;
use formica_core::chamber::Chamber;
use formica_core::context::SimulationContext;
use formica_core::error::{FormicaError, Result};
use formica_core::food::FoodSource;
use formica_core::goals::{ColonyGoals, Directive, Phase};
use formica_core::params::{Params, TuningPatch};
use formica_core::pheromone::PheromoneField;
use formica_core::terrain::TerrainGrid;
use formica_core::types::{AgentId, BroodId, Frame, NestLayout};
use formica_core::world::{AgentEvent, AgentSighting, DeathCause, Workforce, WorldView};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Event emitted by the colony during a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColonyEvent {
    /// Something an agent did.
    Agent(AgentEvent),
    /// The queen laid an egg.
    EggLaid { brood: BroodId },
    /// An egg hatched into a larva.
    Hatched { brood: BroodId },
    /// A fed larva became a pupa.
    Pupated { brood: BroodId },
    /// An unfed larva died.
    BroodStarved { brood: BroodId },
    /// A pupa eclosed as a new worker.
    Emerged { agent: AgentId },
    /// The goal pass moved the nest into a new construction phase.
    PhaseChanged { from: Phase, to: Phase },
    /// An active directive ran out.
    DirectiveExpired,
    /// A new simulated day began.
    DayStarted { day: u64 },
}

/// Configuration for world size and pass cadences.
///
/// Everything here is fixed for the lifetime of a colony and travels with
/// its checkpoint. Behaviour knobs that may change at runtime live in
/// [`Params`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Grid width in cells (default: 120).
    pub cols: usize,
    /// Grid height in cells (default: 80).
    pub rows: usize,
    /// First solid row (default: 12).
    pub surface_row: i32,
    /// Workers placed on the surface at founding (default: 8).
    pub initial_workers: usize,
    /// Forage sources scattered at founding (default: 4).
    pub initial_food_sources: usize,
    /// Food units stored beside the queen at founding (default: 12).
    pub initial_stored_food: u32,
    /// Agents plus brood never exceed this (default: 60).
    pub population_cap: usize,
    /// Live forage sources kept on the surface at most (default: 6).
    pub max_forage_sources: usize,
    /// Frames between goal recomputations (default: 120).
    pub goals_interval: u64,
    /// Frames between directive role-shift passes (default: 60).
    pub directive_interval: u64,
    /// Frames between pheromone decay passes (default: 8).
    pub decay_interval: u64,
    /// Frames between sand gravity passes (default: 6).
    pub gravity_interval: u64,
    /// Frames between chamber detection passes (default: 300).
    pub chamber_interval: u64,
    /// Frames between forage respawns (default: 900).
    pub food_respawn_interval: u64,
    /// Frames in one simulated day (default: 18000).
    pub frames_per_day: u64,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            cols: 120,
            rows: 80,
            surface_row: 12,
            initial_workers: 8,
            initial_food_sources: 4,
            initial_stored_food: 12,
            population_cap: 60,
            max_forage_sources: 6,
            goals_interval: 120,
            directive_interval: 60,
            decay_interval: 8,
            gravity_interval: 6,
            chamber_interval: 300,
            food_respawn_interval: 900,
            frames_per_day: 18_000,
        }
    }
}

impl ColonyConfig {
    /// Reject worlds the nest generator cannot lay out.
    pub fn validate(&self) -> Result<()> {
        if self.cols < 40 {
            return Err(FormicaError::invalid_config("cols", "must be at least 40"));
        }
        if self.surface_row < 4 {
            return Err(FormicaError::invalid_config("surface_row", "must be at least 4"));
        }
        if self.rows < self.surface_row as usize + 20 {
            return Err(FormicaError::invalid_config(
                "rows",
                "must leave at least 20 rows below the surface",
            ));
        }
        let cadences = [
            ("goals_interval", self.goals_interval),
            ("directive_interval", self.directive_interval),
            ("decay_interval", self.decay_interval),
            ("gravity_interval", self.gravity_interval),
            ("chamber_interval", self.chamber_interval),
            ("food_respawn_interval", self.food_respawn_interval),
            ("frames_per_day", self.frames_per_day),
        ];
        for (field, value) in cadences {
            if value == 0 {
                return Err(FormicaError::invalid_config(field, "must be greater than zero"));
            }
        }
        Ok(())
    }
}

/// Running totals folded from agent and lifecycle events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyCounters {
    pub eggs_laid: u64,
    pub workers_born: u64,
    pub starvation_deaths: u64,
    pub queen_deaths: u64,
    pub brood_starved: u64,
    pub food_collected: u64,
    pub food_stored: u64,
    pub meals: u64,
    pub larvae_fed: u64,
    pub sand_deposited: u64,
    pub recruitments: u64,
    pub unstuck: u64,
}

/// Statistics about the colony.
#[derive(Debug, Clone, Serialize)]
pub struct ColonyStats {
    pub frame: Frame,
    pub sim_day: u64,
    pub agents_alive: usize,
    pub brood: usize,
    pub chambers: usize,
    pub total_dug: u64,
    pub has_queen: bool,
    pub phase: Phase,
    pub counters: ColonyCounters,
}

/// The colony: owns the world and advances it.
pub struct Colony {
    pub(crate) config: ColonyConfig,
    pub(crate) ctx: SimulationContext,
    pub(crate) engine: BehaviorEngine,
    pub(crate) detector: ChamberDetector,
    pub(crate) session_id: String,
    pub(crate) layout: NestLayout,
    pub(crate) terrain: TerrainGrid,
    pub(crate) pheromones: PheromoneField,
    pub(crate) agents: Vec<Agent>,
    pub(crate) brood: Vec<Brood>,
    pub(crate) chambers: Vec<Chamber>,
    pub(crate) food: Vec<FoodSource>,
    pub(crate) params: Params,
    pub(crate) goals: ColonyGoals,
    pub(crate) counters: ColonyCounters,
    pub(crate) frame: Frame,
    pub(crate) sim_day: u64,
    pub(crate) has_queen: bool,
}

impl Colony {
    /// Found a fresh colony with default configuration.
    pub fn new() -> Self {
        Self::found(ColonyConfig::default(), SimulationContext::new())
    }

    /// Found a default colony from a fixed seed. The same seed founds the
    /// same nest.
    pub fn seeded(seed: u64) -> Self {
        Self::found(ColonyConfig::default(), SimulationContext::seeded(seed))
    }

    /// Found a fresh colony with the given configuration.
    pub fn from_config(config: ColonyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::found(config, SimulationContext::new()))
    }

    /// Found a fresh colony drawing randomness from `ctx`.
    pub fn with_context(config: ColonyConfig, ctx: SimulationContext) -> Result<Self> {
        config.validate()?;
        Ok(Self::found(config, ctx))
    }

    fn found(config: ColonyConfig, mut ctx: SimulationContext) -> Self {
        let nest = generation::generate(&config, &mut ctx);
        let pheromones = PheromoneField::new(config.cols, config.rows);
        let mut colony = Self {
            engine: BehaviorEngine::new(),
            detector: ChamberDetector::default(),
            session_id: uuid::Uuid::new_v4().to_string(),
            layout: nest.layout,
            terrain: nest.terrain,
            pheromones,
            agents: nest.agents,
            brood: Vec::new(),
            chambers: Vec::new(),
            food: nest.food,
            params: Params::default(),
            goals: ColonyGoals::default(),
            counters: ColonyCounters::default(),
            frame: 0,
            sim_day: 1,
            has_queen: true,
            config,
            ctx,
        };
        colony.chambers = colony.detect_chambers();
        goals::recompute(&mut colony);
        info!(
            session = %colony.session_id,
            cols = colony.config.cols,
            rows = colony.config.rows,
            agents = colony.agents.len(),
            "Founded new colony"
        );
        colony
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self) -> Vec<ColonyEvent> {
        let mut events = Vec::new();
        self.frame += 1;
        let frame = self.frame;

        if frame % self.config.goals_interval == 0 {
            goals::expire_directive(self, &mut events);
            let before = self.goals.phase;
            goals::recompute(self);
            if self.goals.phase != before {
                info!(frame, from = before.as_str(), to = self.goals.phase.as_str(), "Nest entered a new phase");
                events.push(ColonyEvent::PhaseChanged { from: before, to: self.goals.phase });
            }
        }
        if frame % self.config.directive_interval == 0 {
            goals::apply_pending_shifts(self);
        }
        if frame % self.config.decay_interval == 0 {
            self.pheromones.decay();
        }
        if frame % self.config.gravity_interval == 0 {
            self.terrain.apply_gravity(self.ctx.rng());
        }

        self.update_agents(&mut events);
        lifecycle::advance(self, &mut events);

        if frame % self.config.frames_per_day == 0 {
            self.sim_day += 1;
            info!(day = self.sim_day, agents = self.agents.len(), dug = self.terrain.total_dug(), "New day");
            events.push(ColonyEvent::DayStarted { day: self.sim_day });
        }
        if frame % self.config.chamber_interval == 0 {
            self.chambers = self.detect_chambers();
            debug!(frame, chambers = self.chambers.len(), "Chamber pass");
        }

        self.food.retain(|f| !f.is_depleted());
        if frame % self.config.food_respawn_interval == 0 {
            generation::respawn_forage(self);
        }
        events
    }

    /// Run the simulation for `ticks` frames, discarding events.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn update_agents(&mut self, out: &mut Vec<ColonyEvent>) {
        let census: Vec<AgentSighting> = self
            .agents
            .iter()
            .map(|a| AgentSighting { id: a.id, position: a.position, state: a.state, is_queen: a.is_queen })
            .collect();
        let workforce = workforce_of(&self.agents);

        let mut agent_events = Vec::new();
        {
            let mut world = WorldView {
                terrain: &mut self.terrain,
                pheromones: &mut self.pheromones,
                food: &mut self.food,
                brood: &mut self.brood,
                chambers: &self.chambers,
                goals: &self.goals,
                params: &self.params,
                layout: self.layout,
                census: &census,
                workforce: &workforce,
                frame: self.frame,
            };
            for agent in self.agents.iter_mut() {
                agent_events.extend(self.engine.update(agent, &mut world, &mut self.ctx));
            }
        }

        for event in agent_events {
            self.fold_event(&event);
            out.push(ColonyEvent::Agent(event));
        }

        self.agents.retain(|a| a.alive);
        if self.has_queen && !self.agents.iter().any(|a| a.is_queen) {
            self.has_queen = false;
            self.counters.queen_deaths += 1;
            info!(frame = self.frame, "The queen is dead");
        }
    }

    fn fold_event(&mut self, event: &AgentEvent) {
        let c = &mut self.counters;
        match *event {
            AgentEvent::Dug { .. } => {}
            AgentEvent::SandDeposited { .. } => c.sand_deposited += 1,
            AgentEvent::FoodCollected { amount, .. } => c.food_collected += amount as u64,
            AgentEvent::FoodStored { amount, .. } => c.food_stored += amount as u64,
            AgentEvent::LarvaFed { .. } => c.larvae_fed += 1,
            AgentEvent::Ate { .. } => c.meals += 1,
            AgentEvent::Unstuck { .. } => c.unstuck += 1,
            AgentEvent::Died { agent, cause: DeathCause::Starvation } => {
                c.starvation_deaths += 1;
                debug!(%agent, frame = self.frame, "Agent starved");
            }
            AgentEvent::Recruited { leader, follower } => {
                if self.link_tandem(leader, follower) {
                    self.counters.recruitments += 1;
                }
            }
        }
    }

    /// Pair a returning forager with an idle nestmate.
    fn link_tandem(&mut self, leader: AgentId, follower: AgentId) -> bool {
        let follower_ready = self
            .agents
            .iter()
            .any(|a| a.id == follower && a.alive && a.state == AgentState::Idle && a.tandem_leader.is_none());
        let leader_ready = self.agents.iter().any(|a| a.id == leader && a.alive);
        if !follower_ready || !leader_ready {
            return false;
        }
        for agent in self.agents.iter_mut() {
            if agent.id == follower {
                agent.set_state(AgentState::Forage);
                agent.tandem_leader = Some(leader);
            } else if agent.id == leader {
                agent.tandem_follower = Some(follower);
            }
        }
        true
    }

    pub(crate) fn detect_chambers(&self) -> Vec<Chamber> {
        let queen = self.agents.iter().find(|a| a.is_queen).map(|a| a.position);
        let mut found = self.detector.detect(&self.terrain);
        self.detector
            .assign_types(&mut found, &self.chambers, queen, &self.brood, &self.food);
        found
    }

    /// Merge an external directive into the colony goals.
    pub fn apply_directive(&mut self, directive: Directive) {
        goals::apply_directive(self, directive);
    }

    /// Merge a tuning patch without setting a directive.
    pub fn tune(&mut self, patch: &TuningPatch) {
        self.params.apply(patch);
    }

    /// Current statistics.
    pub fn stats(&self) -> ColonyStats {
        ColonyStats {
            frame: self.frame,
            sim_day: self.sim_day,
            agents_alive: self.agents.len(),
            brood: self.brood.len(),
            chambers: self.chambers.len(),
            total_dug: self.terrain.total_dug(),
            has_queen: self.has_queen,
            phase: self.goals.phase,
            counters: self.counters.clone(),
        }
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn layout(&self) -> NestLayout {
        self.layout
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn pheromones(&self) -> &PheromoneField {
        &self.pheromones
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable access to the agent list, for tests and tooling.
    pub fn agents_mut(&mut self) -> &mut Vec<Agent> {
        &mut self.agents
    }

    pub fn brood(&self) -> &[Brood] {
        &self.brood
    }

    pub fn brood_mut(&mut self) -> &mut Vec<Brood> {
        &mut self.brood
    }

    pub fn chambers(&self) -> &[Chamber] {
        &self.chambers
    }

    pub fn food(&self) -> &[FoodSource] {
        &self.food
    }

    pub fn food_mut(&mut self) -> &mut Vec<FoodSource> {
        &mut self.food
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn goals(&self) -> &ColonyGoals {
        &self.goals
    }

    pub fn counters(&self) -> &ColonyCounters {
        &self.counters
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn sim_day(&self) -> u64 {
        self.sim_day
    }

    pub fn has_queen(&self) -> bool {
        self.has_queen
    }

    pub fn total_dug(&self) -> u64 {
        self.terrain.total_dug()
    }
}

impl Default for Colony {
    fn default() -> Self {
        Self::new()
    }
}

/// Head count of workers per role.
pub fn workforce_of(agents: &[Agent]) -> Workforce {
    let mut workforce = Workforce::default();
    for agent in agents.iter().filter(|a| !a.is_queen && a.alive) {
        workforce.workers += 1;
        *workforce.by_role.entry(role_of(agent)).or_insert(0) += 1;
    }
    workforce
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_core::agent::Role;

    fn colony() -> Colony {
        Colony::with_context(ColonyConfig::default(), SimulationContext::seeded(42)).expect("colony")
    }

    #[test]
    fn fresh_colony_has_queen_and_workers() {
        let c = colony();
        assert_eq!(c.agents().iter().filter(|a| a.is_queen).count(), 1);
        assert_eq!(c.agents().iter().filter(|a| !a.is_queen).count(), 8);
        assert_eq!(c.total_dug(), 0);
        assert_eq!(c.frame(), 0);
        assert_eq!(c.sim_day(), 1);
        assert!(c.has_queen());
    }

    #[test]
    fn tick_advances_frame() {
        let mut c = colony();
        c.tick();
        c.tick();
        assert_eq!(c.frame(), 2);
    }

    #[test]
    fn config_validation() {
        let bad = ColonyConfig { cols: 10, ..Default::default() };
        assert!(bad.validate().is_err());
        let bad = ColonyConfig { decay_interval: 0, ..Default::default() };
        assert!(bad.validate().is_err());
        assert!(ColonyConfig::default().validate().is_ok());
    }

    #[test]
    fn starved_worker_is_removed_next_tick() {
        let mut c = colony();
        let victim = c.agents().iter().find(|a| !a.is_queen).map(|a| a.id).expect("worker");
        for a in c.agents_mut().iter_mut().filter(|a| a.id == victim) {
            a.energy = 0.0;
        }
        let events = c.tick();
        assert!(c.agents().iter().all(|a| a.id != victim));
        assert!(c.has_queen());
        assert_eq!(c.counters().starvation_deaths, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, ColonyEvent::Agent(AgentEvent::Died { agent, .. }) if *agent == victim)));
    }

    #[test]
    fn queen_death_clears_flag() {
        let mut c = colony();
        for a in c.agents_mut().iter_mut().filter(|a| a.is_queen) {
            a.energy = 0.0;
        }
        c.tick();
        assert!(!c.has_queen());
        assert!(c.agents().iter().all(|a| !a.is_queen));
        assert_eq!(c.counters().queen_deaths, 1);
    }

    #[test]
    fn recruit_links_both_agents() {
        let mut c = colony();
        let ids: Vec<AgentId> = c.agents().iter().filter(|a| !a.is_queen).map(|a| a.id).take(2).collect();
        let (leader, follower) = (ids[0], ids[1]);
        c.fold_event(&AgentEvent::Recruited { leader, follower });
        let f = c.agents().iter().find(|a| a.id == follower).expect("follower");
        assert_eq!(f.state, AgentState::Forage);
        assert_eq!(f.tandem_leader, Some(leader));
        let l = c.agents().iter().find(|a| a.id == leader).expect("leader");
        assert_eq!(l.tandem_follower, Some(follower));
        assert_eq!(c.counters().recruitments, 1);
    }

    #[test]
    fn workforce_excludes_queen() {
        let c = colony();
        let wf = workforce_of(c.agents());
        assert_eq!(wf.workers, 8);
        assert_eq!(wf.count(Role::Queen), 0);
    }
}

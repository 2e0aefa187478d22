//! Behavior engine: one frame of one agent.
//!
//! Every worker runs the same pipeline each frame:
//!
//! 1. **Metabolism**: timers tick, maturity grows, energy drains. An agent
//!    that runs out of energy dies here and does nothing else.
//! 2. **Sense**: pheromone gradients, nearby food and crowding.
//! 3. **Think**: overriding needs in priority order (hunger, then rest,
//!    then stuck escape) before the state's own transitions.
//! 4. **Act**: the state handler steers, digs, carries and feeds.
//! 5. **Physics**: gravity and collision against the terrain.
//!
//! Effects on anything other than the agent and the shared environment
//! are returned as [`AgentEvent`]s for the colony to apply.

use crate::act::act;
use crate::physics::apply_physics;
use crate::queen::update_queen;
use crate::recovery::escape_if_stuck;
use crate::sense::sense;
use formica_core::agent::{is_hungry, is_underground, needs_rest, Agent, AgentState, MATURITY_PER_FRAME};
use formica_core::context::SimulationContext;
use formica_core::food::stash_food;
use formica_core::world::{AgentEvent, DeathCause, WorldView};
use tracing::debug;

/// Energy spent per frame just by being alive.
pub const BASE_DRAIN: f64 = 0.004;
/// Additional drain per frame while digging or hauling.
pub const WORK_DRAIN: f64 = 0.004;

/// Drives agents through sense, think, act and physics.
#[derive(Debug, Clone, Copy, Default)]
pub struct BehaviorEngine;

impl BehaviorEngine {
    pub fn new() -> Self {
        Self
    }

    /// Advance one agent by one frame.
    pub fn update(
        &self,
        agent: &mut Agent,
        world: &mut WorldView<'_>,
        ctx: &mut SimulationContext,
    ) -> Vec<AgentEvent> {
        let mut events = Vec::new();
        if !agent.alive {
            return events;
        }
        if agent.is_queen {
            update_queen(agent, world, &mut events);
            return events;
        }

        metabolize(agent);
        if agent.energy <= 0.0 {
            agent.alive = false;
            agent.stop();
            debug!(agent = %agent.name, frame = world.frame, "Starved");
            events.push(AgentEvent::Died { agent: agent.id, cause: DeathCause::Starvation });
            return events;
        }

        let senses = sense(agent, world);
        self.think(agent, world, ctx, &mut events);
        act(agent, &senses, world, ctx, &mut events);
        apply_physics(agent, world.terrain);
        events
    }

    /// Overriding needs, checked before the state handler runs.
    fn think(
        &self,
        agent: &mut Agent,
        world: &mut WorldView<'_>,
        ctx: &mut SimulationContext,
        events: &mut Vec<AgentEvent>,
    ) {
        let params = world.params;
        let resting = matches!(agent.state, AgentState::Rest | AgentState::Hungry);

        if !resting && is_hungry(agent, params) {
            if agent.carrying_food > 0 {
                let amount = agent.carrying_food;
                stash_food(world.food, ctx, agent.position, amount, 1.0);
                agent.carrying_food = 0;
                let underground = is_underground(agent, &world.layout);
                events.push(AgentEvent::FoodStored { agent: agent.id, amount, underground });
            }
            agent.tandem_leader = None;
            agent.resume_state = None;
            agent.set_state(AgentState::Hungry);
            debug!(agent = %agent.name, energy = agent.energy, "Went looking for food");
        } else if !resting && needs_rest(agent, params) && !mid_excavation(agent) {
            agent.resume_state = Some(agent.state);
            agent.set_state(AgentState::Rest);
        }

        if escape_if_stuck(agent, world.terrain, &world.layout) {
            debug!(agent = %agent.name, cell = ?agent.position.cell(), "Lifted out of a dead end");
            events.push(AgentEvent::Unstuck { agent: agent.id });
            if agent.state == AgentState::Dig {
                agent.set_state(AgentState::Explore);
            }
        }
    }
}

/// Digging or hauling with spoil in hand: a rest waits until the load is dropped.
fn mid_excavation(agent: &Agent) -> bool {
    agent.state.is_excavating() && agent.carrying_sand > 0
}

/// Per-frame timers, ageing and energy drain.
fn metabolize(agent: &mut Agent) {
    agent.state_ticks = agent.state_ticks.saturating_add(1);
    if agent.state != AgentState::Rest {
        agent.ticks_since_rest = agent.ticks_since_rest.saturating_add(1);
    }
    agent.maturity = (agent.maturity + MATURITY_PER_FRAME).min(1.0);
    let work = if agent.state.is_excavating() { WORK_DRAIN } else { 0.0 };
    agent.energy -= BASE_DRAIN + work;
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_core::types::Position;

    #[test]
    fn metabolism_drains_and_ages() {
        let mut ctx = SimulationContext::seeded(9);
        let mut a = Agent::worker(&mut ctx, Position::of_cell(3, 3), 0.0, 50.0);
        metabolize(&mut a);
        assert!((a.energy - (50.0 - BASE_DRAIN)).abs() < 1e-12);
        assert!(a.maturity > 0.0);
        assert_eq!(a.ticks_since_rest, 1);

        a.set_state(AgentState::Dig);
        metabolize(&mut a);
        assert!((a.energy - (50.0 - 2.0 * BASE_DRAIN - WORK_DRAIN)).abs() < 1e-12);
    }

    #[test]
    fn rest_waits_for_dropped_load() {
        let mut ctx = SimulationContext::seeded(9);
        let mut a = Agent::worker(&mut ctx, Position::of_cell(3, 3), 0.0, 50.0);
        a.set_state(AgentState::Haul);
        a.carrying_sand = 2;
        assert!(mid_excavation(&a));
        a.carrying_sand = 0;
        assert!(!mid_excavation(&a));
    }
}

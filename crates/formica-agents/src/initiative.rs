//! Idle initiative: how an unoccupied worker picks up a job.
//!
//! There is no central dispatcher. Each frame an idle worker runs a short
//! series of independent Bernoulli trials, one per job, and takes the first
//! that succeeds. Trial odds depend on the worker's own drives and age
//! (young workers nurse, older ones dig, forage and scout), on whether the
//! colony already has enough workers in that role, and on the current
//! goals. An active directive adds its own trials, run first.

use formica_core::agent::{Agent, AgentState, Role};
use formica_core::context::SimulationContext;
use formica_core::food::stored_food;
use formica_core::world::WorldView;

/// Per-frame odds scale for directive trials.
const DIRECTIVE_RATE: f64 = 0.02;
const NURSE_RATE: f64 = 0.03;
const DIG_RATE: f64 = 0.02;
const FORAGE_RATE: f64 = 0.015;
const EXPLORE_RATE: f64 = 0.02;

/// Maturity below which a worker is considered callow and stays near brood.
const CALLOW: f64 = 0.1;

/// Run the initiative trials for one idle worker.
pub fn evaluate_initiative(agent: &Agent, world: &WorldView<'_>, ctx: &mut SimulationContext) -> Option<AgentState> {
    let goals = world.goals;
    let quotas = &goals.quotas;
    let workforce = world.workforce;
    let params = world.params;

    for (focus, weight) in goals.focus_weights() {
        if ctx.chance(DIRECTIVE_RATE * weight) {
            return Some(focus.entry_state());
        }
    }

    let larvae_waiting = world.brood.iter().filter(|b| b.needs_feeding()).count();
    if larvae_waiting > 0 && workforce.share(Role::Nurse) < quotas.nurse {
        let youth = 1.0 - agent.maturity;
        if ctx.chance(NURSE_RATE * params.nurse_priority * youth) {
            return Some(AgentState::Nurse);
        }
    }

    if workforce.share(Role::Digger) < quotas.digger {
        let age_gate = if agent.maturity < CALLOW { 0.3 } else { 1.0 };
        if ctx.chance(DIG_RATE * goals.dig_priority * agent.traits.dig_drive * age_gate) {
            return Some(AgentState::Enter);
        }
    }

    if workforce.share(Role::Forager) < quotas.forager {
        let pressure = if (stored_food(world.food) as usize) < workforce.workers { 2.0 } else { 1.0 };
        let p = FORAGE_RATE * agent.traits.forage_drive * (0.3 + agent.maturity) * pressure;
        if ctx.chance(p) {
            return Some(AgentState::Forage);
        }
    }

    if workforce.share(Role::Explorer) < quotas.explorer {
        let p = EXPLORE_RATE * params.exploration_bias * agent.traits.explore_drive * (0.3 + agent.maturity);
        if ctx.chance(p) {
            return Some(AgentState::Explore);
        }
    }

    None
}

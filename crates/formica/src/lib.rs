//! # Formica
//!
//! A persistent virtual ant colony. Workers dig a nest into soil one cell at
//! a time, coordinating only through pheromones they leave in the ground.
//! Shafts, galleries and chambers emerge from thousands of small decisions.
//!
//! The colony is a pure state transition plus a checkpoint codec. Callers
//! own the clock, the disk and any outside advice.
//!
//! ## Quick Start
//!
//! ```rust
//! use formica::prelude::*;
//!
//! // Found a colony: one queen, eight workers, a short starter shaft
//! let mut colony = formica::create_colony();
//!
//! // Advance it by a few hundred frames
//! formica::tick(&mut colony, 300);
//!
//! // Summarize it for a person or an advisor
//! let snapshot = formica::get_snapshot(&colony);
//! println!("{snapshot}");
//!
//! // Persist and restore
//! let json = formica::serialize(&colony).unwrap();
//! let restored = formica::deserialize(&json);
//! assert_eq!(restored.frame(), colony.frame());
//! ```
//!
//! ## Architecture
//!
//! - [`formica_core`] - Terrain, pheromones, agent records, brood, goals and errors
//! - [`formica_agents`] - The per-ant behavior engine
//! - [`formica_runtime`] - Colony orchestration, chambers, lifecycle and checkpoints
//!
//! ## Reproducible runs
//!
//! `create_colony` seeds from entropy. [`create_colony_seeded`] founds the
//! same nest for the same seed, and [`create_colony_in`] takes a custom
//! configuration with an explicit [`SimulationContext`].
//!
//! ## Directives
//!
//! Advice from outside the simulation arrives as a [`Directive`](formica_core::goals::Directive):
//! focus weights for idle workers, staggered role shifts, a dig priority
//! override and a tuning patch. It is merged between ticks and never
//! commands any single ant.
//!
//! ```rust
//! use formica::prelude::*;
//!
//! let mut colony = formica::create_colony();
//! let directive = formica::parse_directive(r#"{
//!     "focus": { "forage": 0.8 },
//!     "role_shifts": [{ "to": "forager", "count": 2 }],
//!     "note": "stock the larder"
//! }"#).unwrap();
//! formica::apply_directive(&mut colony, directive);
//! assert!(colony.goals().directive.is_some());
//! ```

pub use formica_agents as agents;
pub use formica_core as core;
pub use formica_runtime as runtime;

use formica_core::context::SimulationContext;
use formica_core::error::Result;
use formica_core::goals::Directive;
use formica_runtime::colony::{Colony, ColonyConfig, ColonyEvent};
use formica_runtime::snapshot::ColonySnapshot;
use tracing::debug;

/// Found a fresh colony with default configuration.
pub fn create_colony() -> Colony {
    Colony::new()
}

/// Found a fresh colony with a custom configuration.
pub fn create_colony_with(config: ColonyConfig) -> Result<Colony> {
    Colony::from_config(config)
}

/// Found a default colony from a fixed seed.
pub fn create_colony_seeded(seed: u64) -> Colony {
    Colony::seeded(seed)
}

/// Found a colony that draws ids and randomness from `ctx`.
pub fn create_colony_in(config: ColonyConfig, ctx: SimulationContext) -> Result<Colony> {
    Colony::with_context(config, ctx)
}

/// Advance the colony by `n` frames and return everything that happened.
pub fn tick(colony: &mut Colony, n: u64) -> Vec<ColonyEvent> {
    let mut events = Vec::new();
    for _ in 0..n {
        events.extend(colony.tick());
    }
    debug!(frames = n, frame = colony.frame(), events = events.len(), "Advanced colony");
    events
}

/// Compact summary: population, roles, excavation, brood, chambers, food.
pub fn get_snapshot(colony: &Colony) -> ColonySnapshot {
    ColonySnapshot::capture(colony)
}

/// Merge external advice into the colony's goals.
pub fn apply_directive(colony: &mut Colony, directive: Directive) {
    colony.apply_directive(directive);
}

/// Parse a directive document.
pub fn parse_directive(json: &str) -> Result<Directive> {
    Ok(serde_json::from_str(json)?)
}

/// Encode the colony as a checkpoint document.
pub fn serialize(colony: &Colony) -> Result<String> {
    formica_runtime::checkpoint::serialize(colony)
}

/// Decode a checkpoint. Unusable documents yield a fresh colony.
pub fn deserialize(json: &str) -> Colony {
    formica_runtime::checkpoint::deserialize(json)
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use formica::prelude::*;
/// ```
pub mod prelude {
    pub use formica_runtime::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_core::agent::{role_of, Role};

    #[test]
    fn tick_reports_events_and_frames() {
        let config = ColonyConfig { frames_per_day: 600, ..Default::default() };
        let mut colony = create_colony_with(config).expect("colony");
        let events = tick(&mut colony, 600);
        assert_eq!(colony.frame(), 600);
        assert_eq!(colony.sim_day(), 2);
        assert!(events.iter().any(|e| matches!(e, ColonyEvent::DayStarted { day: 2 })));
    }

    #[test]
    fn directive_document_round_trip() {
        let mut colony = create_colony();
        let directive = parse_directive(
            r#"{"dig_priority": 0.3, "role_shifts": [{"to": "explorer", "count": 1}], "tuning": {"nurse_priority": 0.9}}"#,
        )
        .expect("directive");
        apply_directive(&mut colony, directive);
        assert!((colony.goals().dig_priority - 0.3).abs() < 1e-9);
        assert_eq!(colony.params().nurse_priority, 0.9);
        formica_runtime::goals::apply_pending_shifts(&mut colony);
        assert_eq!(colony.agents().iter().filter(|a| role_of(a) == Role::Explorer).count(), 1);
    }

    #[test]
    fn same_seed_founds_same_nest() {
        let a = create_colony_seeded(42);
        let b = create_colony_seeded(42);
        assert_eq!(a.terrain().cells(), b.terrain().cells());
        let spots = |c: &Colony| c.agents().iter().map(|x| (x.id, x.position)).collect::<Vec<_>>();
        assert_eq!(spots(&a), spots(&b));
        assert_ne!(a.session_id(), b.session_id());

        let small = ColonyConfig { initial_workers: 3, ..Default::default() };
        let c = create_colony_in(small, SimulationContext::seeded(42)).expect("colony");
        assert_eq!(c.agents().len(), 4);
    }

    #[test]
    fn bad_directive_is_an_error() {
        assert!(parse_directive("{\"dig_priority\": \"lots\"}").is_err());
    }

    #[test]
    fn checkpoint_round_trip_through_facade() {
        let mut colony = create_colony();
        tick(&mut colony, 250);
        let json = serialize(&colony).expect("serialize");
        let restored = deserialize(&json);
        assert_eq!(restored.frame(), 250);
        assert_eq!(restored.terrain().cells(), colony.terrain().cells());
        assert_eq!(get_snapshot(&restored).population, get_snapshot(&colony).population);
    }
}

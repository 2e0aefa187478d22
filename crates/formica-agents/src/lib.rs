//! # Formica Agents
//!
//! The per-ant behavior engine. Each frame an ant senses its surroundings,
//! decides what to do, acts and is moved by physics:
//!
//! - **BehaviorEngine**: sense → think → act → physics for one agent
//! - **Initiative**: independent Bernoulli trials that hand idle workers a job
//! - **Navigation**: walkable-cell path search and steering
//! - **Recovery**: lifting stuck ants back into open space
//! - **Queen**: upkeep for the one ant that never works
//!
//! Agents never touch each other directly. Anything that affects a
//! nestmate is returned as an [`AgentEvent`](formica_core::world::AgentEvent)
//! for the colony to apply.

pub mod act;
pub mod behavior;
pub mod initiative;
pub mod nav;
pub mod physics;
pub mod prelude;
pub mod queen;
pub mod recovery;
pub mod sense;

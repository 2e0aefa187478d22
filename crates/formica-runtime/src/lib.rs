//! # Formica Runtime
//!
//! Colony orchestration for the Formica ant simulation.
//!
//! The runtime is the colony itself: it owns the terrain, pheromones,
//! agents, brood and food, and advances them one frame per [`Colony::tick`].
//! Around the tick loop sit the periodic passes (goal recomputation, chamber
//! detection, brood lifecycle) and the checkpoint codec that lets a colony
//! outlive the process running it.

pub mod chambers;
pub mod checkpoint;
pub mod colony;
pub mod generation;
pub mod goals;
pub mod lifecycle;
pub mod prelude;
pub mod session;
pub mod snapshot;

pub use colony::Colony;

//! # Formica Core
//!
//! Leaf types for the Formica ant colony simulation.
//!
//! This crate holds the state a colony is made of, with no orchestration:
//!
//! - **TerrainGrid**: diggable soil, hardness 0 (open) to 5 (rock), with gravity for loose spoil
//! - **PheromoneField**: trail, food and dig channels that decay at different rates
//! - **Agent**: one ant as plain data, plus pure queries over agent and terrain
//! - **Brood**: eggs, larvae and pupae and their per-frame aging
//! - **Chamber / FoodSource**: rooms the colony has carved and the food it knows about
//! - **ColonyGoals / Directive**: the colony's plan and advice from outside
//! - **SimulationContext**: id counter and random source for one run
//!
//! ## Quick Start
//!
//! ```rust
//! use formica_core::prelude::*;
//!
//! let mut grid = TerrainGrid::filled(16, 16, 4, 1);
//! assert!(grid.dig(8, 8));
//! assert_eq!(grid.total_dug(), 1);
//!
//! let mut field = PheromoneField::new(16, 16);
//! field.deposit(Channel::Dig, 8, 8, 1.0);
//! field.decay();
//! assert!(field.get(Channel::Dig, 8, 8) < 1.0);
//! ```

pub mod agent;
pub mod brood;
pub mod chamber;
pub mod context;
pub mod error;
pub mod food;
pub mod goals;
pub mod lenient;
pub mod params;
pub mod pheromone;
pub mod prelude;
pub mod terrain;
pub mod types;
pub mod world;

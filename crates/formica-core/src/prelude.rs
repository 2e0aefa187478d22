//! Formica Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use formica_core::prelude::*;
//! ```

pub use crate::types::{AgentId, BroodId, FoodId, Frame, NestLayout, Position};

pub use crate::agent::{
    energy_fraction, grid_cell, is_hungry, is_on_surface, is_supported, is_underground,
    max_speed, needs_rest, role_of, Agent, AgentState, Role, Traits,
};
pub use crate::brood::{Brood, BroodStage, BroodTransition};
pub use crate::chamber::{find_chamber, Chamber, ChamberType};
pub use crate::context::SimulationContext;
pub use crate::food::{nearest_food, stash_food, stored_food, FoodKind, FoodSource};
pub use crate::goals::{
    ActiveDirective, ColonyGoals, Directive, Focus, Phase, RoleQuotas, RoleShift,
};
pub use crate::params::{Params, TuningPatch};
pub use crate::pheromone::{Channel, Gradient, PheromoneField, SparseLayer};
pub use crate::terrain::TerrainGrid;
pub use crate::world::{AgentEvent, AgentSighting, DeathCause, Workforce, WorldView};

pub use crate::error::{CheckpointError, FormicaError, Result};

//! The slice of colony state an agent can see and touch during its update.
//!
//! The colony lends each agent a [`WorldView`] in turn. Other agents are
//! visible only through the census taken at the start of the frame, so an
//! agent never holds a reference to a nestmate; anything it wants to do to
//! another agent goes out as an [`AgentEvent`] for the colony to apply.

use crate::agent::{AgentState, Role};
use crate::brood::Brood;
use crate::chamber::Chamber;
use crate::food::FoodSource;
use crate::goals::ColonyGoals;
use crate::params::Params;
use crate::pheromone::PheromoneField;
use crate::terrain::TerrainGrid;
use crate::types::{AgentId, BroodId, Frame, NestLayout, Position};
use serde::Serialize;
use std::collections::BTreeMap;

/// Where a nestmate was at the start of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSighting {
    pub id: AgentId,
    pub position: Position,
    pub state: AgentState,
    pub is_queen: bool,
}

/// Head count per role at the start of the frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workforce {
    pub workers: usize,
    pub by_role: BTreeMap<Role, usize>,
}

impl Workforce {
    pub fn count(&self, role: Role) -> usize {
        self.by_role.get(&role).copied().unwrap_or(0)
    }

    /// Share of workers in a role.
    pub fn share(&self, role: Role) -> f64 {
        if self.workers == 0 {
            return 0.0;
        }
        self.count(role) as f64 / self.workers as f64
    }
}

/// Mutable access to the shared environment for one agent update.
pub struct WorldView<'a> {
    pub terrain: &'a mut TerrainGrid,
    pub pheromones: &'a mut PheromoneField,
    pub food: &'a mut Vec<FoodSource>,
    pub brood: &'a mut Vec<Brood>,
    pub chambers: &'a [Chamber],
    pub goals: &'a ColonyGoals,
    pub params: &'a Params,
    pub layout: NestLayout,
    pub census: &'a [AgentSighting],
    pub workforce: &'a Workforce,
    pub frame: Frame,
}

/// Why an agent died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathCause {
    Starvation,
}

/// Something an agent did that the colony needs to know about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AgentEvent {
    /// A cell was cleared.
    Dug { agent: AgentId, col: i32, row: i32 },
    /// Spoil was dropped on the surface.
    SandDeposited { agent: AgentId, col: i32, row: i32 },
    /// Food was picked up from a source.
    FoodCollected { agent: AgentId, amount: u32 },
    /// Food was put into a store.
    FoodStored { agent: AgentId, amount: u32, underground: bool },
    LarvaFed { agent: AgentId, brood: BroodId },
    Ate { agent: AgentId },
    /// A forager asked an idle nestmate to follow it.
    Recruited { leader: AgentId, follower: AgentId },
    /// A stuck agent was moved to open ground.
    Unstuck { agent: AgentId },
    Died { agent: AgentId, cause: DeathCause },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workforce_share() {
        let mut w = Workforce { workers: 4, ..Default::default() };
        w.by_role.insert(Role::Digger, 3);
        assert_eq!(w.count(Role::Digger), 3);
        assert_eq!(w.count(Role::Nurse), 0);
        assert!((w.share(Role::Digger) - 0.75).abs() < 1e-9);
        assert_eq!(Workforce::default().share(Role::Digger), 0.0);
    }
}

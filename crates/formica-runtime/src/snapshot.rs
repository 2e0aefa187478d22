//! Compact colony summary for people and advisory services.

use crate::colony::{Colony, ColonyCounters};
use formica_core::agent::{energy_fraction, role_of};
use formica_core::brood::BroodStage;
use formica_core::food::{stored_food, FoodKind};
use formica_core::goals::Phase;
use formica_core::types::Frame;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Agents whose stuck counter reaches this are reported as stuck.
pub const STUCK_REPORT: u32 = 30;

/// Brood counts by stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroodCounts {
    pub eggs: usize,
    pub larvae: usize,
    pub pupae: usize,
    /// Larvae still waiting for feedings.
    pub hungry_larvae: usize,
}

impl BroodCounts {
    pub fn total(&self) -> usize {
        self.eggs + self.larvae + self.pupae
    }
}

/// Summary of the colony at one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColonySnapshot {
    pub frame: Frame,
    pub sim_day: u64,
    pub phase: Phase,
    pub dig_priority: f64,
    pub has_queen: bool,
    /// Workers, not counting the queen.
    pub population: usize,
    pub roles: BTreeMap<String, usize>,
    /// Share of underground cells that are open, in percent.
    pub dig_percent: f64,
    pub total_dug: u64,
    pub shaft_depth: u32,
    pub galleries: usize,
    pub brood: BroodCounts,
    pub chambers: BTreeMap<String, usize>,
    pub food_reserves: u32,
    pub forage_sources: usize,
    /// Mean energy fraction of the workers, 0 to 1.
    pub avg_energy: f64,
    pub stuck_agents: usize,
    pub directive: Option<String>,
    pub counters: ColonyCounters,
}

impl ColonySnapshot {
    pub fn capture(colony: &Colony) -> Self {
        let params = colony.params();
        let workers: Vec<_> = colony.agents().iter().filter(|a| !a.is_queen).collect();

        let mut roles = BTreeMap::new();
        for agent in &workers {
            *roles.entry(role_of(agent).as_str().to_string()).or_insert(0) += 1;
        }

        let mut brood = BroodCounts::default();
        for b in colony.brood() {
            match b.stage {
                BroodStage::Egg => brood.eggs += 1,
                BroodStage::Larva => brood.larvae += 1,
                BroodStage::Pupa => brood.pupae += 1,
            }
            if b.needs_feeding() {
                brood.hungry_larvae += 1;
            }
        }

        let mut chambers = BTreeMap::new();
        for ch in colony.chambers() {
            *chambers.entry(ch.chamber_type.as_str().to_string()).or_insert(0) += 1;
        }

        let terrain = colony.terrain();
        let underground = terrain.underground_cells();
        let dig_percent = if underground == 0 {
            0.0
        } else {
            terrain.open_underground_cells() as f64 * 100.0 / underground as f64
        };

        let avg_energy = if workers.is_empty() {
            0.0
        } else {
            workers.iter().map(|a| energy_fraction(a, params)).sum::<f64>() / workers.len() as f64
        };

        let goals = colony.goals();
        Self {
            frame: colony.frame(),
            sim_day: colony.sim_day(),
            phase: goals.phase,
            dig_priority: goals.dig_priority,
            has_queen: colony.has_queen(),
            population: workers.len(),
            roles,
            dig_percent,
            total_dug: colony.total_dug(),
            shaft_depth: goals.shaft_depth,
            galleries: goals.gallery_count,
            brood,
            chambers,
            food_reserves: stored_food(colony.food()),
            forage_sources: colony.food().iter().filter(|f| f.kind == FoodKind::Forage).count(),
            avg_energy,
            stuck_agents: workers.iter().filter(|a| a.stuck >= STUCK_REPORT).count(),
            directive: goals
                .directive
                .as_ref()
                .map(|d| d.directive.note.clone().unwrap_or_else(|| "unnamed".to_string())),
            counters: colony.counters().clone(),
        }
    }
}

impl fmt::Display for ColonySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queen = if self.has_queen { "with its queen" } else { "without a queen" };
        write!(
            f,
            "Day {} (frame {}): {} workers {}, {} phase, dig priority {:.2}. ",
            self.sim_day,
            self.frame,
            self.population,
            queen,
            self.phase.as_str(),
            self.dig_priority
        )?;
        let roles: Vec<String> = self.roles.iter().map(|(r, n)| format!("{n} {r}")).collect();
        if !roles.is_empty() {
            write!(f, "Roles: {}. ", roles.join(", "))?;
        }
        write!(
            f,
            "Excavated {:.1}% of the soil ({} cells), shaft {} deep, {} galleries. ",
            self.dig_percent, self.total_dug, self.shaft_depth, self.galleries
        )?;
        write!(
            f,
            "Brood: {} eggs, {} larvae ({} hungry), {} pupae. ",
            self.brood.eggs, self.brood.larvae, self.brood.hungry_larvae, self.brood.pupae
        )?;
        if self.chambers.is_empty() {
            write!(f, "No chambers yet. ")?;
        } else {
            let kinds: Vec<String> = self.chambers.iter().map(|(k, n)| format!("{n} {k}")).collect();
            write!(f, "Chambers: {}. ", kinds.join(", "))?;
        }
        write!(
            f,
            "Food: {} stored, {} sources outside. Average energy {:.0}%, {} stuck.",
            self.food_reserves,
            self.forage_sources,
            self.avg_energy * 100.0,
            self.stuck_agents
        )?;
        if let Some(note) = &self.directive {
            write!(f, " Following directive: {note}.")?;
        }
        Ok(())
    }
}

//! Colony goals and external directives.
//!
//! [`ColonyGoals`] is the snapshot the goal manager recomputes every few
//! seconds of simulated time: which construction phase the nest is in, how
//! hard the colony should be digging, and how the workforce ought to be
//! split. Idle workers consult it when deciding what to take up next.
//!
//! A [`Directive`] is advice from outside the simulation. It never commands
//! an agent directly; it adds weighted trials to idle initiative, nudges a
//! handful of workers into new roles, and may override the dig priority.

use crate::agent::{AgentState, Role};
use crate::lenient::{or_default, skip_invalid};
use crate::params::TuningPatch;
use crate::types::Frame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Construction phase of the nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Sinking the main shaft.
    #[default]
    Shaft,
    /// Running horizontal galleries off the shaft.
    Gallery,
    /// Hollowing out chambers.
    Chamber,
    /// Open-ended growth.
    Expand,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Shaft => "shaft",
            Phase::Gallery => "gallery",
            Phase::Chamber => "chamber",
            Phase::Expand => "expand",
        }
    }

    /// Intrinsic dig priority for the phase.
    pub fn base_dig_priority(self) -> f64 {
        match self {
            Phase::Shaft => 1.0,
            Phase::Gallery => 0.85,
            Phase::Chamber => 0.7,
            Phase::Expand => 0.45,
        }
    }
}

/// Desired share of the workforce per job, each in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleQuotas {
    pub digger: f64,
    pub forager: f64,
    pub nurse: f64,
    pub explorer: f64,
}

impl Default for RoleQuotas {
    fn default() -> Self {
        Self { digger: 0.5, forager: 0.25, nurse: 0.1, explorer: 0.15 }
    }
}

/// Areas an advisor can ask the colony to lean toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    ExtendShaft,
    Forage,
    Explore,
    Nurse,
    Rest,
}

impl Focus {
    /// State an idle worker takes up when a trial for this focus succeeds.
    pub fn entry_state(self) -> AgentState {
        match self {
            Focus::ExtendShaft => AgentState::Enter,
            Focus::Forage => AgentState::Forage,
            Focus::Explore => AgentState::Explore,
            Focus::Nurse => AgentState::Nurse,
            Focus::Rest => AgentState::Rest,
        }
    }
}

/// State a worker takes up when shifted into a role.
pub fn entry_state(role: Role) -> Option<AgentState> {
    match role {
        Role::Idle => Some(AgentState::Idle),
        Role::Digger => Some(AgentState::Enter),
        Role::Forager => Some(AgentState::Forage),
        Role::Explorer => Some(AgentState::Explore),
        Role::Nurse => Some(AgentState::Nurse),
        Role::Resting => Some(AgentState::Rest),
        Role::Queen | Role::Hungry => None,
    }
}

/// Move up to `count` workers from one role into another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleShift {
    /// Source role; `None` takes idle workers.
    #[serde(default)]
    pub from: Option<Role>,
    pub to: Role,
    #[serde(default = "one")]
    pub count: u32,
}

fn one() -> u32 {
    1
}

/// Advice from an external observer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directive {
    /// Weight per focus, `0..=1`. Each weight becomes an extra initiative trial.
    pub focus: BTreeMap<Focus, f64>,
    pub role_shifts: Vec<RoleShift>,
    /// Replaces the phase-derived dig priority while the directive is active.
    pub dig_priority: Option<f64>,
    pub tuning: TuningPatch,
    /// Frames the directive stays active; forever when unset.
    pub duration: Option<u64>,
    pub note: Option<String>,
}

/// A directive the colony is currently following.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveDirective {
    #[serde(default, deserialize_with = "or_default")]
    pub directive: Directive,
    #[serde(default)]
    pub applied_at: Frame,
    /// Role shifts not yet fully carried out.
    #[serde(default, deserialize_with = "skip_invalid")]
    pub pending_shifts: Vec<RoleShift>,
}

impl ActiveDirective {
    pub fn new(directive: Directive, frame: Frame) -> Self {
        let pending_shifts = directive
            .role_shifts
            .iter()
            .filter(|s| s.count > 0 && entry_state(s.to).is_some())
            .cloned()
            .collect();
        Self { directive, applied_at: frame, pending_shifts }
    }

    pub fn is_expired(&self, frame: Frame) -> bool {
        self.directive
            .duration
            .is_some_and(|d| frame >= self.applied_at.saturating_add(d))
    }
}

/// The colony's current plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyGoals {
    pub phase: Phase,
    pub dig_priority: f64,
    /// Open cells counted straight down the entrance column.
    pub shaft_depth: u32,
    pub gallery_count: usize,
    pub chamber_count: usize,
    pub has_brood_chamber: bool,
    pub food_reserves: u32,
    pub larvae_needing_food: usize,
    #[serde(deserialize_with = "or_default")]
    pub quotas: RoleQuotas,
    #[serde(deserialize_with = "or_default")]
    pub directive: Option<ActiveDirective>,
    pub updated_at: Frame,
}

impl Default for ColonyGoals {
    fn default() -> Self {
        Self {
            phase: Phase::Shaft,
            dig_priority: Phase::Shaft.base_dig_priority(),
            shaft_depth: 0,
            gallery_count: 0,
            chamber_count: 0,
            has_brood_chamber: false,
            food_reserves: 0,
            larvae_needing_food: 0,
            quotas: RoleQuotas::default(),
            directive: None,
            updated_at: 0,
        }
    }
}

impl ColonyGoals {
    /// Focus weights of the active directive, if any.
    pub fn focus_weights(&self) -> impl Iterator<Item = (Focus, f64)> + '_ {
        self.directive
            .iter()
            .flat_map(|d| d.directive.focus.iter().map(|(f, w)| (*f, w.clamp(0.0, 1.0))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_parses_with_defaults() {
        let json = r#"{
            "focus": {"extend_shaft": 0.8, "forage": 0.2},
            "role_shifts": [{"to": "forager", "count": 2}],
            "dig_priority": 0.9
        }"#;
        let d: Directive = serde_json::from_str(json).unwrap();
        assert_eq!(d.focus[&Focus::ExtendShaft], 0.8);
        assert_eq!(d.role_shifts[0].from, None);
        assert!(d.tuning.is_empty());
        assert!(d.duration.is_none());
    }

    #[test]
    fn invalid_shift_targets_are_dropped() {
        let d = Directive {
            role_shifts: vec![
                RoleShift { from: None, to: Role::Queen, count: 1 },
                RoleShift { from: None, to: Role::Nurse, count: 0 },
                RoleShift { from: Some(Role::Idle), to: Role::Digger, count: 3 },
            ],
            ..Default::default()
        };
        let active = ActiveDirective::new(d, 10);
        assert_eq!(active.pending_shifts.len(), 1);
        assert_eq!(active.pending_shifts[0].to, Role::Digger);
    }

    #[test]
    fn saved_directive_survives_bad_shift() {
        let json = r#"{
            "directive": {"note": "dig", "dig_priority": 0.4},
            "applied_at": 600,
            "pending_shifts": [{"to": "digger"}, {"to": "architect", "count": 2}]
        }"#;
        let active: ActiveDirective = serde_json::from_str(json).unwrap();
        assert_eq!(active.directive.dig_priority, Some(0.4));
        assert_eq!(active.pending_shifts.len(), 1);
        assert_eq!(active.pending_shifts[0].count, 1);

        let goals: ColonyGoals = serde_json::from_str(r#"{"directive": 7, "shaft_depth": 9}"#).unwrap();
        assert!(goals.directive.is_none());
        assert_eq!(goals.shaft_depth, 9);
    }

    #[test]
    fn directive_expiry() {
        let d = Directive { duration: Some(100), ..Default::default() };
        let active = ActiveDirective::new(d, 50);
        assert!(!active.is_expired(149));
        assert!(active.is_expired(150));
        assert!(!ActiveDirective::new(Directive::default(), 0).is_expired(u64::MAX));
    }

    #[test]
    fn focus_weights_are_clamped() {
        let mut focus = BTreeMap::new();
        focus.insert(Focus::Rest, 3.0);
        let goals = ColonyGoals {
            directive: Some(ActiveDirective::new(Directive { focus, ..Default::default() }, 0)),
            ..Default::default()
        };
        let weights: Vec<_> = goals.focus_weights().collect();
        assert_eq!(weights, vec![(Focus::Rest, 1.0)]);
    }
}

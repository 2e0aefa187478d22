//! Tunable behaviour parameters.
//!
//! These are the knobs an outside advisor may turn through a directive's
//! tuning patch. They travel with the checkpoint.

use serde::{Deserialize, Serialize};

/// Behaviour parameters shared by every agent in a colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Energy fraction below which an agent needs rest (default: 0.25).
    pub rest_threshold: f64,
    /// Scales how readily idle workers go exploring (default: 0.3).
    pub exploration_bias: f64,
    /// How far foragers can see food, in cells (default: 30.0).
    pub forage_radius: f64,
    /// Per-frame chance that a digger turns off to start a branch (default: 0.004).
    pub branching_chance: f64,
    /// Energy cap for workers and the queen (default: 100.0).
    pub max_energy: f64,
    /// Frames between egg-laying attempts (default: 1200).
    pub queen_spawn_interval: u64,
    /// Grains of sand a digger carries before hauling (default: 3).
    pub sand_carry_capacity: u32,
    /// Weight of nursing in idle initiative (default: 0.6).
    pub nurse_priority: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            rest_threshold: 0.25,
            exploration_bias: 0.3,
            forage_radius: 30.0,
            branching_chance: 0.004,
            max_energy: 100.0,
            queen_spawn_interval: 1200,
            sand_carry_capacity: 3,
            nurse_priority: 0.6,
        }
    }
}

/// Partial update to [`Params`]. Unset fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningPatch {
    pub rest_threshold: Option<f64>,
    pub exploration_bias: Option<f64>,
    pub forage_radius: Option<f64>,
    pub branching_chance: Option<f64>,
    pub max_energy: Option<f64>,
    pub queen_spawn_interval: Option<u64>,
    pub sand_carry_capacity: Option<u32>,
    pub nurse_priority: Option<f64>,
}

impl TuningPatch {
    pub fn is_empty(&self) -> bool {
        *self == TuningPatch::default()
    }
}

impl Params {
    /// Merge a patch, clamping each value to a sane range.
    pub fn apply(&mut self, patch: &TuningPatch) {
        if let Some(v) = patch.rest_threshold {
            self.rest_threshold = v;
        }
        if let Some(v) = patch.exploration_bias {
            self.exploration_bias = v;
        }
        if let Some(v) = patch.forage_radius {
            self.forage_radius = v;
        }
        if let Some(v) = patch.branching_chance {
            self.branching_chance = v;
        }
        if let Some(v) = patch.max_energy {
            self.max_energy = v;
        }
        if let Some(v) = patch.queen_spawn_interval {
            self.queen_spawn_interval = v;
        }
        if let Some(v) = patch.sand_carry_capacity {
            self.sand_carry_capacity = v;
        }
        if let Some(v) = patch.nurse_priority {
            self.nurse_priority = v;
        }
        self.clamp();
    }

    /// The same parameters with every value pulled into its sane range.
    /// Non-finite values fall back to the default.
    pub fn sanitized(mut self) -> Self {
        self.clamp();
        self
    }

    fn clamp(&mut self) {
        let d = Params::default();
        let fit = |v: f64, fallback: f64, lo: f64, hi: f64| if v.is_finite() { v.clamp(lo, hi) } else { fallback };
        self.rest_threshold = fit(self.rest_threshold, d.rest_threshold, 0.0, 0.9);
        self.exploration_bias = fit(self.exploration_bias, d.exploration_bias, 0.0, 1.0);
        self.forage_radius = fit(self.forage_radius, d.forage_radius, 1.0, 200.0);
        self.branching_chance = fit(self.branching_chance, d.branching_chance, 0.0, 0.1);
        self.max_energy = fit(self.max_energy, d.max_energy, 10.0, 1000.0);
        self.queen_spawn_interval = self.queen_spawn_interval.clamp(60, 100_000);
        self.sand_carry_capacity = self.sand_carry_capacity.clamp(1, 20);
        self.nurse_priority = fit(self.nurse_priority, d.nurse_priority, 0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_set_fields() {
        let mut p = Params::default();
        p.apply(&TuningPatch { forage_radius: Some(12.0), ..Default::default() });
        assert_eq!(p.forage_radius, 12.0);
        assert_eq!(p.rest_threshold, Params::default().rest_threshold);
    }

    #[test]
    fn patch_values_are_clamped() {
        let mut p = Params::default();
        p.apply(&TuningPatch {
            sand_carry_capacity: Some(0),
            exploration_bias: Some(4.0),
            ..Default::default()
        });
        assert_eq!(p.sand_carry_capacity, 1);
        assert_eq!(p.exploration_bias, 1.0);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let p: Params = serde_json::from_str(r#"{"max_energy": 80.0}"#).unwrap();
        assert_eq!(p.max_energy, 80.0);
        assert_eq!(p.queen_spawn_interval, 1200);
        assert!(TuningPatch::default().is_empty());
    }

    #[test]
    fn sanitized_pulls_values_into_range() {
        let p = Params {
            max_energy: 0.0,
            sand_carry_capacity: 0,
            queen_spawn_interval: 0,
            forage_radius: f64::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(p.max_energy, 10.0);
        assert_eq!(p.sand_carry_capacity, 1);
        assert_eq!(p.queen_spawn_interval, 60);
        assert_eq!(p.forage_radius, Params::default().forage_radius);
        assert_eq!(Params::default().sanitized(), Params::default());
    }
}

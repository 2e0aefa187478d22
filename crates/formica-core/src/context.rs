//! Simulation context: the id counter and random source shared by one run.
//!
//! Everything that needs a fresh id or a random draw receives the context
//! explicitly, so two colonies in the same process never share counters.

use crate::types::{AgentId, BroodId, FoodId};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Id allocation and randomness for a running simulation.
pub struct SimulationContext {
    rng: SmallRng,
    next_id: u64,
}

impl SimulationContext {
    /// A context seeded from entropy. Runs are not reproducible.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
            next_id: 1,
        }
    }

    /// A context with a fixed seed. Runs replay exactly.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            next_id: 1,
        }
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// The id the next allocation will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Move the id counter forward so it never hands out an id at or below `floor`.
    pub fn reserve_ids_through(&mut self, floor: u64) {
        self.next_id = self.next_id.max(floor.saturating_add(1));
    }

    /// Restore a counter read from a checkpoint. Never moves backwards.
    pub fn restore_next_id(&mut self, next_id: u64) {
        self.next_id = self.next_id.max(next_id);
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn agent_id(&mut self) -> AgentId {
        AgentId(self.allocate())
    }

    pub fn brood_id(&mut self) -> BroodId {
        BroodId(self.allocate())
    }

    pub fn food_id(&mut self) -> FoodId {
        FoodId(self.allocate())
    }

    /// Bernoulli trial.
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.rng.gen_bool(p)
    }

    /// Uniform draw in `[lo, hi)`. Returns `lo` for an empty range.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Uniform integer draw in `[lo, hi]`.
    pub fn between(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform angle in radians.
    pub fn angle(&mut self) -> f64 {
        self.rng.gen_range(0.0..std::f64::consts::TAU)
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_across_kinds() {
        let mut ctx = SimulationContext::seeded(1);
        let a = ctx.agent_id();
        let b = ctx.brood_id();
        let f = ctx.food_id();
        assert!(a.0 < b.0 && b.0 < f.0);
        assert_eq!(ctx.next_id(), f.0 + 1);
    }

    #[test]
    fn restore_never_rewinds() {
        let mut ctx = SimulationContext::seeded(1);
        ctx.restore_next_id(50);
        assert_eq!(ctx.next_id(), 50);
        ctx.restore_next_id(10);
        assert_eq!(ctx.next_id(), 50);
        ctx.reserve_ids_through(80);
        assert_eq!(ctx.agent_id().0, 81);
    }

    #[test]
    fn degenerate_ranges_do_not_panic() {
        let mut ctx = SimulationContext::seeded(3);
        assert_eq!(ctx.uniform(2.0, 2.0), 2.0);
        assert_eq!(ctx.between(5, 5), 5);
        assert!(!ctx.chance(0.0));
        assert!(ctx.chance(1.5));
    }
}

//! Brood items: eggs, larvae and pupae.
//!
//! Each item ages one frame at a time. Eggs hatch into larvae, larvae must
//! be fed before they can pupate, and pupae eclose as new workers. A larva
//! that is never fed starves once it has waited twice the normal larval time.

use crate::context::SimulationContext;
use crate::types::{BroodId, Position};
use serde::{Deserialize, Serialize};

/// Frames an egg takes to hatch.
pub const EGG_FRAMES: u32 = 1800;
/// Frames a fed larva takes to pupate.
pub const LARVA_FRAMES: u32 = 3600;
/// Frames a pupa takes to eclose.
pub const PUPA_FRAMES: u32 = 2400;
/// Feedings a larva needs before it can pupate.
pub const FEEDINGS_NEEDED: u32 = 3;
/// An underfed larva dies after this long in the larval stage.
pub const LARVA_STARVATION_FRAMES: u32 = 2 * LARVA_FRAMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroodStage {
    #[default]
    Egg,
    Larva,
    Pupa,
}

/// What happened to a brood item on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroodTransition {
    Unchanged,
    Hatched,
    Pupated,
    /// Ready to become an adult worker; the item should be removed.
    Eclosed,
    /// Starved as a larva; the item should be removed.
    Starved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brood {
    /// Zero in a saved record means "assign a fresh id on load".
    #[serde(default)]
    pub id: BroodId,
    pub position: Position,
    #[serde(default)]
    pub stage: BroodStage,
    #[serde(default)]
    pub stage_ticks: u32,
    #[serde(default)]
    pub feedings: u32,
}

impl Brood {
    /// A freshly laid egg.
    pub fn egg(ctx: &mut SimulationContext, position: Position) -> Self {
        Self {
            id: ctx.brood_id(),
            position,
            stage: BroodStage::Egg,
            stage_ticks: 0,
            feedings: 0,
        }
    }

    /// Whether a nurse should bring this item food.
    pub fn needs_feeding(&self) -> bool {
        self.stage == BroodStage::Larva && self.feedings < FEEDINGS_NEEDED
    }

    /// Record one feeding. Returns `false` if the item did not need it.
    pub fn feed(&mut self) -> bool {
        if !self.needs_feeding() {
            return false;
        }
        self.feedings += 1;
        true
    }

    /// Age the item by one frame and apply any stage change.
    pub fn advance(&mut self) -> BroodTransition {
        self.stage_ticks = self.stage_ticks.saturating_add(1);
        match self.stage {
            BroodStage::Egg if self.stage_ticks >= EGG_FRAMES => {
                self.stage = BroodStage::Larva;
                self.stage_ticks = 0;
                BroodTransition::Hatched
            }
            BroodStage::Larva if self.feedings >= FEEDINGS_NEEDED && self.stage_ticks >= LARVA_FRAMES => {
                self.stage = BroodStage::Pupa;
                self.stage_ticks = 0;
                BroodTransition::Pupated
            }
            BroodStage::Larva if self.stage_ticks >= LARVA_STARVATION_FRAMES => BroodTransition::Starved,
            BroodStage::Pupa if self.stage_ticks >= PUPA_FRAMES => BroodTransition::Eclosed,
            _ => BroodTransition::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn larva() -> Brood {
        let mut ctx = SimulationContext::seeded(1);
        let mut b = Brood::egg(&mut ctx, Position::new(3.0, 3.0));
        b.stage = BroodStage::Larva;
        b
    }

    #[test]
    fn egg_hatches_after_egg_frames() {
        let mut ctx = SimulationContext::seeded(1);
        let mut b = Brood::egg(&mut ctx, Position::new(3.0, 3.0));
        for _ in 0..EGG_FRAMES - 1 {
            assert_eq!(b.advance(), BroodTransition::Unchanged);
        }
        assert_eq!(b.advance(), BroodTransition::Hatched);
        assert_eq!(b.stage, BroodStage::Larva);
    }

    #[test]
    fn fed_larva_pupates() {
        let mut b = larva();
        for _ in 0..FEEDINGS_NEEDED {
            assert!(b.feed());
        }
        assert!(!b.feed());
        let mut last = BroodTransition::Unchanged;
        for _ in 0..LARVA_FRAMES {
            last = b.advance();
        }
        assert_eq!(last, BroodTransition::Pupated);
        assert_eq!(b.stage, BroodStage::Pupa);
    }

    #[test]
    fn unfed_larva_starves_at_double_duration() {
        let mut b = larva();
        for _ in 0..LARVA_STARVATION_FRAMES - 1 {
            assert_eq!(b.advance(), BroodTransition::Unchanged);
        }
        assert_eq!(b.advance(), BroodTransition::Starved);
    }

    #[test]
    fn late_feeding_still_pupates_before_starvation() {
        let mut b = larva();
        for _ in 0..LARVA_FRAMES + 100 {
            b.advance();
        }
        for _ in 0..FEEDINGS_NEEDED {
            b.feed();
        }
        assert_eq!(b.advance(), BroodTransition::Pupated);
    }

    #[test]
    fn pupa_ecloses() {
        let mut b = larva();
        b.stage = BroodStage::Pupa;
        for _ in 0..PUPA_FRAMES - 1 {
            b.advance();
        }
        assert_eq!(b.advance(), BroodTransition::Eclosed);
        assert!(!b.needs_feeding());
    }
}

//! Brood lifecycle: ageing brood, emerging workers and egg laying.

use crate::colony::{Colony, ColonyEvent};
use formica_agents::nav::settle;
use formica_core::agent::Agent;
use formica_core::brood::{Brood, BroodTransition};
use formica_core::chamber::{find_chamber, ChamberType};
use formica_core::food::{stored_food, FoodKind};
use formica_core::types::Position;
use tracing::debug;

/// Energy fraction a freshly eclosed worker starts with.
const EMERGE_ENERGY: f64 = 0.6;
/// Maturity ceiling for a freshly eclosed worker.
const EMERGE_MATURITY: f64 = 0.05;
/// The queen lays even without reserves while brood is below this.
const MIN_BROOD_BUFFER: usize = 2;

/// Age every brood item by one frame, then give the queen a chance to lay.
pub fn advance(colony: &mut Colony, events: &mut Vec<ColonyEvent>) {
    let mut emerged = Vec::new();
    let mut starved = 0u64;
    colony.brood.retain_mut(|b| match b.advance() {
        BroodTransition::Unchanged => true,
        BroodTransition::Hatched => {
            events.push(ColonyEvent::Hatched { brood: b.id });
            true
        }
        BroodTransition::Pupated => {
            events.push(ColonyEvent::Pupated { brood: b.id });
            true
        }
        BroodTransition::Eclosed => {
            emerged.push(b.position);
            false
        }
        BroodTransition::Starved => {
            events.push(ColonyEvent::BroodStarved { brood: b.id });
            starved += 1;
            false
        }
    });
    colony.counters.brood_starved += starved;

    for position in emerged {
        let maturity = colony.ctx.uniform(0.0, EMERGE_MATURITY);
        let energy = colony.params.max_energy * EMERGE_ENERGY;
        let worker = Agent::worker(&mut colony.ctx, position, maturity, energy);
        debug!(agent = %worker.id, frame = colony.frame, "Worker emerged");
        events.push(ColonyEvent::Emerged { agent: worker.id });
        colony.counters.workers_born += 1;
        colony.agents.push(worker);
    }

    lay_egg(colony, events);
}

/// Whether the queen may lay on this frame.
pub fn can_lay(colony: &Colony) -> bool {
    let interval = colony.params.queen_spawn_interval.max(1);
    if !colony.has_queen || colony.frame % interval != 0 {
        return false;
    }
    let supplied = stored_food(&colony.food) >= 1 || colony.brood.len() < MIN_BROOD_BUFFER;
    let room = colony.agents.len() + colony.brood.len() < colony.config.population_cap;
    supplied && room
}

fn lay_egg(colony: &mut Colony, events: &mut Vec<ColonyEvent>) {
    if !can_lay(colony) {
        return;
    }
    let Some(queen) = colony.agents.iter().find(|a| a.is_queen).map(|a| a.position) else {
        return;
    };

    // One unit of reserves goes into every egg when there is any.
    if let Some(store) = colony
        .food
        .iter_mut()
        .filter(|f| f.kind == FoodKind::Store && !f.is_depleted())
        .min_by(|a, b| a.position.distance_to(&queen).total_cmp(&b.position.distance_to(&queen)))
    {
        store.take(1);
    }

    let position = match find_chamber(&colony.chambers, ChamberType::Brood) {
        Some(nursery) => {
            let (c, r) = nursery.centroid.cell();
            let dc = colony.ctx.between(0, 2) as i32 - 1;
            let (sc, sr) = settle(&colony.terrain, c + dc, r);
            if colony.terrain.is_open(sc, sr) {
                Position::of_cell(sc, sr)
            } else {
                queen
            }
        }
        None => queen,
    };
    let egg = Brood::egg(&mut colony.ctx, position);
    debug!(brood = egg.id.0, frame = colony.frame, "Egg laid");
    events.push(ColonyEvent::EggLaid { brood: egg.id });
    colony.counters.eggs_laid += 1;
    colony.brood.push(egg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::ColonyConfig;
    use formica_core::brood::{BroodStage, EGG_FRAMES, LARVA_FRAMES, PUPA_FRAMES};
    use formica_core::context::SimulationContext;

    fn colony() -> Colony {
        Colony::with_context(ColonyConfig::default(), SimulationContext::seeded(11)).expect("colony")
    }

    /// A colony whose queen never lays, so only the pushed brood ages.
    fn barren() -> Colony {
        let mut c = colony();
        c.has_queen = false;
        c
    }

    fn larva(colony: &mut Colony) -> Brood {
        let mut b = Brood::egg(&mut colony.ctx, Position::of_cell(60, 19));
        b.stage = BroodStage::Larva;
        b
    }

    #[test]
    fn fed_larva_pupates_then_emerges() {
        let mut c = barren();
        let mut b = larva(&mut c);
        b.feedings = 3;
        c.brood.push(b);
        let workers = c.agents.len();
        let mut events = Vec::new();
        for _ in 0..LARVA_FRAMES {
            advance(&mut c, &mut events);
        }
        assert!(events.iter().any(|e| matches!(e, ColonyEvent::Pupated { .. })));
        assert_eq!(c.brood.iter().filter(|b| b.stage == BroodStage::Pupa).count(), 1);
        for _ in 0..PUPA_FRAMES {
            advance(&mut c, &mut events);
        }
        assert_eq!(c.agents.len(), workers + 1);
        assert_eq!(c.counters.workers_born, 1);
        let newborn = c.agents.last().expect("newborn");
        assert!(newborn.maturity <= EMERGE_MATURITY);
        assert!((newborn.energy - 60.0).abs() < 1e-9);
    }

    #[test]
    fn unfed_larva_starves_after_double_time() {
        let mut c = barren();
        let b = larva(&mut c);
        let id = b.id;
        c.brood.push(b);
        let mut events = Vec::new();
        for _ in 0..2 * LARVA_FRAMES - 1 {
            advance(&mut c, &mut events);
        }
        assert!(c.brood.iter().any(|b| b.id == id));
        advance(&mut c, &mut events);
        assert!(c.brood.iter().all(|b| b.id != id));
        assert_eq!(c.counters.brood_starved, 1);
    }

    #[test]
    fn egg_hatches() {
        let mut c = barren();
        let egg = Brood::egg(&mut c.ctx, Position::of_cell(60, 19));
        c.brood.push(egg);
        let mut events = Vec::new();
        for _ in 0..EGG_FRAMES {
            advance(&mut c, &mut events);
        }
        assert!(events.iter().any(|e| matches!(e, ColonyEvent::Hatched { .. })));
    }

    #[test]
    fn queen_lays_on_interval_and_respects_cap() {
        let mut c = colony();
        c.frame = c.params.queen_spawn_interval;
        assert!(can_lay(&c));
        let mut events = Vec::new();
        lay_egg(&mut c, &mut events);
        assert_eq!(c.brood.len(), 1);
        assert_eq!(stored_food(&c.food), 11);

        c.frame += 1;
        assert!(!can_lay(&c));

        c.frame = c.params.queen_spawn_interval * 2;
        c.config.population_cap = c.agents.len() + c.brood.len();
        assert!(!can_lay(&c));
    }

    #[test]
    fn no_reserves_still_lays_into_small_brood() {
        let mut c = colony();
        c.food.retain(|f| f.kind != FoodKind::Store);
        c.frame = c.params.queen_spawn_interval;
        assert!(can_lay(&c));
        c.brood.push(Brood::egg(&mut c.ctx, Position::of_cell(60, 19)));
        c.brood.push(Brood::egg(&mut c.ctx, Position::of_cell(60, 19)));
        assert!(!can_lay(&c));
    }
}

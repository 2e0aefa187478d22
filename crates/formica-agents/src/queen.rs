//! Queen upkeep.
//!
//! The queen does not work. She eats from nearby stores, stays in (or
//! walks back to) the royal chamber and is otherwise subject to the same
//! physics as everyone else. Egg laying belongs to the brood lifecycle.

use crate::act::{shaft_bottom, FOOD_ENERGY};
use crate::behavior::BASE_DRAIN;
use crate::nav::{navigate, settle};
use crate::physics::apply_physics;
use formica_core::agent::{energy_fraction, is_underground, Agent, MATURITY_PER_FRAME};
use formica_core::chamber::{find_chamber, ChamberType};
use formica_core::food::FoodKind;
use formica_core::world::{AgentEvent, DeathCause, WorldView};

/// The queen eats when below this fraction of max energy.
const QUEEN_APPETITE: f64 = 0.5;
/// Stores farther away than this are out of the queen's reach.
const QUEEN_REACH: f64 = 6.0;

/// One frame of queen upkeep.
pub fn update_queen(agent: &mut Agent, world: &mut WorldView<'_>, events: &mut Vec<AgentEvent>) {
    agent.energy -= BASE_DRAIN * 0.5;
    agent.maturity = (agent.maturity + MATURITY_PER_FRAME).min(1.0);
    agent.state_ticks = agent.state_ticks.saturating_add(1);
    if agent.energy <= 0.0 {
        agent.alive = false;
        events.push(AgentEvent::Died { agent: agent.id, cause: DeathCause::Starvation });
        return;
    }

    let params = world.params;
    if energy_fraction(agent, params) < QUEEN_APPETITE {
        let pos = agent.position;
        let meal = world
            .food
            .iter_mut()
            .filter(|f| f.kind == FoodKind::Store && !f.is_depleted())
            .find(|f| f.position.distance_to(&pos) <= QUEEN_REACH);
        if let Some(store) = meal {
            if store.take(1) > 0 {
                agent.energy = (agent.energy + FOOD_ENERGY).min(params.max_energy);
                events.push(AgentEvent::Ate { agent: agent.id });
            }
        }
    }

    let home = match find_chamber(world.chambers, ChamberType::Royal) {
        Some(royal) if royal.contains(&agent.position) => None,
        Some(royal) => {
            let (c, r) = royal.centroid.cell();
            Some(settle(world.terrain, c, r))
        }
        None if !is_underground(agent, &world.layout) => Some(shaft_bottom(world.terrain, world.layout.entrance_col)),
        None => None,
    };
    match home {
        Some(goal) => {
            navigate(agent, goal, world.terrain, params);
        }
        None => agent.stop(),
    }
    apply_physics(agent, world.terrain);
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_core::context::SimulationContext;
    use formica_core::food::FoodSource;
    use formica_core::goals::ColonyGoals;
    use formica_core::params::Params;
    use formica_core::pheromone::PheromoneField;
    use formica_core::terrain::{TerrainGrid, OPEN};
    use formica_core::types::{NestLayout, Position};
    use formica_core::world::Workforce;

    #[test]
    fn hungry_queen_eats_from_nearby_store() {
        let mut ctx = SimulationContext::seeded(3);
        let mut terrain = TerrainGrid::filled(20, 20, 4, 3);
        for c in 5..12 {
            terrain.set(c, 10, OPEN);
        }
        let mut pheromones = PheromoneField::new(20, 20);
        let mut food = vec![FoodSource::new(&mut ctx, Position::of_cell(9, 10), 3, FoodKind::Store)];
        let mut brood = Vec::new();
        let goals = ColonyGoals::default();
        let params = Params::default();
        let workforce = Workforce::default();
        let mut world = WorldView {
            terrain: &mut terrain,
            pheromones: &mut pheromones,
            food: &mut food,
            brood: &mut brood,
            chambers: &[],
            goals: &goals,
            params: &params,
            layout: NestLayout { surface_row: 4, entrance_col: 10 },
            census: &[],
            workforce: &workforce,
            frame: 1,
        };
        let mut queen = Agent::queen(&mut ctx, Position::of_cell(6, 10), 30.0);
        let mut events = Vec::new();
        update_queen(&mut queen, &mut world, &mut events);
        assert!(events.contains(&AgentEvent::Ate { agent: queen.id }));
        assert!(queen.energy > 69.0);
        assert_eq!(food[0].amount, 2);
    }
}

//! Sensing: what an agent perceives before it decides.
//!
//! Biological analog: antennae sweeping the air for pheromone, and a
//! short-range look around for food and nestmates.

use formica_core::agent::{is_on_surface, is_supported, is_underground, Agent};
use formica_core::food::{FoodKind, FoodSource};
use formica_core::pheromone::{Channel, Gradient};
use formica_core::types::{FoodId, Position};
use formica_core::world::WorldView;

/// Radius at which pheromone gradients are sampled, in cells.
pub const SCENT_RADIUS: f64 = 3.0;
/// Nestmates closer than this count toward crowding.
const CROWD_RADIUS: f64 = 2.0;

/// A food source within reach of the senses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodSighting {
    pub id: FoodId,
    pub position: Position,
    pub distance: f64,
}

/// One frame of perception.
#[derive(Debug, Clone, PartialEq)]
pub struct Senses {
    pub underground: bool,
    pub on_surface: bool,
    pub supported: bool,
    /// Dig pheromone under the agent.
    pub local_dig: f32,
    pub trail: Option<Gradient>,
    pub food_scent: Option<Gradient>,
    pub dig_scent: Option<Gradient>,
    /// Nearest natural food within the forage radius.
    pub forage: Option<FoodSighting>,
    /// Nestmates within a couple of cells.
    pub crowding: usize,
}

fn nearest_forage(food: &[FoodSource], from: &Position, radius: f64) -> Option<FoodSighting> {
    food.iter()
        .filter(|f| f.kind == FoodKind::Forage && !f.is_depleted())
        .map(|f| FoodSighting { id: f.id, position: f.position, distance: f.position.distance_to(from) })
        .filter(|s| s.distance <= radius)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Sample the world around an agent.
pub fn sense(agent: &Agent, world: &WorldView<'_>) -> Senses {
    let pos = agent.position;
    let crowding = world
        .census
        .iter()
        .filter(|s| s.id != agent.id && s.position.distance_to(&pos) < CROWD_RADIUS)
        .count();
    Senses {
        underground: is_underground(agent, &world.layout),
        on_surface: is_on_surface(agent, world.terrain),
        supported: is_supported(agent, world.terrain),
        local_dig: world.pheromones.sample(Channel::Dig, &pos),
        trail: world.pheromones.gradient(Channel::Trail, &pos, SCENT_RADIUS),
        food_scent: world.pheromones.gradient(Channel::Food, &pos, SCENT_RADIUS),
        dig_scent: world.pheromones.gradient(Channel::Dig, &pos, SCENT_RADIUS),
        forage: nearest_forage(world.food, &pos, world.params.forage_radius),
        crowding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_core::context::SimulationContext;

    #[test]
    fn forage_respects_radius_and_kind() {
        let mut ctx = SimulationContext::seeded(2);
        let food = vec![
            FoodSource::new(&mut ctx, Position::new(4.0, 0.0), 5, FoodKind::Store),
            FoodSource::new(&mut ctx, Position::new(8.0, 0.0), 5, FoodKind::Forage),
            FoodSource::new(&mut ctx, Position::new(50.0, 0.0), 5, FoodKind::Forage),
        ];
        let origin = Position::new(0.0, 0.0);
        let seen = nearest_forage(&food, &origin, 10.0).expect("sighting");
        assert_eq!(seen.position.x, 8.0);
        assert!(nearest_forage(&food, &origin, 5.0).is_none());
    }
}

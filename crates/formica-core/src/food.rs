//! Food sources on the surface and stores inside the nest.

use crate::context::SimulationContext;
use crate::types::{FoodId, Position};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodKind {
    /// Natural food found by foragers.
    #[default]
    Forage,
    /// Food the colony has brought home.
    Store,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSource {
    #[serde(default)]
    pub id: FoodId,
    pub position: Position,
    #[serde(default)]
    pub amount: u32,
    #[serde(default)]
    pub kind: FoodKind,
}

impl FoodSource {
    pub fn new(ctx: &mut SimulationContext, position: Position, amount: u32, kind: FoodKind) -> Self {
        Self { id: ctx.food_id(), position, amount, kind }
    }

    pub fn is_depleted(&self) -> bool {
        self.amount == 0
    }

    /// Remove up to `n` units. Returns how many were taken.
    pub fn take(&mut self, n: u32) -> u32 {
        let taken = n.min(self.amount);
        self.amount -= taken;
        taken
    }
}

/// Total food held in colony stores.
pub fn stored_food(food: &[FoodSource]) -> u32 {
    food.iter().filter(|f| f.kind == FoodKind::Store).map(|f| f.amount).sum()
}

/// Nearest non-empty source matching `filter`.
pub fn nearest_food<'a>(
    food: &'a [FoodSource],
    from: &Position,
    filter: impl Fn(&FoodSource) -> bool,
) -> Option<&'a FoodSource> {
    food.iter()
        .filter(|f| !f.is_depleted() && filter(f))
        .min_by(|a, b| {
            a.position
                .distance_to(from)
                .total_cmp(&b.position.distance_to(from))
        })
}

/// Add food to a store within `radius` of `position`, or open a new one.
pub fn stash_food(
    food: &mut Vec<FoodSource>,
    ctx: &mut SimulationContext,
    position: Position,
    amount: u32,
    radius: f64,
) -> FoodId {
    if let Some(store) = food
        .iter_mut()
        .find(|f| f.kind == FoodKind::Store && f.position.distance_to(&position) <= radius)
    {
        store.amount += amount;
        return store.id;
    }
    let store = FoodSource::new(ctx, position, amount, FoodKind::Store);
    let id = store.id;
    food.push(store);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_never_underflows() {
        let mut ctx = SimulationContext::seeded(1);
        let mut f = FoodSource::new(&mut ctx, Position::new(0.0, 0.0), 3, FoodKind::Forage);
        assert_eq!(f.take(2), 2);
        assert_eq!(f.take(5), 1);
        assert!(f.is_depleted());
    }

    #[test]
    fn stash_merges_nearby_stores() {
        let mut ctx = SimulationContext::seeded(1);
        let mut food = Vec::new();
        let a = stash_food(&mut food, &mut ctx, Position::new(5.0, 5.0), 2, 3.0);
        let b = stash_food(&mut food, &mut ctx, Position::new(6.0, 5.0), 1, 3.0);
        assert_eq!(a, b);
        stash_food(&mut food, &mut ctx, Position::new(20.0, 5.0), 4, 3.0);
        assert_eq!(food.len(), 2);
        assert_eq!(stored_food(&food), 7);
    }

    #[test]
    fn nearest_skips_empty_and_filtered() {
        let mut ctx = SimulationContext::seeded(1);
        let food = vec![
            FoodSource::new(&mut ctx, Position::new(1.0, 0.0), 0, FoodKind::Store),
            FoodSource::new(&mut ctx, Position::new(3.0, 0.0), 2, FoodKind::Forage),
            FoodSource::new(&mut ctx, Position::new(9.0, 0.0), 2, FoodKind::Store),
        ];
        let origin = Position::new(0.0, 0.0);
        let any = nearest_food(&food, &origin, |_| true).unwrap();
        assert_eq!(any.position.x, 3.0);
        let store = nearest_food(&food, &origin, |f| f.kind == FoodKind::Store).unwrap();
        assert_eq!(store.position.x, 9.0);
    }
}

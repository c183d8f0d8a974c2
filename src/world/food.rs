//! Food supply storage and queries
//!
//! Food is kept in a `Vec` for deterministic iteration order (nearest-food
//! ties resolve to the earliest item) with an id index for O(1) target
//! revalidation.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{FoodId, Vec2};
use crate::world::arena::Arena;
use crate::world::obstacle::{self, Obstacle};

/// Attempts to find an obstacle-free spot before settling for the last draw
const PLACEMENT_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Vec2,
    pub size: f32,
}

/// All food currently in the arena
#[derive(Debug, Clone, Default)]
pub struct FoodSupply {
    items: Vec<Food>,
    index: AHashMap<FoodId, usize>,
    next_id: u32,
}

impl FoodSupply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a food item at an explicit position
    pub fn insert(&mut self, position: Vec2, size: f32) -> FoodId {
        let id = FoodId(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.items.len());
        self.items.push(Food { id, position, size });
        id
    }

    /// Place a food item at a random position outside every obstacle
    pub fn spawn_random(
        &mut self,
        arena: &Arena,
        obstacles: &[Obstacle],
        config: &SimulationConfig,
        rng: &mut impl Rng,
    ) -> FoodId {
        let mut position = arena.random_point(rng);
        for _ in 0..PLACEMENT_ATTEMPTS {
            if !obstacle::is_blocked(obstacles, position, 0.0) {
                break;
            }
            position = arena.random_point(rng);
        }
        let size = rng.gen_range(config.food_size_min..=config.food_size_max) as f32;
        self.insert(position, size)
    }

    /// Get a food item by id; `None` once it has been eaten
    pub fn get(&self, id: FoodId) -> Option<&Food> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: FoodId) -> bool {
        self.index.contains_key(&id)
    }

    /// Remove a food item
    pub fn remove(&mut self, id: FoodId) -> Option<Food> {
        let i = self.index.remove(&id)?;
        let food = self.items.swap_remove(i);
        if let Some(moved) = self.items.get(i) {
            self.index.insert(moved.id, i);
        }
        Some(food)
    }

    /// Closest food to `from` by Euclidean distance (first wins on ties)
    pub fn nearest(&self, from: Vec2) -> Option<&Food> {
        self.items
            .iter()
            .min_by_key(|f| OrderedFloat(from.distance(&f.position)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Food> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

//! Static obstacles
//!
//! Obstacles are axis-aligned squares (`position` is the min corner). They
//! are created at world init and never change; they only constrain movement
//! and food placement.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::Vec2;
use crate::world::arena::Arena;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec2,
    pub size: f32,
}

impl Obstacle {
    pub fn new(position: Vec2, size: f32) -> Self {
        Self { position, size }
    }

    /// Random square fully inside the arena
    pub fn random(arena: &Arena, config: &SimulationConfig, rng: &mut impl Rng) -> Self {
        let size = rng.gen_range(config.obstacle_size_min..=config.obstacle_size_max) as f32;
        let x = rng.gen_range(0.0..(arena.width - size).max(f32::EPSILON));
        let y = rng.gen_range(0.0..(arena.height - size).max(f32::EPSILON));
        Self::new(Vec2::new(x, y), size)
    }

    /// Point lies on or inside the square
    pub fn contains(&self, point: Vec2) -> bool {
        self.blocks(point, 0.0)
    }

    /// Point lies inside the square inflated by `margin` on every side.
    /// Movement uses the mover's own size as the margin.
    pub fn blocks(&self, point: Vec2, margin: f32) -> bool {
        let min = self.position;
        let max = self.position + Vec2::new(self.size, self.size);
        (min.x - margin..=max.x + margin).contains(&point.x)
            && (min.y - margin..=max.y + margin).contains(&point.y)
    }
}

/// Whether any obstacle blocks a body of radius `margin` at `point`
pub fn is_blocked(obstacles: &[Obstacle], point: Vec2, margin: f32) -> bool {
    obstacles.iter().any(|o| o.blocks(point, margin))
}

//! Arena bounds
//!
//! Whether the arena is toroidal or walled is a configuration choice
//! (`BoundsMode`); every move passes its candidate through `apply_bounds`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{BoundsMode, SimulationConfig};
use crate::core::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub bounds: BoundsMode,
}

impl Arena {
    pub fn new(width: f32, height: f32, bounds: BoundsMode) -> Self {
        Self {
            width,
            height,
            bounds,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.width, config.height, config.bounds)
    }

    /// Map a candidate position back into the arena
    pub fn apply_bounds(&self, pos: Vec2) -> Vec2 {
        match self.bounds {
            BoundsMode::Wrap => Vec2::new(wrap(pos.x, self.width), wrap(pos.y, self.height)),
            BoundsMode::Clamp => Vec2::new(
                pos.x.clamp(0.0, self.width),
                pos.y.clamp(0.0, self.height),
            ),
        }
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        let in_axis = |v: f32, extent: f32| match self.bounds {
            BoundsMode::Wrap => (0.0..extent).contains(&v),
            BoundsMode::Clamp => (0.0..=extent).contains(&v),
        };
        in_axis(pos.x, self.width) && in_axis(pos.y, self.height)
    }

    /// Uniform point strictly inside the arena
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(rng.gen_range(0.0..self.width), rng.gen_range(0.0..self.height))
    }
}

/// Euclidean modulo into `[0, extent)`. `rem_euclid` can round tiny
/// negative inputs up to exactly `extent`, which folds back to zero.
fn wrap(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

//! Genetic traits - the heritable parameter set of an organism
//!
//! Traits are fixed for an organism's whole life. Offspring receive a
//! mutated copy: a guaranteed color shift plus a nudge to exactly one of
//! the numeric traits.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::Rgb;

/// Heritable traits of an organism
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticTraits {
    /// Distance covered per step (> 0)
    pub speed: f32,
    /// Maximum body size (>= 1)
    pub size_limit: u32,
    /// Meals needed before a decision is requested or a suggested
    /// reproduction is honored (>= 1)
    pub reproduction_threshold: u32,
    pub color: Rgb,
}

/// The numeric trait a mutation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutatedTrait {
    Speed,
    SizeLimit,
    ReproductionThreshold,
}

impl GeneticTraits {
    /// Draw traits for a seeded organism from the configured ranges
    pub fn random(color: Rgb, config: &SimulationConfig, rng: &mut impl Rng) -> Self {
        Self {
            speed: rng.gen_range(config.speed_min..=config.speed_max),
            size_limit: rng.gen_range(config.size_limit_min..=config.size_limit_max),
            reproduction_threshold: rng.gen_range(1..=config.reproduction_food_threshold),
            color,
        }
    }

    /// Derive a child's traits
    ///
    /// `current_color` is the parent's color right now, which can differ from
    /// its inherited `self.color` after a recolor decision. The child's color
    /// is re-rolled around `current_color` until it differs from both.
    pub fn mutate(
        &self,
        current_color: Rgb,
        config: &SimulationConfig,
        rng: &mut impl Rng,
    ) -> (Self, MutatedTrait) {
        let mut child = self.clone();

        let mut color = current_color;
        while color == current_color || color == self.color {
            color = current_color.perturbed(config.color_mutation, rng);
        }
        child.color = color;

        let mutated = match rng.gen_range(0..3) {
            0 => {
                child.speed = mutate_speed(self.speed, config, rng);
                MutatedTrait::Speed
            }
            1 => {
                child.size_limit =
                    mutate_count(self.size_limit, config.size_limit_mutation, rng);
                MutatedTrait::SizeLimit
            }
            _ => {
                child.reproduction_threshold =
                    mutate_count(self.reproduction_threshold, config.threshold_mutation, rng);
                MutatedTrait::ReproductionThreshold
            }
        };

        (child, mutated)
    }
}

/// Nudge speed by a non-zero delta; if the floor swallows the change the
/// delta is applied upward instead so the trait always moves.
fn mutate_speed(speed: f32, config: &SimulationConfig, rng: &mut impl Rng) -> f32 {
    let mut delta = 0.0;
    while delta == 0.0 {
        delta = rng.gen_range(-config.speed_mutation..=config.speed_mutation);
    }

    let candidate = (speed + delta).max(config.min_speed);
    if candidate == speed {
        speed + delta.abs()
    } else {
        candidate
    }
}

/// Integer counterpart of `mutate_speed`, floored at 1
fn mutate_count(value: u32, max_delta: i32, rng: &mut impl Rng) -> u32 {
    let max_delta = max_delta.max(1);
    let mut delta = 0;
    while delta == 0 {
        delta = rng.gen_range(-max_delta..=max_delta);
    }

    let candidate = (value as i64 + delta as i64).max(1) as u32;
    if candidate == value {
        value + delta.unsigned_abs()
    } else {
        candidate
    }
}

//! Organism - the autonomous agent of the simulation
//!
//! An organism owns its own mutable state (energy, size, age, target, wander
//! plan) and enforces its invariants at every mutation site:
//! `1 <= size <= traits.size_limit`, `0 <= energy <= max_energy`.
//! Membership in the population is owned by the `World`, never by the
//! organism itself.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{Direction, FoodId, OrganismId, Rgb, Tick, Vec2};
use crate::genetics::GeneticTraits;

/// What an organism is currently pursuing
///
/// Targets are ids into collections the organism does not own, so they can
/// go stale at any time and must be looked up again before every use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    #[default]
    None,
    Food(FoodId),
    Mate(OrganismId),
}

/// Persistent random-walk plan used when there is nothing to pursue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wander {
    pub direction: Direction,
    pub steps_left: u32,
}

impl Wander {
    pub fn random(config: &SimulationConfig, rng: &mut impl Rng) -> Self {
        Self {
            direction: Direction::random(rng),
            steps_left: rng.gen_range(config.wander_steps_min..=config.wander_steps_max),
        }
    }
}

/// Why an organism left the population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    OldAge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    pub position: Vec2,
    pub size: f32,
    /// Current color; starts as `traits.color`, can drift via recolor decisions
    pub color: Rgb,
    pub traits: GeneticTraits,
    /// Age in evolution periods
    pub age: u32,
    pub lifespan: u32,
    pub food_eaten: u32,
    pub energy: f32,
    pub reproductions: u32,
    pub mating_cooldown: u32,
    pub target: Target,
    pub wander: Wander,
    /// A decision request is in flight for this organism
    pub evolving: bool,
    /// Decision text delivered by the bridge, applied at the next evolution period
    pub pending_decision: Option<String>,
    pub birth_tick: Tick,
    last_position: Vec2,
    stuck_count: u32,
}

impl Organism {
    /// Create an organism with full energy and a freshly drawn lifespan
    pub fn new(
        position: Vec2,
        size: f32,
        traits: GeneticTraits,
        config: &SimulationConfig,
        rng: &mut impl Rng,
        birth_tick: Tick,
    ) -> Self {
        let size = size.clamp(1.0, traits.size_limit as f32);
        Self {
            id: OrganismId::new(),
            position,
            size,
            color: traits.color,
            lifespan: rng.gen_range(config.lifespan_min..=config.lifespan_max),
            traits,
            age: 0,
            food_eaten: 0,
            energy: config.max_energy,
            reproductions: 0,
            mating_cooldown: 0,
            target: Target::None,
            wander: Wander::random(config, rng),
            evolving: false,
            pending_decision: None,
            birth_tick,
            last_position: position,
            stuck_count: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.death_cause().is_none()
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        if self.energy <= 0.0 {
            Some(DeathCause::Starvation)
        } else if self.age > self.lifespan {
            Some(DeathCause::OldAge)
        } else {
            None
        }
    }

    pub fn size_limit(&self) -> f32 {
        self.traits.size_limit as f32
    }

    /// Circles overlap: center distance strictly below the sum of radii
    pub fn collides_with(&self, position: Vec2, size: f32) -> bool {
        self.position.distance(&position) < self.size + size
    }

    /// Old enough, off cooldown, and alive
    pub fn can_mate(&self, config: &SimulationConfig) -> bool {
        self.is_alive() && self.age >= config.min_mating_age && self.mating_cooldown == 0
    }

    pub fn needs_food(&self, config: &SimulationConfig) -> bool {
        self.energy < config.max_energy
    }

    pub fn spend_energy(&mut self, amount: f32) {
        self.energy = (self.energy - amount).max(0.0);
    }

    pub fn gain_energy(&mut self, amount: f32, config: &SimulationConfig) {
        self.energy = (self.energy + amount).clamp(0.0, config.max_energy);
    }

    pub fn grow(&mut self, amount: f32) {
        self.size = (self.size + amount).clamp(1.0, self.size_limit());
    }

    pub fn shrink(&mut self, amount: f32) {
        self.size = (self.size - amount).clamp(1.0, self.size_limit());
    }

    /// Eat one food item. Only a hungry organism benefits; returns whether it did.
    pub fn eat(&mut self, config: &SimulationConfig) -> bool {
        if !self.needs_food(config) {
            return false;
        }
        self.grow(1.0);
        self.food_eaten += 1;
        self.gain_energy(config.energy_gain, config);
        true
    }

    /// One evolution period passes: age and grow evenly toward the size limit
    pub fn age_one_period(&mut self) {
        self.age += 1;
        let per_period = (self.size_limit() - 1.0) / self.lifespan.max(1) as f32;
        self.grow(per_period);
    }

    pub fn tick_cooldown(&mut self) {
        self.mating_cooldown = self.mating_cooldown.saturating_sub(1);
    }

    /// Stuck detection: after enough ticks without any displacement the
    /// wander plan is redrawn so the organism stops pushing into a wall.
    pub fn track_progress(&mut self, config: &SimulationConfig, rng: &mut impl Rng) {
        if self.position == self.last_position {
            self.stuck_count += 1;
            if self.stuck_count > config.stuck_threshold {
                self.wander = Wander::random(config, rng);
                self.stuck_count = 0;
            }
        } else {
            self.last_position = self.position;
            self.stuck_count = 0;
        }
    }

    pub fn stuck_count(&self) -> u32 {
        self.stuck_count
    }
}

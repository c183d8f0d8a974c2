//! World - owns the arena, the population, food and obstacles
//!
//! The world is the sole authority for population membership. Organisms
//! are stored in a `Vec` (stable iteration order) with an id index that is
//! rebuilt whenever membership changes.

pub mod arena;
pub mod food;
pub mod obstacle;

pub use arena::Arena;
pub use food::{Food, FoodSupply};
pub use obstacle::Obstacle;

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{FoodId, OrganismId, Rgb, Tick, Vec2};
use crate::entity::Organism;
use crate::genetics::GeneticTraits;
use crate::simulation::movement::MoveContext;

/// Color of organisms created by world seeding
pub const SEED_COLOR: Rgb = Rgb::new(0, 0, 255);

/// Attempts to find an unobstructed spawn point before giving up
const SPAWN_ATTEMPTS: usize = 100;

/// Running totals since the world was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LifetimeTotals {
    pub births: u64,
    pub deaths: u64,
    pub evictions: u64,
    pub meals: u64,
}

/// Snapshot of population health, for logging and observers
#[derive(Debug, Clone, Serialize)]
pub struct PopulationStats {
    pub tick: Tick,
    pub population: usize,
    pub food: usize,
    pub mean_energy: f32,
    pub mean_size: f32,
    pub mean_speed: f32,
    pub awaiting_decisions: usize,
    pub totals: LifetimeTotals,
}

/// The simulation world
pub struct World {
    pub config: SimulationConfig,
    pub arena: Arena,
    pub(crate) organisms: Vec<Organism>,
    index: AHashMap<OrganismId, usize>,
    pub food: FoodSupply,
    pub obstacles: Vec<Obstacle>,
    /// Random number generator (deterministic for a given seed)
    pub rng: ChaCha8Rng,
    pub current_tick: Tick,
    pub totals: LifetimeTotals,
}

impl World {
    /// Empty world: no organisms, food or obstacles
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            arena: Arena::from_config(&config),
            config,
            organisms: Vec::new(),
            index: AHashMap::new(),
            food: FoodSupply::new(),
            obstacles: Vec::new(),
            rng,
            current_tick: 0,
            totals: LifetimeTotals::default(),
        })
    }

    /// World populated from the config: obstacles first, then organisms and
    /// food placed around them
    pub fn seeded(config: SimulationConfig) -> Result<Self> {
        let mut world = Self::new(config)?;

        for _ in 0..world.config.obstacle_count {
            let obstacle = Obstacle::random(&world.arena, &world.config, &mut world.rng);
            world.obstacles.push(obstacle);
        }

        for _ in 0..world.config.initial_population {
            let position = world.random_open_position(1.0);
            world.spawn_organism(position);
        }

        for _ in 0..world.config.food_count {
            world.spawn_food();
        }

        tracing::info!(
            organisms = world.population(),
            food = world.food.len(),
            obstacles = world.obstacles.len(),
            "world seeded"
        );

        Ok(world)
    }

    /// Spawn a seed organism with random traits
    pub fn spawn_organism(&mut self, position: Vec2) -> OrganismId {
        let traits = GeneticTraits::random(SEED_COLOR, &self.config, &mut self.rng);
        let organism = Organism::new(
            position,
            1.0,
            traits,
            &self.config,
            &mut self.rng,
            self.current_tick,
        );
        self.insert_organism(organism)
    }

    /// Add an already-built organism to the population
    pub fn insert_organism(&mut self, organism: Organism) -> OrganismId {
        let id = organism.id;
        self.index.insert(id, self.organisms.len());
        self.organisms.push(organism);
        id
    }

    /// Place one food item at a random obstacle-free position
    pub fn spawn_food(&mut self) -> FoodId {
        self.food
            .spawn_random(&self.arena, &self.obstacles, &self.config, &mut self.rng)
    }

    /// Random position where a body of radius `margin` is not blocked
    pub fn random_open_position(&mut self, margin: f32) -> Vec2 {
        let mut position = self.arena.random_point(&mut self.rng);
        for _ in 0..SPAWN_ATTEMPTS {
            if !obstacle::is_blocked(&self.obstacles, position, margin) {
                break;
            }
            position = self.arena.random_point(&mut self.rng);
        }
        position
    }

    pub fn organisms(&self) -> &[Organism] {
        &self.organisms
    }

    /// Mutable access to organism state; membership cannot change through this
    pub fn organisms_mut(&mut self) -> &mut [Organism] {
        &mut self.organisms
    }

    pub fn index_of(&self, id: OrganismId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.index_of(id).map(|i| &self.organisms[i])
    }

    pub fn organism_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.index_of(id).map(move |i| &mut self.organisms[i])
    }

    pub fn population(&self) -> usize {
        self.organisms.len()
    }

    /// Split borrows for passes that move organisms against the static
    /// surroundings while drawing from the shared rng
    pub(crate) fn movement_parts(&mut self) -> (&mut [Organism], MoveContext<'_>, &mut ChaCha8Rng) {
        let ctx = MoveContext::new(&self.arena, &self.obstacles, &self.config);
        (self.organisms.as_mut_slice(), ctx, &mut self.rng)
    }

    /// Replace the whole population (used by removal/append passes)
    pub(crate) fn replace_population(&mut self, organisms: Vec<Organism>) {
        self.organisms = organisms;
        self.rebuild_index();
    }

    pub(crate) fn take_population(&mut self) -> Vec<Organism> {
        self.index.clear();
        std::mem::take(&mut self.organisms)
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, organism) in self.organisms.iter().enumerate() {
            self.index.insert(organism.id, i);
        }
    }

    pub fn tick(&mut self) {
        self.current_tick += 1;
    }

    pub fn stats(&self) -> PopulationStats {
        let n = self.organisms.len();
        let mean = |f: fn(&Organism) -> f32| {
            if n == 0 {
                0.0
            } else {
                self.organisms.iter().map(f).sum::<f32>() / n as f32
            }
        };

        PopulationStats {
            tick: self.current_tick,
            population: n,
            food: self.food.len(),
            mean_energy: mean(|o| o.energy),
            mean_size: mean(|o| o.size),
            mean_speed: mean(|o| o.traits.speed),
            awaiting_decisions: self.organisms.iter().filter(|o| o.evolving).count(),
            totals: self.totals,
        }
    }
}

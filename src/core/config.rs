//! Simulation configuration with documented constants
//!
//! Every number the engine uses is injected from here. Nothing in the
//! simulation computes its own tuning; the world is seeded from a
//! `SimulationConfig` and carries it for the whole run.

use crate::core::error::{EvoError, Result};
use serde::{Deserialize, Serialize};

/// How positions behave at the arena edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsMode {
    /// Toroidal arena: leaving one edge re-enters from the opposite edge.
    /// Positions live in `[0, extent)`.
    Wrap,
    /// Walled arena: positions are clamped into `[0, extent]`.
    Clamp,
}

/// Which organisms lose out when births push the population past the cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Excess newborns from this tick are discarded; existing organisms stay.
    RejectNewborns,
    /// The oldest organisms (highest age) are removed first.
    OldestFirst,
    /// Organisms are removed uniformly at random.
    Random,
}

/// Configuration for the simulation systems
///
/// The defaults reproduce the reference tuning: a 800x600 toroidal arena,
/// 20 starting organisms, 480 food items and 20 obstacles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === ARENA ===
    pub width: f32,
    pub height: f32,
    pub bounds: BoundsMode,

    /// Seed for the world rng. `None` draws a seed from entropy.
    pub seed: Option<u64>,

    // === POPULATION ===
    pub initial_population: usize,

    /// Hard cap on the number of living organisms
    pub population_limit: usize,

    pub eviction: EvictionPolicy,

    // === FOOD & OBSTACLES ===
    pub food_count: usize,
    pub food_size_min: u32,
    pub food_size_max: u32,
    pub obstacle_count: usize,
    pub obstacle_size_min: u32,
    pub obstacle_size_max: u32,

    // === ENERGY ===
    /// Starting energy, also the ceiling energy can never exceed
    pub max_energy: f32,

    /// Energy restored per meal (clamped to `max_energy`)
    pub energy_gain: f32,

    /// Energy spent per undirected move. Directed moves cost half of this,
    /// which is what makes foraging pay for itself.
    pub energy_cost: f32,

    // === SEEDED ORGANISMS ===
    pub speed_min: f32,
    pub speed_max: f32,
    pub size_limit_min: u32,
    pub size_limit_max: u32,

    /// Upper bound of the reproduction threshold drawn for seeded organisms
    pub reproduction_food_threshold: u32,

    pub lifespan_min: u32,
    pub lifespan_max: u32,

    // === REPRODUCTION ===
    /// Size and lifespan bonus granted to a parent on each successful birth
    pub reproduction_bonus: u32,

    /// Maximum births per organism
    pub reproduction_limit: u32,

    /// Ticks both partners wait after a mating collision
    pub mating_cooldown: u32,

    /// Age (in evolution periods) before an organism can seek a mate
    pub min_mating_age: u32,

    pub child_size: f32,

    /// Max random offset of a child spawned from a colliding pair
    pub child_offset: f32,

    // === MOVEMENT ===
    /// Retries allowed when a candidate position lands inside an obstacle
    pub move_attempts: u32,

    /// Consecutive ticks without moving before the wander plan is redrawn
    pub stuck_threshold: u32,

    pub wander_steps_min: u32,
    pub wander_steps_max: u32,

    /// Undirected moves shift each axis by `k * speed`, `k` in `-range..=range`
    pub random_step_range: i32,

    // === MUTATION ===
    pub color_mutation: i32,
    pub speed_mutation: f32,
    pub min_speed: f32,
    pub size_limit_mutation: i32,
    pub threshold_mutation: i32,

    // === CLOCK & DECISIONS ===
    pub tick_rate_hz: u32,

    /// Ticks between evolution periods (decision requests, decision
    /// application, aging). 150 ticks at 30 Hz is five seconds.
    pub evolution_period: u64,

    /// Upper bound on a single decision request, after which the organism
    /// receives an absent result
    pub decision_timeout_secs: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            bounds: BoundsMode::Wrap,
            seed: None,

            initial_population: 20,
            population_limit: 100,
            eviction: EvictionPolicy::RejectNewborns,

            food_count: 480,
            food_size_min: 3,
            food_size_max: 8,
            obstacle_count: 20,
            obstacle_size_min: 10,
            obstacle_size_max: 20,

            max_energy: 100.0,
            energy_gain: 10.0,
            energy_cost: 0.2,

            speed_min: 0.5,
            speed_max: 3.0,
            size_limit_min: 5,
            size_limit_max: 20,
            reproduction_food_threshold: 3,
            lifespan_min: 50,
            lifespan_max: 300,

            reproduction_bonus: 1,
            reproduction_limit: 10,
            mating_cooldown: 2,
            min_mating_age: 3,
            child_size: 1.0,
            child_offset: 2.0,

            move_attempts: 10,
            stuck_threshold: 5,
            wander_steps_min: 10,
            wander_steps_max: 50,
            random_step_range: 5,

            color_mutation: 50,
            speed_mutation: 0.3,
            min_speed: 0.1,
            size_limit_mutation: 2,
            threshold_mutation: 1,

            tick_rate_hz: 30,
            evolution_period: 150,
            decision_timeout_secs: 30,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document; missing keys keep defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(EvoError::InvalidConfig(format!(
                "arena must have positive extent, got {}x{}",
                self.width, self.height
            )));
        }

        if self.population_limit == 0 || self.initial_population > self.population_limit {
            return Err(EvoError::InvalidConfig(format!(
                "initial_population ({}) must be <= population_limit ({}), which must be positive",
                self.initial_population, self.population_limit
            )));
        }

        if self.max_energy <= 0.0 || self.energy_cost < 0.0 || self.energy_gain < 0.0 {
            return Err(EvoError::InvalidConfig(
                "max_energy must be positive, energy_cost and energy_gain non-negative".into(),
            ));
        }

        let ranges = [
            ("food_size", self.food_size_min, self.food_size_max),
            ("obstacle_size", self.obstacle_size_min, self.obstacle_size_max),
            ("size_limit", self.size_limit_min, self.size_limit_max),
            ("lifespan", self.lifespan_min, self.lifespan_max),
            ("wander_steps", self.wander_steps_min, self.wander_steps_max),
        ];
        for (name, min, max) in ranges {
            if min == 0 || min > max {
                return Err(EvoError::InvalidConfig(format!(
                    "{name} range must be positive and ordered, got {min}..={max}"
                )));
            }
        }

        if self.speed_min <= 0.0 || self.speed_min > self.speed_max {
            return Err(EvoError::InvalidConfig(format!(
                "speed range must be positive and ordered, got {}..{}",
                self.speed_min, self.speed_max
            )));
        }

        if self.obstacle_size_max as f32 >= self.width.min(self.height) {
            return Err(EvoError::InvalidConfig(
                "obstacles must fit inside the arena".into(),
            ));
        }

        if self.reproduction_food_threshold == 0 {
            return Err(EvoError::InvalidConfig(
                "reproduction_food_threshold must be positive".into(),
            ));
        }

        if self.child_size < 1.0 || self.child_size > self.size_limit_min as f32 {
            return Err(EvoError::InvalidConfig(format!(
                "child_size ({}) must lie within [1, size_limit_min]",
                self.child_size
            )));
        }

        if self.min_speed <= 0.0 || self.color_mutation <= 0 {
            return Err(EvoError::InvalidConfig(
                "min_speed and color_mutation must be positive".into(),
            ));
        }

        if self.speed_mutation <= 0.0 {
            return Err(EvoError::InvalidConfig(format!(
                "speed_mutation must be positive, got {}",
                self.speed_mutation
            )));
        }

        if self.child_offset < 0.0 || self.random_step_range < 0 {
            return Err(EvoError::InvalidConfig(format!(
                "child_offset ({}) and random_step_range ({}) must be non-negative",
                self.child_offset, self.random_step_range
            )));
        }

        if self.tick_rate_hz == 0 || self.evolution_period == 0 || self.decision_timeout_secs == 0 {
            return Err(EvoError::InvalidConfig(
                "tick_rate_hz, evolution_period and decision_timeout_secs must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Wall-clock duration of one tick
    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64)
    }

    /// How long a decision request may run before it counts as failed
    pub fn decision_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.decision_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            width = 400.0
            bounds = "clamp"
            eviction = "oldest_first"
            seed = 99
            "#,
        )
        .unwrap();

        assert_eq!(config.width, 400.0);
        assert_eq!(config.height, 600.0);
        assert_eq!(config.bounds, BoundsMode::Clamp);
        assert_eq!(config.eviction, EvictionPolicy::OldestFirst);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.population_limit, 100);
    }

    #[test]
    fn test_invalid_population_rejected() {
        let config = SimulationConfig {
            initial_population: 200,
            population_limit: 100,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(EvoError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = SimulationConfig {
            lifespan_min: 300,
            lifespan_max: 50,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_child_offset_rejected() {
        let config = SimulationConfig {
            child_offset: -1.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(EvoError::InvalidConfig(_))));

        let config = SimulationConfig {
            child_offset: 0.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_speed_mutation_rejected() {
        for speed_mutation in [0.0, -0.3] {
            let config = SimulationConfig {
                speed_mutation,
                ..SimulationConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(EvoError::InvalidConfig(_))),
                "speed_mutation {speed_mutation} accepted"
            );
        }
    }

    #[test]
    fn test_invalid_random_step_range_rejected() {
        let config = SimulationConfig {
            random_step_range: -5,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(EvoError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml_is_config_parse_error() {
        let result = SimulationConfig::from_toml_str("width = \"wide\"");
        assert!(matches!(result, Err(EvoError::ConfigParse(_))));
    }

    #[test]
    fn test_tick_duration() {
        let config = SimulationConfig::default();
        let d = config.tick_duration();
        assert!((d.as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    }
}

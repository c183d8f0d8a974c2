//! Gather organism context for decision prompts
//!
//! A `DecisionContext` is an owned snapshot taken on the simulation thread,
//! so it can be moved to a request task without touching the world again.

use serde::Serialize;

use crate::core::types::{OrganismId, Rgb, Tick, Vec2};
use crate::entity::Organism;
use crate::genetics::GeneticTraits;
use crate::world::World;

/// Organism state at the moment a decision was requested
#[derive(Debug, Clone, Serialize)]
pub struct OrganismSnapshot {
    pub id: OrganismId,
    pub position: Vec2,
    pub size: f32,
    pub color: Rgb,
    pub age: u32,
    pub lifespan: u32,
    pub energy: f32,
    pub food_eaten: u32,
    pub traits: GeneticTraits,
}

impl From<&Organism> for OrganismSnapshot {
    fn from(organism: &Organism) -> Self {
        Self {
            id: organism.id,
            position: organism.position,
            size: organism.size,
            color: organism.color,
            age: organism.age,
            lifespan: organism.lifespan,
            energy: organism.energy,
            food_eaten: organism.food_eaten,
            traits: organism.traits.clone(),
        }
    }
}

/// Everything a decision source gets to see
#[derive(Debug, Clone, Serialize)]
pub struct DecisionContext {
    pub tick: Tick,
    pub organism: OrganismSnapshot,
    /// Position of the closest food item, if any food exists
    pub nearest_food: Option<Vec2>,
}

impl DecisionContext {
    pub fn capture(organism: &Organism, world: &World) -> Self {
        Self {
            tick: world.current_tick,
            organism: OrganismSnapshot::from(organism),
            nearest_food: world.food.nearest(organism.position).map(|f| f.position),
        }
    }

    /// One-line description of the organism
    pub fn summary(&self) -> String {
        let o = &self.organism;
        let food = match self.nearest_food {
            Some(p) => format!("({:.0}, {:.0})", p.x, p.y),
            None => "none".to_string(),
        };
        format!(
            "Organism: size={:.1}, color={}, position=({:.0}, {:.0}), age={}, lifespan={}, \
             energy={:.1}, food_eaten={}, food_position={}, genetic_traits={{speed: {:.2}, \
             size_limit: {}, reproduction_threshold: {}}}",
            o.size,
            o.color,
            o.position.x,
            o.position.y,
            o.age,
            o.lifespan,
            o.energy,
            o.food_eaten,
            food,
            o.traits.speed,
            o.traits.size_limit,
            o.traits.reproduction_threshold,
        )
    }

    /// Full user prompt sent to the model
    pub fn prompt(&self) -> String {
        format!(
            "Simulate the next step in the evolution of this organism:\n{}\n\
             Choose the action you think is most beneficial to the organism in its \
             environment: grow, shrink, change color, reproduce, move up, move down, \
             move left, move right, move towards food.",
            self.summary()
        )
    }

    #[cfg(test)]
    pub(crate) fn sample() -> Self {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let config = crate::core::config::SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let traits = GeneticTraits {
            speed: 1.5,
            size_limit: 12,
            reproduction_threshold: 2,
            color: Rgb::new(0, 0, 255),
        };
        let organism = Organism::new(Vec2::new(10.0, 20.0), 3.0, traits, &config, &mut rng, 0);
        Self {
            tick: 150,
            organism: OrganismSnapshot::from(&organism),
            nearest_food: Some(Vec2::new(40.0, 25.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    #[test]
    fn test_prompt_lists_every_action() {
        let prompt = DecisionContext::sample().prompt();
        for action in [
            "grow",
            "shrink",
            "change color",
            "reproduce",
            "move up",
            "move down",
            "move left",
            "move right",
            "move towards food",
        ] {
            assert!(prompt.contains(action), "missing {action}");
        }
        assert!(prompt.contains("food_position=(40, 25)"));
    }

    #[test]
    fn test_capture_from_world() {
        let mut world = World::new(SimulationConfig {
            seed: Some(9),
            ..SimulationConfig::default()
        })
        .unwrap();
        world.food.insert(Vec2::new(60.0, 60.0), 4.0);
        world.food.insert(Vec2::new(15.0, 10.0), 4.0);
        let id = world.spawn_organism(Vec2::new(10.0, 10.0));

        let context = DecisionContext::capture(world.organism(id).unwrap(), &world);
        assert_eq!(context.organism.id, id);
        assert_eq!(context.nearest_food, Some(Vec2::new(15.0, 10.0)));
        assert!(context.summary().contains("food_position=(15, 10)"));
    }

    #[test]
    fn test_summary_without_food() {
        let mut context = DecisionContext::sample();
        context.nearest_food = None;
        assert!(context.summary().contains("food_position=none"));
    }
}

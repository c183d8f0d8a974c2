//! Integration tests for the tick loop
//!
//! These tests run whole simulations and check what must hold after every
//! tick, plus the two scenarios everything else builds on:
//! - a hungry organism reaching and eating food
//! - a mating collision producing exactly one child

use std::collections::HashSet;

use evo_arena::core::config::{BoundsMode, SimulationConfig};
use evo_arena::core::types::Vec2;
use evo_arena::entity::Target;
use evo_arena::simulation::{Simulation, SimulationEvent};
use evo_arena::world::World;

fn seeded(seed: u64) -> SimulationConfig {
    SimulationConfig {
        seed: Some(seed),
        ..SimulationConfig::default()
    }
}

fn assert_invariants(world: &World) {
    let config = &world.config;
    assert!(world.population() <= config.population_limit);
    assert_eq!(world.food.len(), config.food_count, "food is always replaced");

    let mut ids = HashSet::new();
    for organism in world.organisms() {
        assert!(ids.insert(organism.id), "duplicate id {}", organism.id);
        assert!(organism.size >= 1.0 && organism.size <= organism.size_limit());
        assert!(organism.energy >= 0.0 && organism.energy <= config.max_energy);
        assert!(world.arena.contains(organism.position), "{:?}", organism.position);
        assert!(organism.mating_cooldown <= config.mating_cooldown);
        assert!(organism.reproductions <= config.reproduction_limit);
        assert!(
            organism.age <= organism.lifespan,
            "age {} past lifespan {} still in population",
            organism.age,
            organism.lifespan
        );
        assert!(organism.is_alive());
    }
}

#[test]
fn test_invariants_hold_every_tick() {
    for bounds in [BoundsMode::Wrap, BoundsMode::Clamp] {
        let config = SimulationConfig {
            bounds,
            evolution_period: 20,
            ..seeded(7)
        };
        let mut sim = Simulation::new(World::seeded(config).unwrap());

        for _ in 0..600 {
            sim.step();
            assert_invariants(&sim.world);
        }
    }
}

#[test]
fn test_invariants_hold_while_organisms_age_out() {
    for bounds in [BoundsMode::Wrap, BoundsMode::Clamp] {
        let config = SimulationConfig {
            bounds,
            lifespan_min: 2,
            lifespan_max: 4,
            min_mating_age: 1,
            evolution_period: 5,
            ..seeded(19)
        };
        let mut sim = Simulation::new(World::seeded(config).unwrap());
        let mut old_age_deaths = 0;

        for _ in 0..600 {
            let events = sim.step();
            old_age_deaths += events
                .iter()
                .filter(|e| matches!(
                    e,
                    SimulationEvent::Died { cause: evo_arena::entity::DeathCause::OldAge, .. }
                ))
                .count();
            assert_invariants(&sim.world);
        }

        assert!(old_age_deaths > 0, "lifespans this short must expire");
    }
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed| {
        let mut sim = Simulation::new(World::seeded(seeded(seed)).unwrap());
        sim.run_for(400);
        sim.world
            .organisms()
            .iter()
            .map(|o| (o.position, o.size, o.energy, o.color))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(31), run(31));
}

#[test]
fn test_hungry_organism_finds_and_eats_food() {
    let config = SimulationConfig {
        food_count: 1,
        obstacle_count: 0,
        ..seeded(3)
    };
    let mut world = World::new(config).unwrap();
    let food = world.food.insert(Vec2::new(60.0, 40.0), 5.0);
    let id = world.spawn_organism(Vec2::new(40.0, 40.0));
    world.organism_mut(id).unwrap().energy = 50.0;
    let mut sim = Simulation::new(world);

    let mut eaten = None;
    for _ in 0..100 {
        for event in sim.step() {
            if let SimulationEvent::Ate {
                organism,
                food: f,
                replacement,
                benefited,
                ..
            } = event
            {
                assert_eq!(organism, id);
                assert_eq!(f, food);
                assert!(benefited);
                eaten = Some(replacement);
            }
        }
        if eaten.is_some() {
            break;
        }
    }

    let replacement = eaten.expect("organism never reached the food");
    assert!(!sim.world.food.contains(food));
    assert!(sim.world.food.contains(replacement));
    assert_eq!(sim.world.food.len(), 1);

    let organism = sim.world.organism(id).unwrap();
    assert_eq!(organism.food_eaten, 1);
    assert_eq!(organism.target, Target::None);
    assert!(organism.energy > 50.0);
}

#[test]
fn test_collision_produces_one_child() {
    let config = SimulationConfig {
        food_count: 0,
        obstacle_count: 0,
        ..seeded(5)
    };
    let mut world = World::new(config).unwrap();
    let a = world.spawn_organism(Vec2::new(100.0, 100.0));
    let b = world.spawn_organism(Vec2::new(102.0, 100.0));
    let limit = world.config.reproduction_limit;
    for id in [a, b] {
        let organism = world.organism_mut(id).unwrap();
        organism.age = 3;
        organism.size = organism.size_limit();
    }
    world.organism_mut(a).unwrap().reproductions = limit - 1;
    world.organism_mut(b).unwrap().reproductions = limit;
    let mut sim = Simulation::new(world);

    let mut births = Vec::new();
    for _ in 0..20 {
        for event in sim.step() {
            if let SimulationEvent::Born { parent, partner, .. } = event {
                births.push((parent, partner));
            }
        }
    }

    assert_eq!(births, vec![(a, Some(b))]);
    assert_eq!(sim.world.population(), 3);
    assert_eq!(sim.world.organism(a).unwrap().reproductions, limit);
    assert_eq!(sim.world.totals.births, 1);
}

#[test]
fn test_default_world_runs_and_reports_stats() {
    let mut sim = Simulation::new(World::seeded(seeded(99)).unwrap());
    sim.run_for(300);

    let stats = sim.world.stats();
    assert_eq!(stats.tick, 300);
    assert_eq!(stats.population, sim.world.population());
    assert_eq!(stats.food, 480);
    assert!(stats.totals.meals > 0, "a default world always feeds someone");
    assert_eq!(
        stats.population as u64,
        20 + stats.totals.births - stats.totals.deaths - stats.totals.evictions
    );
}

//! Tick system - orchestrates one simulation step
//!
//! Phase order within `run_simulation_tick`:
//! 1. per organism: revalidate/select target, move, resolve mating collisions
//! 2. food consumption and replacement
//! 3. dead organisms removed
//! 4. buffered births appended, population cap enforced
//! 5. mating cooldowns decremented
//!
//! Births and deaths never change the population while it is being iterated;
//! both are collected and applied between phases. Draining external
//! decisions and the evolution period run after these phases (see `clock`).

use serde::Serialize;

use crate::core::types::{FoodId, OrganismId, Tick};
use crate::entity::{DeathCause, Target, Wander};
use crate::llm::parser::DecisionAction;
use crate::simulation::consumption::resolve_food_consumption;
use crate::simulation::movement::{move_directional, move_towards};
use crate::simulation::population::{admit_births, decrement_cooldowns, remove_dead, Birth};
use crate::simulation::reproduction::{reproduce, ReproductionTrigger};
use crate::simulation::targeting::resolve_target;
use crate::world::World;

/// Events generated during a simulation tick
///
/// Returned to the caller for logging and observers; the simulation itself
/// never reads them back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimulationEvent {
    Born {
        child: OrganismId,
        parent: OrganismId,
        /// Mating partner, for collision births
        partner: Option<OrganismId>,
        tick: Tick,
    },
    /// A birth was dropped because the population was full
    BirthRejected { parent: OrganismId, tick: Tick },
    Died {
        organism: OrganismId,
        cause: DeathCause,
        age: u32,
        tick: Tick,
    },
    Ate {
        organism: OrganismId,
        food: FoodId,
        replacement: FoodId,
        /// Whether the meal counted (only hungry organisms benefit)
        benefited: bool,
        tick: Tick,
    },
    Mated {
        organism: OrganismId,
        partner: OrganismId,
        offspring: bool,
        tick: Tick,
    },
    Evicted { organism: OrganismId, tick: Tick },
    DecisionRequested { organism: OrganismId, tick: Tick },
    DecisionReceived {
        organism: OrganismId,
        delivered: bool,
        tick: Tick,
    },
    DecisionApplied {
        organism: OrganismId,
        action: DecisionAction,
        tick: Tick,
    },
}

/// Run phases 1-5 and advance the tick counter
pub fn run_simulation_tick(world: &mut World) -> Vec<SimulationEvent> {
    let mut events = Vec::new();

    let births = update_organisms(world, &mut events);
    resolve_food_consumption(world, &mut events);
    remove_dead(world, &mut events);
    admit_births(world, births, &mut events);
    decrement_cooldowns(world);

    world.tick();
    events
}

/// Phase 1: every living organism picks a target and moves once
///
/// Returns the births produced by mating collisions, to be appended after
/// the iteration.
pub fn update_organisms(world: &mut World, events: &mut Vec<SimulationEvent>) -> Vec<Birth> {
    let mut births = Vec::new();

    for i in 0..world.organisms.len() {
        if !world.organisms[i].is_alive() {
            continue;
        }

        let target = resolve_target(&world.organisms[i], world);
        world.organisms[i].target = target;

        match target {
            Target::None => wander(world, i),
            Target::Food(food_id) => {
                if let Some(position) = world.food.get(food_id).map(|f| f.position) {
                    let (organisms, ctx, rng) = world.movement_parts();
                    move_towards(&mut organisms[i], position, &ctx, rng);
                }
            }
            Target::Mate(mate_id) => {
                if let Some(j) = world.index_of(mate_id) {
                    pursue_mate(world, i, j, &mut births, events);
                }
            }
        }
    }

    births
}

/// Follow the wander plan, redrawing it once exhausted
fn wander(world: &mut World, i: usize) {
    let (organisms, ctx, rng) = world.movement_parts();
    let organism = &mut organisms[i];

    if organism.wander.steps_left > 0 {
        let direction = organism.wander.direction;
        move_directional(organism, Some(direction), &ctx, rng);
        organism.wander.steps_left = organism.wander.steps_left.saturating_sub(1);
    } else {
        organism.wander = Wander::random(ctx.config, rng);
    }
}

fn pursue_mate(
    world: &mut World,
    i: usize,
    j: usize,
    births: &mut Vec<Birth>,
    events: &mut Vec<SimulationEvent>,
) {
    let tick = world.current_tick;
    let population = world.organisms.len() + births.len();
    let (organisms, ctx, rng) = world.movement_parts();

    let mate_position = organisms[j].position;
    move_towards(&mut organisms[i], mate_position, &ctx, rng);

    let (organism, mate) = pair_mut(organisms, i, j);
    if !organism.collides_with(mate.position, mate.size) {
        return;
    }

    let trigger = ReproductionTrigger::Collision { population };
    let child = reproduce(organism, trigger, &ctx, tick, rng);

    organism.mating_cooldown = ctx.config.mating_cooldown;
    mate.mating_cooldown = ctx.config.mating_cooldown;
    organism.target = Target::None;

    events.push(SimulationEvent::Mated {
        organism: organism.id,
        partner: mate.id,
        offspring: child.is_some(),
        tick,
    });

    if let Some(child) = child {
        births.push(Birth {
            child,
            parent: organism.id,
            partner: Some(mate.id),
        });
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Vec2;

    fn empty_world(config: SimulationConfig) -> World {
        World::new(SimulationConfig {
            seed: Some(11),
            ..config
        })
        .unwrap()
    }

    fn mature(world: &mut World, position: Vec2) -> usize {
        let id = world.spawn_organism(position);
        let i = world.index_of(id).unwrap();
        let organism = &mut world.organisms[i];
        organism.age = world.config.min_mating_age;
        organism.size = organism.size_limit();
        i
    }

    #[test]
    fn test_tick_advances_counter() {
        let mut world = empty_world(SimulationConfig::default());
        run_simulation_tick(&mut world);
        run_simulation_tick(&mut world);
        assert_eq!(world.current_tick, 2);
    }

    #[test]
    fn test_mating_collision_spawns_child_and_sets_cooldowns() {
        let mut world = empty_world(SimulationConfig::default());
        let a = mature(&mut world, Vec2::new(100.0, 100.0));
        let b = mature(&mut world, Vec2::new(101.0, 100.0));
        let (a_id, b_id) = (world.organisms[a].id, world.organisms[b].id);
        world.organisms[a].reproductions = world.config.reproduction_limit - 1;

        let mut events = Vec::new();
        let births = update_organisms(&mut world, &mut events);

        assert_eq!(births.len(), 1);
        assert_eq!(births[0].parent, a_id);
        assert_eq!(births[0].partner, Some(b_id));
        let cooldown = world.config.mating_cooldown;
        assert_eq!(world.organism(a_id).unwrap().mating_cooldown, cooldown);
        assert_eq!(world.organism(b_id).unwrap().mating_cooldown, cooldown);
        assert_eq!(world.organism(a_id).unwrap().target, Target::None);
        assert!(events.iter().any(|e| matches!(
            e,
            SimulationEvent::Mated { organism, offspring: true, .. } if *organism == a_id
        )));

        // Partner is now on cooldown, so it cannot mate back this tick
        assert_eq!(world.population(), 2, "births are buffered, not appended");
    }

    #[test]
    fn test_full_tick_appends_birth() {
        let mut world = empty_world(SimulationConfig::default());
        mature(&mut world, Vec2::new(100.0, 100.0));
        mature(&mut world, Vec2::new(101.0, 100.0));

        let events = run_simulation_tick(&mut world);

        assert_eq!(world.population(), 3);
        assert_eq!(world.totals.births, 1);
        assert!(events.iter().any(|e| matches!(e, SimulationEvent::Born { .. })));
        // Cooldowns were decremented once at the end of the tick
        let cooling = world
            .organisms()
            .iter()
            .filter(|o| o.mating_cooldown == world.config.mating_cooldown - 1)
            .count();
        assert_eq!(cooling, 2);
    }

    #[test]
    fn test_collision_at_cap_has_no_child() {
        let config = SimulationConfig {
            initial_population: 2,
            population_limit: 2,
            ..SimulationConfig::default()
        };
        let mut world = empty_world(config);
        mature(&mut world, Vec2::new(100.0, 100.0));
        mature(&mut world, Vec2::new(101.0, 100.0));

        let mut events = Vec::new();
        let births = update_organisms(&mut world, &mut events);

        assert!(births.is_empty());
        assert!(events.iter().any(|e| matches!(
            e,
            SimulationEvent::Mated { offspring: false, .. }
        )));
        for organism in world.organisms() {
            assert_eq!(organism.mating_cooldown, world.config.mating_cooldown);
        }
    }

    #[test]
    fn test_dead_organisms_do_not_act() {
        let mut world = empty_world(SimulationConfig::default());
        let id = world.spawn_organism(Vec2::new(50.0, 50.0));
        world.organism_mut(id).unwrap().energy = 0.0;

        let mut events = Vec::new();
        update_organisms(&mut world, &mut events);
        assert_eq!(world.organism(id).unwrap().position, Vec2::new(50.0, 50.0));
        assert_eq!(
            world.organism(id).unwrap().death_cause(),
            Some(DeathCause::Starvation)
        );

        run_simulation_tick(&mut world);
        assert!(world.organism(id).is_none());
    }

    #[test]
    fn test_wander_counts_down_then_redraws() {
        let mut world = empty_world(SimulationConfig::default());
        let id = world.spawn_organism(Vec2::new(300.0, 300.0));
        {
            let organism = world.organism_mut(id).unwrap();
            organism.wander = Wander {
                direction: crate::core::types::Direction::Right,
                steps_left: 1,
            };
        }
        let start = world.organism(id).unwrap().position;
        let speed = world.organism(id).unwrap().traits.speed;

        let mut events = Vec::new();
        update_organisms(&mut world, &mut events);
        let organism = world.organism(id).unwrap();
        assert_eq!(organism.position, Vec2::new(start.x + speed, start.y));
        assert_eq!(organism.wander.steps_left, 0);

        update_organisms(&mut world, &mut events);
        let organism = world.organism(id).unwrap();
        assert!(organism.wander.steps_left >= world.config.wander_steps_min);
        assert_eq!(organism.position.x, start.x + speed, "redraw tick does not move");
    }

    #[test]
    fn test_pair_mut_either_order() {
        let mut items = [1, 2, 3];
        let (a, b) = pair_mut(&mut items, 2, 0);
        std::mem::swap(a, b);
        assert_eq!(items, [3, 2, 1]);
    }
}

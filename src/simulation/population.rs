//! Population membership system
//!
//! The only place organisms enter or leave the population during a tick.
//! Removal and admission both rebuild the world's id index once per pass.

use std::cmp::Reverse;

use rand::seq::index;

use crate::core::config::EvictionPolicy;
use crate::core::types::OrganismId;
use crate::entity::Organism;
use crate::simulation::tick::SimulationEvent;
use crate::world::World;

/// An offspring waiting to be appended to the population
#[derive(Debug, Clone)]
pub struct Birth {
    pub child: Organism,
    pub parent: OrganismId,
    pub partner: Option<OrganismId>,
}

/// Remove every organism that starved or outlived its lifespan
/// Returns number of organisms removed
pub fn remove_dead(world: &mut World, events: &mut Vec<SimulationEvent>) -> usize {
    if world.organisms().iter().all(Organism::is_alive) {
        return 0;
    }

    let tick = world.current_tick;
    let (alive, dead): (Vec<_>, Vec<_>) = world
        .take_population()
        .into_iter()
        .partition(Organism::is_alive);
    world.replace_population(alive);

    for organism in &dead {
        if let Some(cause) = organism.death_cause() {
            tracing::debug!(organism = %organism.id, ?cause, age = organism.age, "organism died");
            events.push(SimulationEvent::Died {
                organism: organism.id,
                cause,
                age: organism.age,
                tick,
            });
        }
    }

    world.totals.deaths += dead.len() as u64;
    dead.len()
}

/// Append buffered births, then bring the population back under the cap
///
/// With `RejectNewborns` only as many births are admitted as there is room
/// for. The other policies admit every birth and then evict existing
/// members until the cap holds.
pub fn admit_births(world: &mut World, births: Vec<Birth>, events: &mut Vec<SimulationEvent>) {
    if births.is_empty() {
        return;
    }

    let tick = world.current_tick;
    let limit = world.config.population_limit;
    let room = match world.config.eviction {
        EvictionPolicy::RejectNewborns => limit.saturating_sub(world.population()),
        EvictionPolicy::OldestFirst | EvictionPolicy::Random => births.len(),
    };

    for (n, birth) in births.into_iter().enumerate() {
        if n >= room {
            events.push(SimulationEvent::BirthRejected {
                parent: birth.parent,
                tick,
            });
            continue;
        }
        events.push(SimulationEvent::Born {
            child: birth.child.id,
            parent: birth.parent,
            partner: birth.partner,
            tick,
        });
        world.insert_organism(birth.child);
        world.totals.births += 1;
    }

    enforce_cap(world, events);
}

/// Evict members per the configured policy until the population fits
/// Returns number of organisms evicted
pub fn enforce_cap(world: &mut World, events: &mut Vec<SimulationEvent>) -> usize {
    let limit = world.config.population_limit;
    let excess = world.population().saturating_sub(limit);
    if excess == 0 {
        return 0;
    }

    let victims: Vec<usize> = match world.config.eviction {
        EvictionPolicy::OldestFirst | EvictionPolicy::RejectNewborns => {
            let mut by_age: Vec<usize> = (0..world.population()).collect();
            // Stable sort keeps the earliest member first among equal ages
            by_age.sort_by_key(|&i| Reverse(world.organisms()[i].age));
            by_age.truncate(excess);
            by_age
        }
        EvictionPolicy::Random => {
            let population = world.population();
            index::sample(&mut world.rng, population, excess).into_vec()
        }
    };

    let tick = world.current_tick;
    let mut evict = vec![false; world.population()];
    for &i in &victims {
        evict[i] = true;
    }

    let mut kept = Vec::with_capacity(limit);
    for (i, organism) in world.take_population().into_iter().enumerate() {
        if evict[i] {
            tracing::debug!(organism = %organism.id, age = organism.age, "organism evicted");
            events.push(SimulationEvent::Evicted {
                organism: organism.id,
                tick,
            });
        } else {
            kept.push(organism);
        }
    }
    world.replace_population(kept);

    world.totals.evictions += excess as u64;
    excess
}

/// One tick of mating cooldown for everyone
pub fn decrement_cooldowns(world: &mut World) {
    for organism in world.organisms_mut() {
        organism.tick_cooldown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Vec2;

    fn world(limit: usize, eviction: EvictionPolicy) -> World {
        World::new(SimulationConfig {
            seed: Some(3),
            initial_population: 0,
            population_limit: limit,
            eviction,
            ..SimulationConfig::default()
        })
        .unwrap()
    }

    fn birth(world: &mut World, parent: OrganismId) -> Birth {
        // Build the child through the world so it gets seeded traits, then
        // take it back out of the population.
        let id = world.spawn_organism(Vec2::new(5.0, 5.0));
        let mut all = world.take_population();
        let i = all.iter().position(|o| o.id == id).unwrap();
        let child = all.remove(i);
        world.replace_population(all);
        Birth {
            child,
            parent,
            partner: None,
        }
    }

    #[test]
    fn test_remove_dead_reports_causes() {
        let mut world = world(10, EvictionPolicy::RejectNewborns);
        let starving = world.spawn_organism(Vec2::new(1.0, 1.0));
        let old = world.spawn_organism(Vec2::new(2.0, 2.0));
        let healthy = world.spawn_organism(Vec2::new(3.0, 3.0));
        world.organism_mut(starving).unwrap().energy = 0.0;
        {
            let o = world.organism_mut(old).unwrap();
            o.age = o.lifespan + 1;
        }

        let mut events = Vec::new();
        assert_eq!(remove_dead(&mut world, &mut events), 2);

        assert_eq!(world.population(), 1);
        assert!(world.organism(healthy).is_some());
        assert_eq!(world.index_of(healthy), Some(0));
        assert_eq!(world.totals.deaths, 2);
        assert!(events.iter().any(|e| matches!(
            e,
            SimulationEvent::Died { organism, cause: crate::entity::DeathCause::OldAge, .. }
                if *organism == old
        )));
    }

    #[test]
    fn test_reject_newborns_at_cap() {
        let mut world = world(3, EvictionPolicy::RejectNewborns);
        let parent = world.spawn_organism(Vec2::new(1.0, 1.0));
        world.spawn_organism(Vec2::new(2.0, 2.0));
        let births = vec![birth(&mut world, parent), birth(&mut world, parent)];

        let mut events = Vec::new();
        admit_births(&mut world, births, &mut events);

        assert_eq!(world.population(), 3);
        assert_eq!(world.totals.births, 1);
        assert_eq!(world.totals.evictions, 0);
        assert!(world.organism(parent).is_some());
        assert!(events
            .iter()
            .any(|e| matches!(e, SimulationEvent::BirthRejected { .. })));
    }

    #[test]
    fn test_oldest_first_evicts_elders() {
        let mut world = world(2, EvictionPolicy::OldestFirst);
        let elder = world.spawn_organism(Vec2::new(1.0, 1.0));
        let younger = world.spawn_organism(Vec2::new(2.0, 2.0));
        world.organism_mut(elder).unwrap().age = 9;
        world.organism_mut(younger).unwrap().age = 4;
        let births = vec![birth(&mut world, elder)];

        let mut events = Vec::new();
        admit_births(&mut world, births, &mut events);

        assert_eq!(world.population(), 2);
        assert!(world.organism(elder).is_none());
        assert!(world.organism(younger).is_some());
        assert_eq!(world.totals.evictions, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, SimulationEvent::Evicted { organism, .. } if *organism == elder)));
    }

    #[test]
    fn test_random_eviction_respects_cap() {
        let mut world = world(4, EvictionPolicy::Random);
        let parent = world.spawn_organism(Vec2::new(1.0, 1.0));
        for _ in 0..3 {
            world.spawn_organism(Vec2::new(2.0, 2.0));
        }
        let births = (0..3).map(|_| birth(&mut world, parent)).collect::<Vec<_>>();

        let mut events = Vec::new();
        admit_births(&mut world, births, &mut events);

        assert_eq!(world.population(), 4);
        assert_eq!(world.totals.evictions, 3);
        let evicted = events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::Evicted { .. }))
            .count();
        assert_eq!(evicted, 3);
    }

    #[test]
    fn test_cooldowns_never_underflow() {
        let mut world = world(10, EvictionPolicy::RejectNewborns);
        let a = world.spawn_organism(Vec2::new(1.0, 1.0));
        let b = world.spawn_organism(Vec2::new(2.0, 2.0));
        world.organism_mut(a).unwrap().mating_cooldown = 1;

        decrement_cooldowns(&mut world);
        decrement_cooldowns(&mut world);

        assert_eq!(world.organism(a).unwrap().mating_cooldown, 0);
        assert_eq!(world.organism(b).unwrap().mating_cooldown, 0);
    }
}

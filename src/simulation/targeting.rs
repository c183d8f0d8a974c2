//! Target selection - what an organism pursues next
//!
//! Pure policy over a read-only view of the world. Priority, strictly:
//! 1. hungry -> nearest food
//! 2. mature and off cooldown -> nearest eligible mate
//! 3. nothing (the caller falls back to the wander plan)

use ordered_float::OrderedFloat;

use crate::entity::{Organism, Target};
use crate::world::World;

/// Whether the organism's current target is still worth pursuing
///
/// Food must still exist and the organism must still be hungry. A mate
/// must still be alive and both parties must still be eligible to mate.
pub fn is_target_valid(organism: &Organism, world: &World) -> bool {
    let config = &world.config;
    match organism.target {
        Target::None => false,
        Target::Food(id) => world.food.contains(id) && organism.needs_food(config),
        Target::Mate(id) => {
            id != organism.id
                && organism.can_mate(config)
                && world
                    .organism(id)
                    .map(|mate| mate.can_mate(config))
                    .unwrap_or(false)
        }
    }
}

/// Keep a valid target, otherwise pick a new one
pub fn resolve_target(organism: &Organism, world: &World) -> Target {
    if is_target_valid(organism, world) {
        organism.target
    } else {
        select_target(organism, world)
    }
}

/// Choose a fresh target by priority
pub fn select_target(organism: &Organism, world: &World) -> Target {
    let config = &world.config;

    if organism.needs_food(config) {
        if let Some(food) = world.food.nearest(organism.position) {
            return Target::Food(food.id);
        }
    }

    if organism.can_mate(config) {
        let nearest_mate = world
            .organisms()
            .iter()
            .filter(|other| other.id != organism.id && other.can_mate(config))
            .min_by_key(|other| OrderedFloat(organism.position.distance(&other.position)));
        if let Some(mate) = nearest_mate {
            return Target::Mate(mate.id);
        }
    }

    Target::None
}

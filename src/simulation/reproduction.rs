//! Reproduction engine - spawns a mutated offspring from a qualifying parent
//!
//! Reproduction is only ever triggered from two places: a mating collision
//! (gated by cooldown and the population cap) or an externally suggested
//! decision (gated by accumulated food). This module checks the parent-side
//! gates and builds the child; the triggers own their own gates.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{Direction, Tick, Vec2};
use crate::entity::Organism;
use crate::simulation::movement::{self, MoveContext};

/// What caused a reproduction attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReproductionTrigger {
    /// Two eligible organisms collided. `population` counts the live
    /// population plus births already buffered this tick.
    Collision { population: usize },
    /// An external decision asked for it
    Decision,
}

/// Parent-side gates: big enough, births left, and room in the population
/// for collision-triggered births
pub fn can_reproduce(parent: &Organism, trigger: ReproductionTrigger, ctx: &MoveContext) -> bool {
    let config = ctx.config;
    let big_enough = parent.size >= parent.size_limit() / 2.0;
    let births_left = parent.reproductions < config.reproduction_limit;
    let room = match trigger {
        ReproductionTrigger::Collision { population } => population < config.population_limit,
        ReproductionTrigger::Decision => true,
    };
    big_enough && births_left && room
}

/// Attempt reproduction; returns the child on success
///
/// On success the parent grows and lives longer by the reproduction bonus,
/// resets its food counter, counts the birth and enters mating cooldown.
/// The child inherits mutated traits, starts small at (or, for a colliding
/// pair, near) the parent and immediately takes one random step.
pub fn reproduce(
    parent: &mut Organism,
    trigger: ReproductionTrigger,
    ctx: &MoveContext,
    tick: Tick,
    rng: &mut impl Rng,
) -> Option<Organism> {
    if !can_reproduce(parent, trigger, ctx) {
        return None;
    }

    let config = ctx.config;
    let bonus = config.reproduction_bonus;
    parent.grow(bonus as f32);
    parent.lifespan += bonus;
    parent.food_eaten = 0;
    parent.reproductions += 1;
    parent.mating_cooldown = config.mating_cooldown;

    let (traits, mutated) = parent.traits.mutate(parent.color, config, rng);

    let position = match trigger {
        ReproductionTrigger::Collision { .. } => {
            let spread = config.child_offset;
            let jitter = Vec2::new(
                rng.gen_range(-spread..=spread),
                rng.gen_range(-spread..=spread),
            );
            ctx.arena.apply_bounds(parent.position + jitter)
        }
        ReproductionTrigger::Decision => parent.position,
    };

    let mut child = Organism::new(position, config.child_size, traits, config, rng, tick);
    movement::move_directional(&mut child, Some(Direction::random(rng)), ctx, rng);

    tracing::debug!(
        parent = %parent.id,
        child = %child.id,
        ?mutated,
        color = %child.color,
        reproductions = parent.reproductions,
        "organism reproduced"
    );

    Some(child)
}

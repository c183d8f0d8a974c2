//! Movement engine - resolves a proposed step against obstacles and bounds
//!
//! Candidate positions that fall inside an obstacle (inflated by the mover's
//! own size) are retried within `config.move_attempts`. Undirected moves
//! retry with a fresh random direction; directed moves retry by halving the
//! step, then fall back to a random undirected move. An organism that finds
//! no free position stays put for the tick.

use rand::Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::{Direction, Vec2};
use crate::entity::Organism;
use crate::world::obstacle::{self, Obstacle};
use crate::world::Arena;

/// Read-only surroundings a move is resolved against
#[derive(Clone, Copy)]
pub struct MoveContext<'a> {
    pub arena: &'a Arena,
    pub obstacles: &'a [Obstacle],
    pub config: &'a SimulationConfig,
}

impl<'a> MoveContext<'a> {
    pub fn new(arena: &'a Arena, obstacles: &'a [Obstacle], config: &'a SimulationConfig) -> Self {
        Self {
            arena,
            obstacles,
            config,
        }
    }

    fn is_blocked(&self, raw: Vec2, radius: f32) -> bool {
        obstacle::is_blocked(self.obstacles, self.arena.apply_bounds(raw), radius)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Position changed and energy was spent
    Moved,
    /// Every candidate was blocked; position and energy unchanged
    Blocked,
    /// Already standing on the target point
    Arrived,
}

/// Step `speed` along `direction`, or a random jump when `None`
pub fn move_directional(
    organism: &mut Organism,
    direction: Option<Direction>,
    ctx: &MoveContext,
    rng: &mut impl Rng,
) -> MoveOutcome {
    let config = ctx.config;
    let step = organism.traits.speed;
    let origin = organism.position;

    let mut candidate = origin + displacement(direction, step, config, rng);
    let mut attempts = 0;
    while ctx.is_blocked(candidate, organism.size) && attempts < config.move_attempts {
        candidate = origin + Direction::random(rng).unit() * step;
        attempts += 1;
    }

    let outcome = if ctx.is_blocked(candidate, organism.size) {
        MoveOutcome::Blocked
    } else {
        organism.position = ctx.arena.apply_bounds(candidate);
        organism.spend_energy(config.energy_cost);
        MoveOutcome::Moved
    };

    organism.track_progress(config, rng);
    outcome
}

/// Step toward `target`, at most `speed` and never past it
///
/// Directed movement costs half the undirected energy cost.
pub fn move_towards(
    organism: &mut Organism,
    target: Vec2,
    ctx: &MoveContext,
    rng: &mut impl Rng,
) -> MoveOutcome {
    let config = ctx.config;
    let origin = organism.position;
    let offset = target - origin;
    let distance = offset.length();
    if distance == 0.0 {
        return MoveOutcome::Arrived;
    }

    let step = organism.traits.speed.min(distance);
    let mut candidate = origin + offset.normalize() * step;
    let mut attempts = 0;
    while ctx.is_blocked(candidate, organism.size) && attempts < config.move_attempts {
        candidate = origin.midpoint(&candidate);
        if origin.distance(&candidate) < 1.0 {
            return move_directional(organism, Some(Direction::random(rng)), ctx, rng);
        }
        attempts += 1;
    }

    let outcome = if ctx.is_blocked(candidate, organism.size) {
        MoveOutcome::Blocked
    } else {
        organism.position = ctx.arena.apply_bounds(candidate);
        organism.spend_energy(config.energy_cost / 2.0);
        MoveOutcome::Moved
    };

    organism.track_progress(config, rng);
    outcome
}

fn displacement(
    direction: Option<Direction>,
    step: f32,
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Vec2 {
    match direction {
        Some(dir) => dir.unit() * step,
        None => {
            let range = config.random_step_range;
            Vec2::new(
                rng.gen_range(-range..=range) as f32 * step,
                rng.gen_range(-range..=range) as f32 * step,
            )
        }
    }
}

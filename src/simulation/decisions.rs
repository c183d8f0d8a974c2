//! Decision integration - merge external suggestions into the simulation
//!
//! Results drained from the bridge only mark organisms; the suggested
//! actions are applied at the next evolution period, on the simulation
//! thread, after which every organism ages one period.

use crate::core::types::Rgb;
use crate::decision::{DecisionBridge, DecisionResult};
use crate::llm::context::DecisionContext;
use crate::llm::parser::{parse_decision, DecisionAction};
use crate::simulation::movement::{move_directional, move_towards};
use crate::simulation::population::{admit_births, remove_dead, Birth};
use crate::simulation::reproduction::{reproduce, ReproductionTrigger};
use crate::simulation::tick::SimulationEvent;
use crate::world::World;

/// Attach drained results to their organisms
///
/// Clears the in-flight flag and stores any delivered text for the next
/// evolution period. Results for organisms no longer in the population are
/// discarded.
pub fn attach_results(
    world: &mut World,
    results: Vec<DecisionResult>,
    events: &mut Vec<SimulationEvent>,
) {
    let tick = world.current_tick;
    for result in results {
        let Some(organism) = world.organism_mut(result.organism) else {
            tracing::debug!(organism = %result.organism, "discarding decision for departed organism");
            continue;
        };

        organism.evolving = false;
        let delivered = result.text.is_some();
        if let Some(text) = result.text {
            organism.pending_decision = Some(text);
        }
        events.push(SimulationEvent::DecisionReceived {
            organism: result.organism,
            delivered,
            tick,
        });
    }
}

/// Carry out one action for the organism at `index`
///
/// A suggested reproduction is only honored once the organism has eaten
/// its reproduction threshold; any child is pushed onto `births`.
pub fn apply_decision(
    world: &mut World,
    index: usize,
    action: DecisionAction,
    births: &mut Vec<Birth>,
) {
    let tick = world.current_tick;
    let nearest_food = world
        .food
        .nearest(world.organisms[index].position)
        .map(|f| f.position);
    let (organisms, ctx, rng) = world.movement_parts();
    let organism = &mut organisms[index];

    match action {
        DecisionAction::Grow => organism.grow(1.0),
        DecisionAction::Shrink => organism.shrink(1.0),
        DecisionAction::Recolor => organism.color = Rgb::random(rng),
        DecisionAction::Reproduce => {
            if organism.food_eaten >= organism.traits.reproduction_threshold {
                if let Some(child) = reproduce(organism, ReproductionTrigger::Decision, &ctx, tick, rng) {
                    births.push(Birth {
                        child,
                        parent: organism.id,
                        partner: None,
                    });
                }
            }
        }
        DecisionAction::Move(direction) => {
            move_directional(organism, Some(direction), &ctx, rng);
        }
        DecisionAction::MoveTowardFood => {
            if let Some(position) = nearest_food {
                move_towards(organism, position, &ctx, rng);
            }
        }
        DecisionAction::None => {}
    }
}

/// The evolution period: request, apply pending, age
///
/// Organisms that have eaten enough and have nothing in flight get a
/// decision request (when a bridge is attached). Pending decisions are
/// applied, then every organism ages one period. Aging is not limited to
/// organisms with a pending decision, so lifespan is a count of periods.
/// Organisms aged past their lifespan are removed before decision births
/// are admitted under the population cap.
pub fn run_evolution_period(
    world: &mut World,
    mut bridge: Option<&mut DecisionBridge>,
    events: &mut Vec<SimulationEvent>,
) {
    let tick = world.current_tick;
    let mut births = Vec::new();

    for i in 0..world.organisms.len() {
        if !world.organisms[i].is_alive() {
            continue;
        }

        if let Some(bridge) = bridge.as_deref_mut() {
            let organism = &world.organisms[i];
            if organism.food_eaten >= organism.traits.reproduction_threshold && !organism.evolving {
                let id = organism.id;
                bridge.request_decision(id, DecisionContext::capture(organism, world));
                world.organisms[i].evolving = true;
                events.push(SimulationEvent::DecisionRequested { organism: id, tick });
            }
        }

        if let Some(text) = world.organisms[i].pending_decision.take() {
            let action = parse_decision(&text);
            let id = world.organisms[i].id;
            tracing::debug!(organism = %id, ?action, "applying decision");
            apply_decision(world, i, action, &mut births);
            events.push(SimulationEvent::DecisionApplied {
                organism: id,
                action,
                tick,
            });
        }

        world.organisms[i].age_one_period();
    }

    remove_dead(world, events);
    admit_births(world, births, events);
}

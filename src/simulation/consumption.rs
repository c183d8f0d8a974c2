//! Food consumption system
//!
//! An organism eats the food it is targeting once their circles overlap.
//! Every consumed item is replaced at a fresh random position with a new
//! id, so the total amount of food stays constant.

use crate::entity::Target;
use crate::simulation::tick::SimulationEvent;
use crate::world::World;

/// Resolve eating for every organism touching its food target
/// Returns number of food items consumed
pub fn resolve_food_consumption(world: &mut World, events: &mut Vec<SimulationEvent>) -> usize {
    let tick = world.current_tick;
    let mut consumed = 0;

    for i in 0..world.organisms.len() {
        let Target::Food(food_id) = world.organisms[i].target else {
            continue;
        };
        if !world.organisms[i].is_alive() {
            continue;
        }
        // Eaten by someone earlier this tick; retargeted next tick
        let Some(food) = world.food.get(food_id).copied() else {
            continue;
        };
        if !world.organisms[i].collides_with(food.position, food.size) {
            continue;
        }

        let benefited = world.organisms[i].eat(&world.config);
        world.food.remove(food_id);
        let replacement = world.spawn_food();
        world.organisms[i].target = Target::None;
        world.totals.meals += 1;
        consumed += 1;

        events.push(SimulationEvent::Ate {
            organism: world.organisms[i].id,
            food: food_id,
            replacement,
            benefited,
            tick,
        });
    }

    consumed
}

//! Rendering snapshot of the arena
//!
//! Drawing itself is external. This module exposes what to draw, either as
//! a flat entity list (also serializable as a JSON snapshot) or by driving
//! a `DrawSink` implemented by the frontend.
//! This module is READ-ONLY - it never modifies simulation state.

pub mod colors;

use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::{Tick, Vec2};
use crate::world::{PopulationStats, World};

use colors::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderKind {
    Organism,
    Food,
    Obstacle,
}

/// Lightweight snapshot of one drawable thing
///
/// Organisms and food are circles centered on `position` with radius
/// `size`; obstacles are squares with `position` as the min corner.
#[derive(Debug, Clone, Serialize)]
pub struct RenderEntity {
    pub kind: RenderKind,
    pub position: Vec2,
    pub size: f32,
    pub color: Color,
}

/// Collects all renderable entities from the world into a reusable buffer.
/// Call this once per frame, passing the same buffer to avoid allocations.
pub fn collect_render_entities(world: &World, buffer: &mut Vec<RenderEntity>) {
    buffer.clear();

    for obstacle in &world.obstacles {
        buffer.push(RenderEntity {
            kind: RenderKind::Obstacle,
            position: obstacle.position,
            size: obstacle.size,
            color: colors::OBSTACLE,
        });
    }

    for food in world.food.iter() {
        buffer.push(RenderEntity {
            kind: RenderKind::Food,
            position: food.position,
            size: food.size,
            color: colors::FOOD_CAP,
        });
    }

    for organism in world.organisms().iter().filter(|o| o.is_alive()) {
        buffer.push(RenderEntity {
            kind: RenderKind::Organism,
            position: organism.position,
            size: organism.size,
            color: organism.color.into(),
        });
    }
}

/// Drawing primitives a frontend provides
pub trait DrawSink {
    fn clear(&mut self, color: Color);
    fn circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn rect(&mut self, min: Vec2, extent: Vec2, color: Color);
}

/// Draw one frame: background, obstacles, food (as mushrooms), organisms
pub fn draw_world(world: &World, sink: &mut impl DrawSink) {
    sink.clear(colors::BACKGROUND);

    for obstacle in &world.obstacles {
        sink.rect(
            obstacle.position,
            Vec2::new(obstacle.size, obstacle.size),
            colors::OBSTACLE,
        );
    }

    for food in world.food.iter() {
        let stem = Vec2::new(food.position.x - food.size / 4.0, food.position.y + food.size);
        sink.rect(stem, Vec2::new(food.size / 2.0, food.size * 2.0), colors::FOOD_STEM);
        sink.circle(food.position, food.size, colors::FOOD_CAP);
    }

    for organism in world.organisms().iter().filter(|o| o.is_alive()) {
        sink.circle(organism.position, organism.size, organism.color.into());
    }
}

/// Serializable frame for offline viewers
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: Tick,
    pub width: f32,
    pub height: f32,
    pub stats: PopulationStats,
    pub entities: Vec<RenderEntity>,
}

impl Snapshot {
    pub fn capture(world: &World) -> Self {
        let mut entities = Vec::new();
        collect_render_entities(world, &mut entities);
        Self {
            tick: world.current_tick,
            width: world.arena.width,
            height: world.arena.height,
            stats: world.stats(),
            entities,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::world::Obstacle;

    #[derive(Default)]
    struct Recorder {
        clears: usize,
        circles: Vec<(Vec2, f32, Color)>,
        rects: Vec<(Vec2, Vec2, Color)>,
    }

    impl DrawSink for Recorder {
        fn clear(&mut self, _color: Color) {
            self.clears += 1;
        }
        fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.circles.push((center, radius, color));
        }
        fn rect(&mut self, min: Vec2, extent: Vec2, color: Color) {
            self.rects.push((min, extent, color));
        }
    }

    fn small_world() -> World {
        let mut world = World::new(SimulationConfig {
            seed: Some(4),
            ..SimulationConfig::default()
        })
        .unwrap();
        world.obstacles.push(Obstacle::new(Vec2::new(300.0, 300.0), 12.0));
        world.food.insert(Vec2::new(50.0, 50.0), 4.0);
        world.spawn_organism(Vec2::new(10.0, 10.0));
        let dead = world.spawn_organism(Vec2::new(20.0, 20.0));
        world.organism_mut(dead).unwrap().energy = 0.0;
        world
    }

    #[test]
    fn test_collect_skips_dead() {
        let world = small_world();
        let mut buffer = Vec::new();
        collect_render_entities(&world, &mut buffer);

        let kinds: Vec<_> = buffer.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![RenderKind::Obstacle, RenderKind::Food, RenderKind::Organism]
        );

        // Buffer is reused
        collect_render_entities(&world, &mut buffer);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_draw_world() {
        let world = small_world();
        let mut sink = Recorder::default();
        draw_world(&world, &mut sink);

        assert_eq!(sink.clears, 1);
        assert_eq!(sink.rects.len(), 2, "obstacle plus mushroom stem");
        assert_eq!(sink.circles.len(), 2, "mushroom cap plus living organism");
        assert_eq!(sink.circles[0], (Vec2::new(50.0, 50.0), 4.0, colors::FOOD_CAP));
    }

    #[test]
    fn test_snapshot_json() {
        let world = small_world();
        let json = Snapshot::capture(&world).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tick"], 0);
        assert_eq!(value["entities"].as_array().unwrap().len(), 3);
        assert_eq!(value["entities"][0]["kind"], "obstacle");
    }
}

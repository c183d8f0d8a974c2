//! Evo Arena - organisms foraging, mating and evolving in a 2D arena
//!
//! The simulation runs single-threaded at a fixed tick rate. An optional
//! external decision source (an LLM) suggests actions asynchronously; its
//! answers are merged into the tick loop without ever blocking it.

pub mod core;
pub mod decision;
pub mod entity;
pub mod genetics;
pub mod llm;
pub mod render;
pub mod simulation;
pub mod world;

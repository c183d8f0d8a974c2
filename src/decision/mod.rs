//! External decisions - advisory actions merged into the tick loop
//!
//! A `DecisionSource` is the external collaborator (an LLM endpoint in
//! production, a scripted stub in tests). The `DecisionBridge` runs each
//! request on its own tokio task and hands results back to the simulation
//! thread through a channel; only the simulation thread mutates organisms.

pub mod bridge;
pub mod source;

pub use bridge::{DecisionBridge, DecisionResult};
pub use source::{DecisionFuture, DecisionSource};

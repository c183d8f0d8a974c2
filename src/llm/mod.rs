//! LLM integration - the production decision source
//!
//! The model only ever suggests one of a fixed set of actions. The
//! simulation maps its free-form reply onto that set and ignores anything
//! it cannot recognize.

pub mod client;
pub mod context;
pub mod parser;

pub use client::{ApiFormat, LlmClient};
pub use context::DecisionContext;
pub use parser::{parse_decision, DecisionAction};

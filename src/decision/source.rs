//! Decision source collaborator

use std::future::Future;
use std::pin::Pin;

use crate::core::error::Result;
use crate::llm::context::DecisionContext;

/// Boxed future returned by a decision source
pub type DecisionFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Anything that can suggest a next action for an organism
///
/// Implementations return free-form text; the simulation maps it onto its
/// fixed action set and ignores anything it does not recognize. Errors are
/// never fatal: the bridge turns them into an absent result.
pub trait DecisionSource: Send + Sync {
    fn decide(&self, context: DecisionContext) -> DecisionFuture<'_>;
}

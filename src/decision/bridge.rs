//! Decision bridge - async fan-out, synchronous drain
//!
//! Each request runs on its own task on a tokio runtime. Results come back
//! over an unbounded channel that the simulation thread drains without
//! blocking once per tick. Every request produces exactly one message: the
//! decision text, or `None` if the source failed, timed out, panicked, or
//! the task was dropped before completing.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::core::types::OrganismId;
use crate::decision::source::DecisionSource;
use crate::llm::context::DecisionContext;

/// Outcome of one decision request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionResult {
    pub organism: OrganismId,
    /// Raw decision text; `None` when the request produced nothing usable
    pub text: Option<String>,
}

pub struct DecisionBridge {
    source: Arc<dyn DecisionSource>,
    runtime: Handle,
    timeout: Duration,
    sender: UnboundedSender<DecisionResult>,
    receiver: UnboundedReceiver<DecisionResult>,
    outstanding: usize,
}

impl DecisionBridge {
    pub fn new(source: Arc<dyn DecisionSource>, runtime: Handle, timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            source,
            runtime,
            timeout,
            sender,
            receiver,
            outstanding: 0,
        }
    }

    /// Start a request without blocking the caller
    pub fn request_decision(&mut self, organism: OrganismId, context: DecisionContext) {
        let source = Arc::clone(&self.source);
        let publisher = Publisher::new(self.sender.clone(), organism);
        let timeout = self.timeout;

        self.runtime.spawn(async move {
            let text = match tokio::time::timeout(timeout, source.decide(context)).await {
                Ok(Ok(text)) => Some(text),
                Ok(Err(err)) => {
                    tracing::warn!(%organism, error = %err, "decision request failed");
                    None
                }
                Err(_) => {
                    tracing::warn!(%organism, ?timeout, "decision request timed out");
                    None
                }
            };
            publisher.publish(text);
        });

        self.outstanding += 1;
        tracing::debug!(%organism, outstanding = self.outstanding, "decision requested");
    }

    /// Collect every result that has arrived so far
    pub fn drain(&mut self) -> Vec<DecisionResult> {
        let mut results = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(result) => {
                    self.outstanding = self.outstanding.saturating_sub(1);
                    results.push(result);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        results
    }

    /// Requests issued whose result has not been drained yet
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

/// Sends the terminal message for one request, even if the task never
/// gets to call `publish`
struct Publisher {
    sender: UnboundedSender<DecisionResult>,
    organism: OrganismId,
    sent: bool,
}

impl Publisher {
    fn new(sender: UnboundedSender<DecisionResult>, organism: OrganismId) -> Self {
        Self {
            sender,
            organism,
            sent: false,
        }
    }

    fn publish(mut self, text: Option<String>) {
        self.send(text);
    }

    fn send(&mut self, text: Option<String>) {
        self.sent = true;
        // Receiver gone means the simulation shut down; nothing to deliver to.
        let _ = self.sender.send(DecisionResult {
            organism: self.organism,
            text,
        });
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        if !self.sent {
            self.send(None);
        }
    }
}

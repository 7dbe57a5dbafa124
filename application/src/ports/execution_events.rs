//! Port for execution lifecycle notifications.
//!
//! The registry emits one [`ExecutionEvent`] per state transition (registered,
//! executing, completed, failed, timeout, cancelled). Sinks are called
//! synchronously from the transitioning task, including timer tasks, so they
//! should hand work off rather than block.

use relay_domain::ExecutionEvent;

pub trait ExecutionEventSink: Send + Sync {
    fn emit(&self, event: ExecutionEvent);
}

/// Discards all events.
pub struct NoEventSink;

impl ExecutionEventSink for NoEventSink {
    fn emit(&self, _event: ExecutionEvent) {}
}

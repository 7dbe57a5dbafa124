//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording orchestration events
//! (rounds, tool calls, recoveries, halts, unattributed completions) to a
//! structured transcript.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures a machine-readable
//! record (JSONL) that can be replayed or audited.

use serde_json::Value;

/// Event type identifiers written by the orchestrator and completion handler.
pub mod event_types {
    pub const ROUND_STARTED: &str = "round_started";
    pub const TOOL_CALL: &str = "tool_call";
    pub const TOOL_RESULT: &str = "tool_result";
    pub const RECOVERY: &str = "recovery";
    pub const HALTED: &str = "halted";
    pub const FINAL_SUMMARY: &str = "final_summary";
    pub const COMPLETION_ATTRIBUTED: &str = "completion_attributed";
    pub const UNATTRIBUTED_COMPLETION: &str = "unattributed_completion";
}

/// A structured conversation event.
///
/// The adapter stamps the timestamp when the event is written.
pub struct ConversationEvent {
    /// One of [`event_types`]
    pub event_type: &'static str,
    /// JSON payload with event-specific data
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events.
///
/// `log` is synchronous and infallible so a broken transcript never disrupts a
/// conversation; adapters swallow their own write errors.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

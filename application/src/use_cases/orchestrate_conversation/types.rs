//! Type definitions for the conversation orchestrator.

use relay_domain::{ConversationId, ErrorKind, ExecutionId, Message, ToolCallStatus};
use serde::Serialize;
use thiserror::Error;

/// Precondition failures. Everything that goes wrong once the loop is running
/// is reported through [`ConversationOutcome::stop_reason`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Input for one orchestration run
#[derive(Debug, Clone)]
pub struct ConversationRequest {
    /// The user's request
    pub user_intent: String,
    /// Prior messages to continue from
    pub history: Vec<Message>,
    /// Reuse an id (e.g. to resume); a fresh one is generated otherwise
    pub conversation_id: Option<ConversationId>,
    /// Forwarded to the model gateway with every request
    pub justification: Option<String>,
}

impl ConversationRequest {
    pub fn new(user_intent: impl Into<String>) -> Self {
        Self {
            user_intent: user_intent.into(),
            history: Vec::new(),
            conversation_id: None,
            justification: None,
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_conversation_id(mut self, id: impl Into<ConversationId>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }
}

/// How one requested tool call was resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub call_id: String,
    /// Name the model used (may be an alias)
    pub requested_name: String,
    /// Canonical name after alias resolution
    pub tool_name: String,
    pub status: ToolCallStatus,
    /// Tool output, or the recovery / halt narrative
    pub output: String,
    /// Invocations made, 0 for cache hits and unknown tools
    pub attempts: u32,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<ExecutionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    pub round_number: u32,
    /// Text the model produced this round
    pub text: String,
    pub tool_calls: Vec<ToolCallRecord>,
    /// True for the forced tool-less request after the ceiling
    pub final_summary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// The model stopped requesting tools
    Completed,
    /// The round ceiling forced a tool-less summary
    RoundCeiling,
    /// A failure needs the user before progress can resume
    Halted { user_message: String },
    /// The cancellation signal fired; the outcome is partial
    Cancelled,
    /// The model request failed or timed out
    ModelError { message: String },
}

/// Output from one orchestration run
#[derive(Debug, Clone, Serialize)]
pub struct ConversationOutcome {
    pub conversation_id: ConversationId,
    /// Text of the last model response
    pub final_text: String,
    /// Full message log, including the history passed in
    pub messages: Vec<Message>,
    pub rounds: Vec<RoundRecord>,
    pub stop_reason: StopReason,
    /// Failed attempts that went through recovery
    pub error_count: usize,
}

impl ConversationOutcome {
    /// Whether the loop ended by design rather than by failure or cancellation.
    pub fn is_success(&self) -> bool {
        matches!(
            self.stop_reason,
            StopReason::Completed | StopReason::RoundCeiling
        )
    }

    /// Rounds that offered tools (excludes the forced summary).
    pub fn tool_rounds(&self) -> usize {
        self.rounds.iter().filter(|r| !r.final_summary).count()
    }

    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.rounds.iter().flat_map(|r| r.tool_calls.iter())
    }
}

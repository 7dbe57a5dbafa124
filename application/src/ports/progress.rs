//! Conversation progress port.
//!
//! [`ConversationProgress`] is an **output port** the presentation side implements
//! to show a conversation as it advances. Model text is forwarded here as soon as
//! it streams in.
//!
//! All methods have default no-op implementations, so implementers only need to
//! override the callbacks they care about.

use relay_domain::{RecoveryResult, ToolCallStatus};

pub trait ConversationProgress: Send + Sync {
    /// Called before each model request that offers tools
    fn on_round_start(&self, _round: u32, _max_rounds: u32) {}

    /// Called for each text fragment from the model
    fn on_text(&self, _chunk: &str) {}

    /// Called when a tool call is about to be resolved
    fn on_tool_call(&self, _tool_name: &str, _args_preview: &str) {}

    /// Called once a tool call is resolved
    fn on_tool_result(&self, _tool_name: &str, _status: &ToolCallStatus) {}

    /// Called after a recovery action was executed for a failed call
    fn on_recovery(&self, _tool_name: &str, _result: &RecoveryResult) {}

    /// Called when the round ceiling forces a tool-less final request
    fn on_final_summary(&self) {}

    /// Called when the workflow halts and needs the user
    fn on_halt(&self, _message: &str) {}
}

/// No-op progress notifier
pub struct NoConversationProgress;

impl ConversationProgress for NoConversationProgress {}

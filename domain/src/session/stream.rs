//! Streaming events for model responses.
//!
//! A model response is a finite, non-restartable sequence of [`StreamEvent`]s. The
//! orchestrator forwards `Text` fragments as soon as they arrive and buffers
//! `ToolCall` parts until the stream ends. End of stream is signalled by the
//! producer closing the channel, not by a dedicated variant.

use crate::tool::entities::ToolCall;

/// An event in a streaming model response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A text fragment from the model.
    Text(String),
    /// A complete tool-call request (name, call id and input).
    ToolCall(ToolCall),
    /// An error reported mid-stream; terminates the response.
    Error(String),
}

impl StreamEvent {
    /// Returns the text content if this is a `Text` event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the tool call if this is a `ToolCall` event.
    pub fn tool_call(&self) -> Option<&ToolCall> {
        match self {
            StreamEvent::ToolCall(call) => Some(call),
            _ => None,
        }
    }

    /// Returns true if this event ends the stream early.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Error(_))
    }
}

//! LLM Gateway port
//!
//! Defines the interface for sending a conversation to a language model and
//! consuming its streamed reply.

use async_trait::async_trait;
use relay_domain::{Message, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Request cancelled")]
    Cancelled,
}

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Tool descriptors in API form; `None` forces a tool-less reply
    pub tools: Option<Vec<serde_json::Value>>,
    /// Why the request is being made (surfaced by some providers)
    pub justification: Option<String>,
}

impl RequestOptions {
    pub fn with_tools(tools: Vec<serde_json::Value>) -> Self {
        Self {
            tools: Some(tools),
            justification: None,
        }
    }

    pub fn without_tools() -> Self {
        Self::default()
    }

    pub fn with_justification(mut self, justification: Option<String>) -> Self {
        self.justification = justification;
        self
    }

    pub fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer. They must stop
/// producing events promptly once `cancel` fires.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn send_request(
        &self,
        messages: &[Message],
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<ResponseStream, GatewayError>;
}

/// Handle for receiving the streamed parts of one model response.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. The stream ends when the producer
/// drops its sender.
pub struct ResponseStream {
    receiver: mpsc::Receiver<StreamEvent>,
}

impl ResponseStream {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Build an already-complete stream from a list of events.
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity covers every event, so this cannot fail on a full channel
            let _ = tx.try_send(event);
        }
        Self::new(rx)
    }

    /// Next event, or `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

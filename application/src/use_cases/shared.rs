//! Shared utilities for use cases.
//!
//! Contains cancellation checking and the cancellable model interaction helper
//! used by the conversation loop.

use crate::ports::llm_gateway::{GatewayError, LlmGateway, RequestOptions};
use crate::ports::progress::ConversationProgress;
use relay_domain::{Message, StreamEvent, ToolCall};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One fully consumed model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CollectedResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug)]
pub(crate) enum ResponseError {
    Cancelled,
    Model(String),
}

impl From<GatewayError> for ResponseError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Cancelled => ResponseError::Cancelled,
            other => ResponseError::Model(other.to_string()),
        }
    }
}

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), ResponseError> {
    if token.is_cancelled() {
        return Err(ResponseError::Cancelled);
    }
    Ok(())
}

/// Send a request and consume the whole stream with cancellation support.
///
/// Text fragments are forwarded to `progress` as they arrive; tool-call parts are
/// buffered until the stream ends. `timeout` bounds the entire response.
pub(crate) async fn send_cancellable<G: LlmGateway + ?Sized>(
    gateway: &G,
    messages: &[Message],
    options: &RequestOptions,
    progress: &dyn ConversationProgress,
    cancel: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<CollectedResponse, ResponseError> {
    check_cancelled(cancel)?;

    let collect = async {
        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ResponseError::Cancelled),
            sent = gateway.send_request(messages, options, cancel) => sent?,
        };

        let mut response = CollectedResponse::default();
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ResponseError::Cancelled),
                event = stream.next() => event,
            };
            match event {
                None => break,
                Some(StreamEvent::Text(chunk)) => {
                    progress.on_text(&chunk);
                    response.text.push_str(&chunk);
                }
                Some(StreamEvent::ToolCall(call)) => response.tool_calls.push(call),
                Some(StreamEvent::Error(e)) => return Err(ResponseError::Model(e)),
            }
        }
        debug!(
            text_len = response.text.len(),
            tool_calls = response.tool_calls.len(),
            "Model response collected"
        );
        Ok(response)
    };

    match timeout {
        Some(limit) => match tokio::time::timeout(limit, collect).await {
            Ok(result) => result,
            Err(_) => Err(ResponseError::Model(format!(
                "model response timed out after {}ms",
                limit.as_millis()
            ))),
        },
        None => collect.await,
    }
}

//! Scripted model gateway.
//!
//! [`ReplayGateway`] answers each request with the next [`ReplayTurn`] of a
//! script loaded from JSON. Text is streamed word by word through a spawned
//! producer task so consumers observe the same incremental delivery a live
//! model gives.
//!
//! ```json
//! {
//!   "turns": [
//!     { "text": "Let me look.", "tool_calls": [
//!         { "call_id": "c1", "tool_name": "read_file", "input": { "path": "README.md" } } ] },
//!     { "text": "The README describes the project." }
//!   ],
//!   "final_text": "Nothing more to add."
//! }
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_application::ports::llm_gateway::{GatewayError, LlmGateway, RequestOptions, ResponseStream};
use relay_domain::{Message, StreamEvent, ToolCall};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const STREAM_BUFFER: usize = 32;
const DEFAULT_FINAL_TEXT: &str = "Done.";

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Cannot read replay script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid replay script: {0}")]
    Format(#[from] serde_json::Error),
}

/// One scripted model response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayTurn {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    /// Emitted as a mid-stream error after the text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Pause before each streamed part
    pub delay_ms: u64,
}

impl ReplayTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    pub turns: Vec<ReplayTurn>,
    /// Answer once the turns are used up
    pub final_text: Option<String>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

pub struct ReplayGateway {
    turns: Mutex<VecDeque<ReplayTurn>>,
    final_text: String,
}

impl ReplayGateway {
    pub fn new(script: ReplayScript) -> Self {
        Self {
            turns: Mutex::new(script.turns.into()),
            final_text: script
                .final_text
                .unwrap_or_else(|| DEFAULT_FINAL_TEXT.to_string()),
        }
    }

    pub fn from_turns(turns: Vec<ReplayTurn>) -> Self {
        Self::new(ReplayScript {
            turns,
            final_text: None,
        })
    }

    pub fn remaining_turns(&self) -> usize {
        self.turns.lock().len()
    }

    fn next_turn(&self) -> ReplayTurn {
        self.turns
            .lock()
            .pop_front()
            .unwrap_or_else(|| ReplayTurn::text(self.final_text.clone()))
    }
}

/// Split text into word-sized chunks that concatenate back to the original.
fn chunks(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}

#[async_trait]
impl LlmGateway for ReplayGateway {
    async fn send_request(
        &self,
        messages: &[Message],
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<ResponseStream, GatewayError> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let mut turn = self.next_turn();
        if !options.has_tools() && !turn.tool_calls.is_empty() {
            warn!(
                count = turn.tool_calls.len(),
                "Dropping scripted tool calls from a request that offers no tools"
            );
            turn.tool_calls.clear();
        }
        debug!(
            messages = messages.len(),
            tool_calls = turn.tool_calls.len(),
            "Replaying scripted turn"
        );

        let mut events: Vec<StreamEvent> = chunks(&turn.text).into_iter().map(StreamEvent::Text).collect();
        events.extend(turn.tool_calls.into_iter().map(StreamEvent::ToolCall));
        if let Some(error) = turn.error {
            events.push(StreamEvent::Error(error));
        }

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let delay = Duration::from_millis(turn.delay_ms);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            for event in events {
                if !delay.is_zero() {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                if cancel.is_cancelled() || tx.send(event).await.is_err() {
                    return;
                }
            }
        });

        Ok(ResponseStream::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn drain(mut stream: ResponseStream) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event);
        }
        events
    }

    fn text_of(events: &[StreamEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Text(chunk) => Some(chunk.as_str()),
                _ => None,
            })
            .collect()
    }

    fn tools_offered() -> RequestOptions {
        RequestOptions::with_tools(vec![json!({"name": "read_file"})])
    }

    #[test]
    fn test_parse_script() {
        let script = ReplayScript::from_json(
            r#"{
                "turns": [
                    {"text": "Looking", "tool_calls": [
                        {"call_id": "c1", "tool_name": "read_file", "input": {"path": "a"}}]},
                    {"text": "Done", "delay_ms": 5}
                ],
                "final_text": "bye"
            }"#,
        )
        .unwrap();
        assert_eq!(script.turns.len(), 2);
        assert_eq!(script.turns[0].tool_calls[0].get_string("path"), Some("a"));
        assert_eq!(script.turns[1].delay_ms, 5);
        assert_eq!(script.final_text.as_deref(), Some("bye"));
    }

    #[test]
    fn test_invalid_script() {
        assert!(matches!(
            ReplayScript::from_json("{\"turns\": 3}"),
            Err(ReplayError::Format(_))
        ));
        assert!(matches!(
            ReplayScript::from_file(Path::new("/definitely/not/here.json")),
            Err(ReplayError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_replays_turns_in_order_then_final_text() {
        let gateway = ReplayGateway::from_turns(vec![
            ReplayTurn::text("first turn")
                .with_tool_call(ToolCall::new("c1", "read_file").with_arg("path", "a")),
            ReplayTurn::text("second"),
        ]);
        let cancel = CancellationToken::new();

        let first = drain(gateway.send_request(&[], &tools_offered(), &cancel).await.unwrap()).await;
        assert_eq!(
            first,
            vec![
                StreamEvent::Text("first ".to_string()),
                StreamEvent::Text("turn".to_string()),
                StreamEvent::ToolCall(ToolCall::new("c1", "read_file").with_arg("path", "a")),
            ]
        );

        let second = drain(gateway.send_request(&[], &tools_offered(), &cancel).await.unwrap()).await;
        assert_eq!(text_of(&second), "second");

        let after = drain(gateway.send_request(&[], &tools_offered(), &cancel).await.unwrap()).await;
        assert_eq!(text_of(&after), DEFAULT_FINAL_TEXT);
        assert_eq!(gateway.remaining_turns(), 0);
    }

    #[tokio::test]
    async fn test_drops_tool_calls_without_tools() {
        let gateway = ReplayGateway::from_turns(vec![
            ReplayTurn::text("summary").with_tool_call(ToolCall::new("c1", "read_file")),
        ]);
        let events = drain(
            gateway
                .send_request(&[], &RequestOptions::without_tools(), &CancellationToken::new())
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(events, vec![StreamEvent::Text("summary".to_string())]);
    }

    #[tokio::test]
    async fn test_scripted_error_ends_stream() {
        let gateway = ReplayGateway::from_turns(vec![ReplayTurn {
            text: "partial".to_string(),
            error: Some("overloaded".to_string()),
            ..ReplayTurn::default()
        }]);
        let events = drain(
            gateway
                .send_request(&[], &tools_offered(), &CancellationToken::new())
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(events.last(), Some(&StreamEvent::Error("overloaded".to_string())));
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let gateway = ReplayGateway::from_turns(vec![ReplayTurn::text("never")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = gateway.send_request(&[], &tools_offered(), &cancel).await;
        assert!(matches!(result, Err(GatewayError::Cancelled)));
        // The turn is not consumed
        assert_eq!(gateway.remaining_turns(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_delayed_stream() {
        let gateway = ReplayGateway::from_turns(vec![ReplayTurn {
            text: "a b c d".to_string(),
            delay_ms: 1000,
            ..ReplayTurn::default()
        }]);
        let cancel = CancellationToken::new();
        let mut stream = gateway.send_request(&[], &tools_offered(), &cancel).await.unwrap();

        assert_eq!(stream.next().await, Some(StreamEvent::Text("a ".to_string())));
        cancel.cancel();
        assert_eq!(stream.next().await, None);
    }
}

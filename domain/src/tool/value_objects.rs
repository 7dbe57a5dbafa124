//! Tool domain value objects: failure records and per-call outcomes
//!
//! A [`ToolError`] is produced whenever an invocation fails or times out. It is
//! the input to classification and recovery; `retry_count` tracks how many times
//! the same call has already been retried within the current round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Failure of a single tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    /// Name of the tool that failed
    pub tool_name: String,
    /// Call identifier assigned by the model
    pub call_id: String,
    /// Raw error text reported by the tool (or the orchestrator, for timeouts)
    pub error: String,
    /// When the failure was observed
    pub timestamp: DateTime<Utc>,
    /// Number of retries already attempted for this call
    pub retry_count: u32,
}

impl ToolError {
    pub fn new(
        tool_name: impl Into<String>,
        call_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            call_id: call_id.into(),
            error: error.into(),
            timestamp: Utc::now(),
            retry_count: 0,
        }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Failure produced when the per-call deadline elapses.
    pub fn timed_out(
        tool_name: impl Into<String>,
        call_id: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self::new(
            tool_name,
            call_id,
            format!("Tool call timed out after {}ms", timeout_ms),
        )
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}#{}] {}", self.tool_name, self.call_id, self.error)
    }
}

impl std::error::Error for ToolError {}

/// How a tool call in a round was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    /// Invoked and returned output
    Succeeded,
    /// Served from the result cache without invocation
    Cached,
    /// Handed off to an asynchronous actor; completion arrives out of band
    Delegated,
    /// Failed; a recovery narrative was appended instead of output
    Recovered,
    /// Failed and the workflow was halted
    Halted,
    /// Ran concurrently with a call that stopped the round; its failure was not handled
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error() {
        let err = ToolError::new("read_file", "call_1", "Permission denied: /etc/shadow")
            .with_retry_count(2);

        assert_eq!(err.tool_name, "read_file");
        assert_eq!(err.retry_count, 2);
        assert_eq!(
            err.to_string(),
            "[read_file#call_1] Permission denied: /etc/shadow"
        );
    }

    #[test]
    fn test_timed_out_mentions_timeout() {
        let err = ToolError::timed_out("web_fetch", "call_9", 1500);
        assert!(err.error.contains("timed out"));
        assert!(err.error.contains("1500ms"));
        assert_eq!(err.retry_count, 0);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ToolCallStatus::Delegated).unwrap();
        assert_eq!(json, "\"delegated\"");
    }
}

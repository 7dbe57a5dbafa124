//! Lifecycle notifications emitted by the execution registry.

use super::entities::{ExecutionId, ExecutionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionEventKind {
    Registered,
    Executing,
    Completed,
    Failed,
    Timeout,
    /// Caller-initiated stop; the record itself ends as `Failed`
    Cancelled,
}

impl ExecutionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionEventKind::Registered => "registered",
            ExecutionEventKind::Executing => "executing",
            ExecutionEventKind::Completed => "completed",
            ExecutionEventKind::Failed => "failed",
            ExecutionEventKind::Timeout => "timeout",
            ExecutionEventKind::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    pub execution_id: ExecutionId,
    pub kind: ExecutionEventKind,
    /// Record status after the transition
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionEvent {
    pub fn new(
        execution_id: ExecutionId,
        kind: ExecutionEventKind,
        status: ExecutionStatus,
    ) -> Self {
        Self {
            execution_id,
            kind,
            status,
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ExecutionEvent::new(
            ExecutionId::new("abc-1"),
            ExecutionEventKind::Cancelled,
            ExecutionStatus::Failed,
        )
        .with_details("cancelled");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "cancelled");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["execution_id"], "abc-1");
        assert_eq!(json["details"], "cancelled");
    }
}

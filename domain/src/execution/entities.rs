//! Execution records and their status machine.
//!
//! ```text
//! Pending ──> Executing ──> Completed
//!    │                 ├──> Failed
//!    │                 └──> Timeout
//!    └──────(terminal states are also reachable directly from Pending)
//! ```
//!
//! Terminal states are sinks: once reached, the record is immutable history.

use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier of a tracked execution. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExecutionId(String);

impl ExecutionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!("exec-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<String>> From<T> for ExecutionId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Executing,
    Completed,
    Failed,
    Timeout,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Timeout
        )
    }

    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        match self {
            ExecutionStatus::Pending => next != ExecutionStatus::Pending,
            ExecutionStatus::Executing => next.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Executing => "executing",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ExecutionStatus::Pending),
            "executing" => Ok(ExecutionStatus::Executing),
            "completed" => Ok(ExecutionStatus::Completed),
            "failed" => Ok(ExecutionStatus::Failed),
            "timeout" => Ok(ExecutionStatus::Timeout),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Serializable state of one execution.
///
/// The live timeout handle is owned by the registry and is not part of the record,
/// so records can be persisted and restored as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: ExecutionId,
    /// Actor the work was delegated to
    pub agent_name: String,
    pub method: String,
    pub task_description: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub original_params: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_context: Option<String>,
}

impl ExecutionRecord {
    pub fn new(
        id: impl Into<ExecutionId>,
        agent_name: impl Into<String>,
        method: impl Into<String>,
        task_description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            agent_name: agent_name.into(),
            method: method.into(),
            task_description: task_description.into(),
            start_time: Utc::now(),
            end_time: None,
            status: ExecutionStatus::Pending,
            duration_ms: None,
            error: None,
            original_params: serde_json::Value::Null,
            prompt_context: None,
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.original_params = params;
        self
    }

    pub fn with_prompt_context(mut self, context: impl Into<String>) -> Self {
        self.prompt_context = Some(context.into());
        self
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to a non-terminal status.
    pub fn transition(&mut self, next: ExecutionStatus) -> Result<(), DomainError> {
        if next.is_terminal() {
            return self.finish(next, None, Utc::now());
        }
        self.check_transition(next)?;
        self.status = next;
        Ok(())
    }

    /// Move to a terminal status, stamping the end time and duration.
    pub fn finish(
        &mut self,
        status: ExecutionStatus,
        error: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.check_transition(status)?;
        if !status.is_terminal() {
            return Err(self.invalid(status));
        }
        self.status = status;
        self.end_time = Some(at);
        self.duration_ms = Some(
            u64::try_from((at - self.start_time).num_milliseconds()).unwrap_or(0),
        );
        self.error = error;
        Ok(())
    }

    fn check_transition(&self, next: ExecutionStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(self.invalid(next))
        }
    }

    fn invalid(&self, next: ExecutionStatus) -> DomainError {
        DomainError::InvalidTransition {
            id: self.id.to_string(),
            from: self.status.to_string(),
            to: next.to_string(),
        }
    }
}

/// Outcome reported by an external actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Completed,
    Failed,
}

/// Out-of-band completion notice delivered by a long-running actor.
///
/// Either field used for attribution may be missing; correlation falls back to
/// timing when both are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSignal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<ExecutionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    pub status: CompletionStatus,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl CompletionSignal {
    pub fn new(status: CompletionStatus, summary: impl Into<String>) -> Self {
        Self {
            execution_id: None,
            task_description: None,
            status,
            summary: summary.into(),
            metadata: serde_json::Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_execution_id(mut self, id: impl Into<ExecutionId>) -> Self {
        self.execution_id = Some(id.into());
        self
    }

    pub fn with_task_description(mut self, description: impl Into<String>) -> Self {
        self.task_description = Some(description.into());
        self
    }
}

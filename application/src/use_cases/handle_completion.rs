//! Completion signal use case.
//!
//! An asynchronous actor reports that delegated work finished. The signal may
//! carry an execution id, a task description, both, or neither; the registry's
//! correlation ladder decides which active execution it belongs to.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use crate::services::ExecutionRegistry;
use parking_lot::Mutex;
use relay_domain::{CompletionSignal, CompletionStatus, CorrelationMethod, ExecutionRecord};
use serde::Serialize;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{info, warn};

/// Unattributed signals retained for inspection.
const UNATTRIBUTED_CAPACITY: usize = 50;

/// Which execution a signal was attributed to, and how.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    /// The execution after its terminal transition
    pub execution: ExecutionRecord,
    pub method: CorrelationMethod,
}

/// Routes completion signals to the executions they finish.
pub struct CompletionSignalHandler {
    registry: ExecutionRegistry,
    logger: Arc<dyn ConversationLogger>,
    unattributed: Mutex<VecDeque<CompletionSignal>>,
}

impl CompletionSignalHandler {
    pub fn new(registry: ExecutionRegistry) -> Self {
        Self {
            registry,
            logger: Arc::new(NoConversationLogger),
            unattributed: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Attribute `signal` and finish the matching execution.
    ///
    /// Returns `None` when no active execution matches, or when the match was
    /// finished concurrently (e.g. by its timeout) before this signal landed.
    pub fn handle(&self, signal: CompletionSignal) -> Option<Attribution> {
        let correlation = self.registry.smart_correlate(
            signal.execution_id.as_ref().map(|id| id.as_str()),
            signal.task_description.as_deref(),
        );
        let Some(correlation) = correlation else {
            self.record_unattributed(signal, "no active execution matched");
            return None;
        };

        let id = correlation.record.id.clone();
        let finished = match signal.status {
            CompletionStatus::Completed => self.registry.complete_execution(&id),
            CompletionStatus::Failed => self
                .registry
                .fail_execution(&id, Some(signal.summary.clone())),
        };
        let Some(execution) = finished else {
            self.record_unattributed(signal, "matched execution was already finished");
            return None;
        };

        if correlation.method != CorrelationMethod::ExecutionId {
            // Weaker evidence than an explicit id
            info!(
                execution_id = %execution.id,
                method = ?correlation.method,
                "Completion attributed by fallback correlation"
            );
        } else {
            info!(execution_id = %execution.id, status = execution.status.as_str(), "Completion attributed");
        }
        self.logger.log(ConversationEvent::new(
            event_types::COMPLETION_ATTRIBUTED,
            json!({
                "execution_id": execution.id.as_str(),
                "method": correlation.method,
                "status": execution.status,
                "summary": signal.summary,
                "duration_ms": execution.duration_ms,
            }),
        ));

        Some(Attribution {
            execution,
            method: correlation.method,
        })
    }

    /// Most recent unattributed signals, oldest first.
    pub fn unattributed(&self) -> Vec<CompletionSignal> {
        self.unattributed.lock().iter().cloned().collect()
    }

    fn record_unattributed(&self, signal: CompletionSignal, reason: &str) {
        warn!(
            execution_id = ?signal.execution_id,
            task = ?signal.task_description,
            "Completion signal could not be attributed: {}",
            reason
        );
        self.logger.log(ConversationEvent::new(
            event_types::UNATTRIBUTED_COMPLETION,
            json!({
                "reason": reason,
                "execution_id": signal.execution_id.as_ref().map(|id| id.as_str()),
                "task_description": signal.task_description,
                "summary": signal.summary,
            }),
        ));

        let mut unattributed = self.unattributed.lock();
        if unattributed.len() >= UNATTRIBUTED_CAPACITY {
            unattributed.pop_front();
        }
        unattributed.push_back(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryParams;
    use relay_domain::{ExecutionId, ExecutionStatus};

    struct CapturingLogger {
        events: std::sync::Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for CapturingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn registry_with(tasks: &[(&str, &str)]) -> ExecutionRegistry {
        let registry = ExecutionRegistry::new(RegistryParams::default());
        for (id, task) in tasks {
            registry
                .register_execution(ExecutionRecord::new(
                    ExecutionId::new(*id),
                    "agent",
                    "invoke",
                    *task,
                ))
                .unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn test_attributes_by_execution_id() {
        let registry = registry_with(&[("exec-1", "write docs"), ("exec-2", "fix tests")]);
        let handler = CompletionSignalHandler::new(registry.clone());

        let attribution = handler
            .handle(CompletionSignal::new(CompletionStatus::Completed, "done").with_execution_id("exec-1"))
            .unwrap();

        assert_eq!(attribution.method, CorrelationMethod::ExecutionId);
        assert_eq!(attribution.execution.id.as_str(), "exec-1");
        assert_eq!(attribution.execution.status, ExecutionStatus::Completed);
        assert_eq!(registry.active_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_signal_fails_execution_with_summary() {
        let registry = registry_with(&[("exec-1", "deploy service")]);
        let handler = CompletionSignalHandler::new(registry);

        let attribution = handler
            .handle(
                CompletionSignal::new(CompletionStatus::Failed, "build broke")
                    .with_execution_id("exec-1"),
            )
            .unwrap();

        assert_eq!(attribution.execution.status, ExecutionStatus::Failed);
        assert_eq!(attribution.execution.error.as_deref(), Some("build broke"));
    }

    #[tokio::test]
    async fn test_falls_back_to_content() {
        let registry = registry_with(&[
            ("exec-1", "Refactor the parser module"),
            ("exec-2", "Update deployment scripts"),
        ]);
        let handler = CompletionSignalHandler::new(registry);

        let attribution = handler
            .handle(
                CompletionSignal::new(CompletionStatus::Completed, "ok")
                    .with_execution_id("exec-unknown")
                    .with_task_description("refactor the PARSER module!"),
            )
            .unwrap();

        assert_eq!(attribution.method, CorrelationMethod::ContentExact);
        assert_eq!(attribution.execution.id.as_str(), "exec-1");
    }

    #[tokio::test]
    async fn test_falls_back_to_temporal() {
        let registry = registry_with(&[("exec-1", "anything")]);
        let handler = CompletionSignalHandler::new(registry);

        let attribution = handler
            .handle(CompletionSignal::new(CompletionStatus::Completed, "ok"))
            .unwrap();

        assert_eq!(attribution.method, CorrelationMethod::Temporal);
        assert_eq!(attribution.execution.id.as_str(), "exec-1");
    }

    #[tokio::test]
    async fn test_unattributed_signal_is_retained_and_logged() {
        let logger = Arc::new(CapturingLogger {
            events: std::sync::Mutex::new(Vec::new()),
        });
        let handler = CompletionSignalHandler::new(registry_with(&[]))
            .with_conversation_logger(logger.clone());

        let result = handler.handle(
            CompletionSignal::new(CompletionStatus::Completed, "orphan").with_execution_id("exec-9"),
        );

        assert!(result.is_none());
        let retained = handler.unattributed();
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].summary, "orphan");
        assert_eq!(
            *logger.events.lock().unwrap(),
            vec![event_types::UNATTRIBUTED_COMPLETION]
        );
    }

    #[tokio::test]
    async fn test_second_signal_for_same_execution_is_unattributed() {
        let registry = registry_with(&[("exec-1", "task")]);
        let handler = CompletionSignalHandler::new(registry);

        let signal = CompletionSignal::new(CompletionStatus::Completed, "done").with_execution_id("exec-1");
        assert!(handler.handle(signal.clone()).is_some());
        assert!(handler.handle(signal).is_none());
        assert_eq!(handler.unattributed().len(), 1);
    }

    #[tokio::test]
    async fn test_unattributed_list_is_bounded() {
        let handler = CompletionSignalHandler::new(registry_with(&[]));
        for i in 0..(UNATTRIBUTED_CAPACITY + 5) {
            handler.handle(CompletionSignal::new(CompletionStatus::Completed, format!("s{i}")));
        }

        let retained = handler.unattributed();
        assert_eq!(retained.len(), UNATTRIBUTED_CAPACITY);
        assert_eq!(retained[0].summary, "s5");
    }
}

//! Error recovery engine.
//!
//! Wraps the pure decision logic from `relay_domain::recovery` with the state
//! that needs a home: a bounded history of recovery attempts (scoped by
//! conversation), the budgets of [`RecoveryPolicy`], and the asynchronous
//! execution of actions (waiting out retry delays).

use crate::config::RecoveryPolicy;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use relay_domain::core::string::join_or_none;
use relay_domain::recovery::suggestions_for;
use relay_domain::{
    ConversationId, ErrorClassification, ErrorKind, RecoveryAction, RecoveryResult,
    RecoveryStrategy, ToolCallContext, ToolError, classify,
};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One executed recovery, kept for budgets and statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryAttempt {
    pub conversation_id: ConversationId,
    pub tool_name: String,
    pub kind: ErrorKind,
    pub strategy: RecoveryStrategy,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecoveryStatistics {
    pub total_attempts: usize,
    pub successful_recoveries: usize,
    /// Keyed by strategy name (`RETRY`, `FALLBACK_TOOL`, ...)
    pub attempts_by_strategy: HashMap<String, usize>,
    /// `(tool, errors)` sorted by errors descending, then name
    pub tools_with_most_errors: Vec<(String, usize)>,
}

pub struct ErrorRecoveryEngine {
    policy: RecoveryPolicy,
    history: Mutex<VecDeque<RecoveryAttempt>>,
}

impl Default for ErrorRecoveryEngine {
    fn default() -> Self {
        Self::new(RecoveryPolicy::default())
    }
}

impl ErrorRecoveryEngine {
    pub fn new(policy: RecoveryPolicy) -> Self {
        Self {
            policy,
            history: Mutex::new(VecDeque::new()),
        }
    }

    pub fn policy(&self) -> &RecoveryPolicy {
        &self.policy
    }

    pub fn classify_error(&self, error: &ToolError, context: &ToolCallContext) -> ErrorClassification {
        classify(error, context)
    }

    pub fn generate_recovery_action(
        &self,
        classification: &ErrorClassification,
        error: &ToolError,
        context: &ToolCallContext,
    ) -> RecoveryAction {
        RecoveryAction::plan(
            classification,
            error,
            context,
            duration_ms(self.policy.default_retry_delay),
        )
    }

    /// Execute an action and record the attempt.
    ///
    /// RETRY waits out its delay; a cancellation during the wait yields a
    /// non-continuing result.
    pub async fn execute_recovery(
        &self,
        action: &RecoveryAction,
        error: &ToolError,
        context: &ToolCallContext,
        cancel: &CancellationToken,
    ) -> RecoveryResult {
        let result = match action.strategy {
            RecoveryStrategy::Retry => {
                let delay = Duration::from_millis(action.delay_ms().unwrap_or(0));
                debug!(tool = %error.tool_name, delay_ms = duration_ms(delay), "Waiting before retry");
                let waited = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => false,
                    _ = tokio::time::sleep(delay) => true,
                };
                if waited {
                    RecoveryResult {
                        success: true,
                        action: action.clone(),
                        should_continue: true,
                        user_message: None,
                        alternative_approach: Some(format!(
                            "'{}' failed ({}); retrying in {}ms",
                            error.tool_name,
                            error.error,
                            delay.as_millis()
                        )),
                    }
                } else {
                    RecoveryResult {
                        success: false,
                        action: action.clone(),
                        should_continue: false,
                        user_message: Some("Recovery cancelled".to_string()),
                        alternative_approach: None,
                    }
                }
            }
            RecoveryStrategy::FallbackTool => {
                let candidates = action.fallback_options.clone().unwrap_or_default();
                match candidates.first() {
                    Some(candidate) => RecoveryResult {
                        success: true,
                        action: action.clone(),
                        should_continue: true,
                        user_message: None,
                        alternative_approach: Some(format!(
                            "'{}' is unavailable ({}); trying an alternative tool such as '{}' (candidates: {})",
                            error.tool_name,
                            error.error,
                            candidate,
                            join_or_none(&candidates)
                        )),
                    },
                    None => RecoveryResult {
                        success: false,
                        action: action.clone(),
                        should_continue: true,
                        user_message: None,
                        alternative_approach: Some(format!(
                            "'{}' is unavailable and no alternative tool exists; continuing without it",
                            error.tool_name
                        )),
                    },
                }
            }
            RecoveryStrategy::ParameterCorrection => RecoveryResult {
                success: true,
                action: action.clone(),
                should_continue: true,
                user_message: None,
                alternative_approach: Some(format!(
                    "'{}' rejected its parameters ({}); correct them and call it again",
                    error.tool_name, error.error
                )),
            },
            RecoveryStrategy::GracefulDegradation => RecoveryResult {
                success: true,
                action: action.clone(),
                should_continue: true,
                user_message: None,
                alternative_approach: Some(format!(
                    "'{}' failed ({}); continuing without its output",
                    error.tool_name, error.error
                )),
            },
            RecoveryStrategy::UserIntervention => RecoveryResult {
                success: false,
                action: action.clone(),
                should_continue: false,
                user_message: Some(format!(
                    "'{}' needs your attention: {}. Resolve it (for example, grant the required permission) and ask again.",
                    error.tool_name, error.error
                )),
                alternative_approach: None,
            },
        };

        self.record(RecoveryAttempt {
            conversation_id: context.conversation_id.clone(),
            tool_name: error.tool_name.clone(),
            kind: classify(error, context).kind,
            strategy: action.strategy,
            success: result.success,
            timestamp: Utc::now(),
        });
        info!(
            tool = %error.tool_name,
            strategy = action.strategy.as_str(),
            success = result.success,
            "Executed recovery"
        );
        result
    }

    /// Whether the conversation may keep going after `error`.
    ///
    /// False for non-recoverable classifications and whenever
    /// [`Self::ceiling_reached`] holds.
    pub fn should_continue_workflow(
        &self,
        error: &ToolError,
        context: &ToolCallContext,
        error_count: usize,
    ) -> bool {
        let classification = classify(error, context);
        if !classification.recoverable {
            debug!(kind = classification.kind.as_str(), "Non-recoverable error");
            return false;
        }
        !self.ceiling_reached(error, context, error_count)
    }

    /// True once `error_count` reaches the conversation ceiling or the tool has
    /// used its attempt budget in the current conversation.
    pub fn ceiling_reached(
        &self,
        error: &ToolError,
        context: &ToolCallContext,
        error_count: usize,
    ) -> bool {
        if error_count >= self.policy.max_errors_per_conversation {
            warn!(
                error_count,
                ceiling = self.policy.max_errors_per_conversation,
                "Conversation error ceiling reached"
            );
            return true;
        }
        let attempts = self.attempts_for(&context.conversation_id, &error.tool_name);
        if attempts >= self.policy.max_attempts_per_tool {
            warn!(tool = %error.tool_name, attempts, "Tool exhausted its recovery attempts");
            return true;
        }
        false
    }

    /// User-facing explanation for a halt decided by [`Self::should_continue_workflow`]
    /// or [`Self::ceiling_reached`].
    pub fn halt_message(
        &self,
        classification: &ErrorClassification,
        error: &ToolError,
        context: &ToolCallContext,
        error_count: usize,
    ) -> String {
        let reason = if error_count >= self.policy.max_errors_per_conversation {
            format!(
                "Stopped after {} tool errors in this conversation (last: '{}': {})",
                error_count, error.tool_name, error.error
            )
        } else if self.attempts_for(&context.conversation_id, &error.tool_name)
            >= self.policy.max_attempts_per_tool
        {
            format!(
                "'{}' keeps failing and has used all {} recovery attempts (last error: {})",
                error.tool_name, self.policy.max_attempts_per_tool, error.error
            )
        } else {
            format!(
                "'{}' failed with a {} error that needs your attention: {}",
                error.tool_name, classification.kind, error.error
            )
        };
        self.append_suggestions(reason, classification, error, context)
    }

    /// `message` followed by one `- suggestion` line per recovery suggestion.
    pub fn append_suggestions(
        &self,
        message: String,
        classification: &ErrorClassification,
        error: &ToolError,
        context: &ToolCallContext,
    ) -> String {
        let mut message = message;
        for suggestion in self.get_recovery_suggestions(classification, error, context) {
            message.push_str("\n- ");
            message.push_str(&suggestion);
        }
        message
    }

    pub fn get_recovery_suggestions(
        &self,
        classification: &ErrorClassification,
        error: &ToolError,
        context: &ToolCallContext,
    ) -> Vec<String> {
        suggestions_for(classification, error, context)
    }

    /// Recovery attempts for `tool_name` within `conversation_id`.
    pub fn attempts_for(&self, conversation_id: &ConversationId, tool_name: &str) -> usize {
        self.history
            .lock()
            .iter()
            .filter(|a| &a.conversation_id == conversation_id && a.tool_name == tool_name)
            .count()
    }

    pub fn get_recovery_statistics(&self) -> RecoveryStatistics {
        let history = self.history.lock();
        let mut by_strategy: HashMap<String, usize> = HashMap::new();
        let mut by_tool: HashMap<&str, usize> = HashMap::new();
        for attempt in history.iter() {
            *by_strategy
                .entry(attempt.strategy.as_str().to_string())
                .or_default() += 1;
            *by_tool.entry(attempt.tool_name.as_str()).or_default() += 1;
        }

        let mut tools: Vec<(String, usize)> = by_tool
            .into_iter()
            .map(|(tool, count)| (tool.to_string(), count))
            .collect();
        tools.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        RecoveryStatistics {
            total_attempts: history.len(),
            successful_recoveries: history.iter().filter(|a| a.success).count(),
            attempts_by_strategy: by_strategy,
            tools_with_most_errors: tools,
        }
    }

    pub fn recovery_history(&self) -> Vec<RecoveryAttempt> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn clear_recovery_history(&self) {
        self.history.lock().clear();
    }

    fn record(&self, attempt: RecoveryAttempt) {
        let mut history = self.history.lock();
        history.push_back(attempt);
        while history.len() > self.policy.history_capacity {
            history.pop_front();
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

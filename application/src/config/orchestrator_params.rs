//! Orchestrator parameters: conversation loop control.
//!
//! [`OrchestratorParams`] groups the static parameters that control the round
//! loop in [`ConversationOrchestrator`](crate::use_cases::orchestrate_conversation::ConversationOrchestrator).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorParams {
    /// Tool-calling rounds allowed before a tool-less final request is forced.
    pub max_rounds: u32,
    /// Invoke the calls of one round concurrently.
    pub parallel_tool_calls: bool,
    /// Deadline for each individual tool invocation.
    pub tool_timeout: Duration,
    /// Deadline for each model response, `None` to wait indefinitely.
    pub model_timeout: Option<Duration>,
    /// Automatic re-invocations allowed for a call whose recovery is RETRY.
    pub max_tool_retries: u32,
    /// Consult and fill the result cache.
    pub cache_results: bool,
    /// Prepended when the conversation has no prior history.
    pub system_prompt: Option<String>,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            parallel_tool_calls: true,
            tool_timeout: Duration::from_secs(30),
            model_timeout: Some(Duration::from_secs(120)),
            max_tool_retries: 2,
            cache_results: true,
            system_prompt: None,
        }
    }
}

impl OrchestratorParams {
    // ==================== Builder Methods ====================

    pub fn with_max_rounds(mut self, max: u32) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = parallel;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_max_tool_retries(mut self, max: u32) -> Self {
        self.max_tool_retries = max;
        self
    }

    pub fn with_cache_results(mut self, enabled: bool) -> Self {
        self.cache_results = enabled;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = OrchestratorParams::default();
        assert_eq!(params.max_rounds, 5);
        assert!(params.parallel_tool_calls);
        assert_eq!(params.max_tool_retries, 2);
        assert!(params.cache_results);
        assert!(params.system_prompt.is_none());
    }

    #[test]
    fn test_builder() {
        let params = OrchestratorParams::default()
            .with_max_rounds(3)
            .with_parallel_tool_calls(false)
            .with_tool_timeout(Duration::from_millis(250))
            .with_system_prompt("Be brief.");

        assert_eq!(params.max_rounds, 3);
        assert!(!params.parallel_tool_calls);
        assert_eq!(params.tool_timeout, Duration::from_millis(250));
        assert_eq!(params.system_prompt.as_deref(), Some("Be brief."));
    }
}

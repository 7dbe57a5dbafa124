//! Parameters for the shared services (recovery, registry, cache).
//!
//! The ceilings and the overlap threshold are empirical defaults, exposed here so
//! deployments can tune them through the config file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Budgets and bounds for [`ErrorRecoveryEngine`](crate::services::recovery_engine::ErrorRecoveryEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryPolicy {
    /// Tool errors tolerated in one conversation before halting.
    pub max_errors_per_conversation: usize,
    /// Recovery attempts one tool may use in one conversation.
    pub max_attempts_per_tool: usize,
    /// Delay before a retry when the classification suggests none.
    pub default_retry_delay: Duration,
    /// Recovery attempts kept for statistics and budgets.
    pub history_capacity: usize,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            max_errors_per_conversation: 5,
            max_attempts_per_tool: 5,
            default_retry_delay: Duration::from_millis(1000),
            history_capacity: 200,
        }
    }
}

impl RecoveryPolicy {
    pub fn with_max_errors(mut self, max: usize) -> Self {
        self.max_errors_per_conversation = max;
        self
    }

    pub fn with_max_attempts_per_tool(mut self, max: usize) -> Self {
        self.max_attempts_per_tool = max;
        self
    }

    pub fn with_default_retry_delay(mut self, delay: Duration) -> Self {
        self.default_retry_delay = delay;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

/// Settings for [`ExecutionRegistry`](crate::services::execution_registry::ExecutionRegistry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryParams {
    /// Time an execution may stay active before it is forced to `timeout`.
    pub execution_timeout: Duration,
    /// Terminal records retained; oldest evicted first.
    pub history_capacity: usize,
    /// Minimum shared-word ratio for content correlation.
    pub overlap_threshold: f64,
}

impl Default for RegistryParams {
    fn default() -> Self {
        Self {
            execution_timeout: Duration::from_secs(600),
            history_capacity: 100,
            overlap_threshold: relay_domain::execution::DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

impl RegistryParams {
    pub fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_overlap_threshold(mut self, threshold: f64) -> Self {
        self.overlap_threshold = threshold;
        self
    }
}

/// Settings for [`ToolResultManager`](crate::services::tool_result_manager::ToolResultManager).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheParams {
    /// TTL applied by `cache_result`; `None` keeps entries until cleared.
    pub default_ttl: Option<Duration>,
}

impl CacheParams {
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let recovery = RecoveryPolicy::default();
        assert_eq!(recovery.max_errors_per_conversation, 5);
        assert_eq!(recovery.max_attempts_per_tool, 5);

        let registry = RegistryParams::default();
        assert_eq!(registry.execution_timeout, Duration::from_secs(600));
        assert_eq!(registry.history_capacity, 100);
        assert!((registry.overlap_threshold - 0.4).abs() < f64::EPSILON);

        assert!(CacheParams::default().default_ttl.is_none());
    }

    #[test]
    fn test_builders() {
        let policy = RecoveryPolicy::default()
            .with_max_errors(2)
            .with_default_retry_delay(Duration::ZERO);
        assert_eq!(policy.max_errors_per_conversation, 2);
        assert_eq!(policy.default_retry_delay, Duration::ZERO);

        let registry = RegistryParams::default().with_history_capacity(3);
        assert_eq!(registry.history_capacity, 3);
    }
}

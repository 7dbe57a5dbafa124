//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Durations are plain integers with the unit in the key name.

use relay_application::config::{
    CacheParams, OrchestratorParams, RecoveryPolicy, RegistryParams, RelayConfig,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("{0} must be at least 1")]
    ZeroCeiling(&'static str),

    #[error("registry.overlap_threshold must be in (0, 1], got {0}")]
    InvalidOverlapThreshold(f64),
}

/// Round loop settings (`[orchestrator]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    pub max_rounds: u32,
    pub parallel_tool_calls: bool,
    pub tool_timeout_ms: u64,
    /// Omit to wait indefinitely for model responses
    pub model_timeout_ms: Option<u64>,
    pub max_tool_retries: u32,
    pub cache_results: bool,
    pub system_prompt: Option<String>,
}

impl Default for FileOrchestratorConfig {
    fn default() -> Self {
        let params = OrchestratorParams::default();
        Self {
            max_rounds: params.max_rounds,
            parallel_tool_calls: params.parallel_tool_calls,
            tool_timeout_ms: millis(params.tool_timeout),
            model_timeout_ms: params.model_timeout.map(millis),
            max_tool_retries: params.max_tool_retries,
            cache_results: params.cache_results,
            system_prompt: params.system_prompt,
        }
    }
}

/// Error ceilings (`[recovery]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRecoveryConfig {
    pub max_errors_per_conversation: usize,
    pub max_attempts_per_tool: usize,
    pub default_retry_delay_ms: u64,
    pub history_capacity: usize,
}

impl Default for FileRecoveryConfig {
    fn default() -> Self {
        let policy = RecoveryPolicy::default();
        Self {
            max_errors_per_conversation: policy.max_errors_per_conversation,
            max_attempts_per_tool: policy.max_attempts_per_tool,
            default_retry_delay_ms: millis(policy.default_retry_delay),
            history_capacity: policy.history_capacity,
        }
    }
}

/// Delegated execution tracking (`[registry]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRegistryConfig {
    pub execution_timeout_secs: u64,
    pub history_capacity: usize,
    pub overlap_threshold: f64,
}

impl Default for FileRegistryConfig {
    fn default() -> Self {
        let params = RegistryParams::default();
        Self {
            execution_timeout_secs: params.execution_timeout.as_secs(),
            history_capacity: params.history_capacity,
            overlap_threshold: params.overlap_threshold,
        }
    }
}

/// Result cache (`[cache]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    /// Omit to keep entries until cleared
    pub default_ttl_secs: Option<u64>,
}

/// Output files (`[logging]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL conversation transcript
    pub conversation_log: Option<PathBuf>,
    /// Diagnostic log file (same as `--log-file`)
    pub log_file: Option<PathBuf>,
    /// Execution history persisted between runs
    pub history_file: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub orchestrator: FileOrchestratorConfig,
    pub recovery: FileRecoveryConfig,
    pub registry: FileRegistryConfig,
    pub cache: FileCacheConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let o = &self.orchestrator;
        if o.max_rounds == 0 {
            return Err(ConfigValidationError::ZeroCeiling("orchestrator.max_rounds"));
        }
        if o.tool_timeout_ms == 0 {
            return Err(ConfigValidationError::ZeroTimeout("orchestrator.tool_timeout_ms"));
        }
        if o.model_timeout_ms == Some(0) {
            return Err(ConfigValidationError::ZeroTimeout("orchestrator.model_timeout_ms"));
        }

        let r = &self.recovery;
        if r.max_errors_per_conversation == 0 {
            return Err(ConfigValidationError::ZeroCeiling(
                "recovery.max_errors_per_conversation",
            ));
        }
        if r.max_attempts_per_tool == 0 {
            return Err(ConfigValidationError::ZeroCeiling("recovery.max_attempts_per_tool"));
        }

        let g = &self.registry;
        if g.execution_timeout_secs == 0 {
            return Err(ConfigValidationError::ZeroTimeout("registry.execution_timeout_secs"));
        }
        if g.history_capacity == 0 {
            return Err(ConfigValidationError::ZeroCeiling("registry.history_capacity"));
        }
        if !(g.overlap_threshold > 0.0 && g.overlap_threshold <= 1.0) {
            return Err(ConfigValidationError::InvalidOverlapThreshold(g.overlap_threshold));
        }

        if self.cache.default_ttl_secs == Some(0) {
            return Err(ConfigValidationError::ZeroTimeout("cache.default_ttl_secs"));
        }

        Ok(())
    }

    /// Convert to application parameters. Call [`Self::validate`] first.
    pub fn to_relay_config(&self) -> RelayConfig {
        let o = &self.orchestrator;
        let mut orchestrator = OrchestratorParams::default()
            .with_max_rounds(o.max_rounds)
            .with_parallel_tool_calls(o.parallel_tool_calls)
            .with_tool_timeout(Duration::from_millis(o.tool_timeout_ms))
            .with_model_timeout(o.model_timeout_ms.map(Duration::from_millis))
            .with_max_tool_retries(o.max_tool_retries)
            .with_cache_results(o.cache_results);
        if let Some(prompt) = &o.system_prompt {
            orchestrator = orchestrator.with_system_prompt(prompt.clone());
        }

        let r = &self.recovery;
        let recovery = RecoveryPolicy::default()
            .with_max_errors(r.max_errors_per_conversation)
            .with_max_attempts_per_tool(r.max_attempts_per_tool)
            .with_default_retry_delay(Duration::from_millis(r.default_retry_delay_ms))
            .with_history_capacity(r.history_capacity);

        let g = &self.registry;
        let registry = RegistryParams::default()
            .with_execution_timeout(Duration::from_secs(g.execution_timeout_secs))
            .with_history_capacity(g.history_capacity)
            .with_overlap_threshold(g.overlap_threshold);

        let cache = CacheParams::default()
            .with_default_ttl(self.cache.default_ttl_secs.map(Duration::from_secs));

        RelayConfig::new(orchestrator, recovery, registry, cache)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

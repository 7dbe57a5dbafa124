//! Relay configuration container.
//!
//! [`RelayConfig`] groups the four parameter types so the composition root can
//! build every service from one value. Services receive only the slice they need.
//!
//! | Type | Consumed by |
//! |------|-------------|
//! | `OrchestratorParams` | `ConversationOrchestrator` |
//! | `RecoveryPolicy` | `ErrorRecoveryEngine` |
//! | `RegistryParams` | `ExecutionRegistry` |
//! | `CacheParams` | `ToolResultManager` |

use super::{CacheParams, OrchestratorParams, RecoveryPolicy, RegistryParams};

#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    orchestrator: OrchestratorParams,
    recovery: RecoveryPolicy,
    registry: RegistryParams,
    cache: CacheParams,
}

impl RelayConfig {
    pub fn new(
        orchestrator: OrchestratorParams,
        recovery: RecoveryPolicy,
        registry: RegistryParams,
        cache: CacheParams,
    ) -> Self {
        Self {
            orchestrator,
            recovery,
            registry,
            cache,
        }
    }

    // ==================== Accessors ====================

    pub fn orchestrator(&self) -> &OrchestratorParams {
        &self.orchestrator
    }

    pub fn recovery(&self) -> &RecoveryPolicy {
        &self.recovery
    }

    pub fn registry(&self) -> &RegistryParams {
        &self.registry
    }

    pub fn cache(&self) -> &CacheParams {
        &self.cache
    }

    // ==================== Builder Methods ====================

    pub fn with_orchestrator(mut self, params: OrchestratorParams) -> Self {
        self.orchestrator = params;
        self
    }

    /// Force sequential tool invocation (e.g. for reproducible transcripts).
    pub fn with_sequential_tools(mut self) -> Self {
        self.orchestrator = self.orchestrator.with_parallel_tool_calls(false);
        self
    }
}

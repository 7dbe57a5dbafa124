//! Shared, stateful services.
//!
//! These are constructed once by the composition root and shared (via `Arc` or
//! cheap clones) across concurrent conversations.

pub mod execution_registry;
pub mod recovery_engine;
pub mod tool_result_manager;

pub use execution_registry::{
    Correlation, ExecutionRegistry, RegistryError, RegistrySnapshot, RegistryStatistics,
};
pub use recovery_engine::{ErrorRecoveryEngine, RecoveryAttempt, RecoveryStatistics};
pub use tool_result_manager::{CacheStats, ToolResultManager};

//! Infrastructure layer for tool-relay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod events;
pub mod llm;
pub mod logging;
pub mod persistence;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileCacheConfig, FileConfig, FileLoggingConfig,
    FileOrchestratorConfig, FileRecoveryConfig, FileRegistryConfig,
};
pub use events::{BroadcastEventSink, TracingEventSink};
pub use llm::{ReplayError, ReplayGateway, ReplayScript, ReplayTurn};
pub use logging::JsonlConversationLogger;
pub use persistence::{HistoryStoreError, JsonHistoryStore};
pub use tools::{FunctionToolInvoker, demo_tools};

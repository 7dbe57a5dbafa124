//! Application layer for tool-relay
//!
//! This crate contains use cases, port definitions, the shared services, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod services;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CacheParams, OrchestratorParams, RecoveryPolicy, RegistryParams, RelayConfig};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    execution_events::{ExecutionEventSink, NoEventSink},
    llm_gateway::{GatewayError, LlmGateway, RequestOptions, ResponseStream},
    progress::{ConversationProgress, NoConversationProgress},
    tool_invoker::{InvocationError, ToolInvokerPort},
};
pub use services::{
    CacheStats, Correlation, ErrorRecoveryEngine, ExecutionRegistry, RecoveryStatistics,
    RegistryError, RegistrySnapshot, RegistryStatistics, ToolResultManager,
};
pub use use_cases::handle_completion::{Attribution, CompletionSignalHandler};
pub use use_cases::orchestrate_conversation::{
    ConversationOrchestrator, ConversationOutcome, ConversationRequest, OrchestratorError,
    RoundRecord, StopReason, ToolCallRecord,
};

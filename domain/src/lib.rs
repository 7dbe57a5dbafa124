//! Domain layer for tool-relay
//!
//! This crate contains the core entities, value objects and pure decision logic.
//! It has no dependencies on infrastructure or async runtime concerns.
//!
//! # Core Concepts
//!
//! ## Tool-call rounds
//!
//! A conversation advances in rounds: the model is queried, any requested
//! [`ToolCall`]s are resolved, and their results are appended before the next
//! query. Results are content-addressed by [`CacheKey`].
//!
//! ## Recovery
//!
//! A failed call becomes a [`ToolError`], which [`classify`] maps onto the
//! taxonomy in [`CLASSIFICATION_RULES`] and [`RecoveryAction::plan`] turns into a
//! strategy-specific decision.
//!
//! ## Executions
//!
//! Work delegated to an asynchronous actor is tracked as an [`ExecutionRecord`]
//! and attributed back through [`CompletionSignal`]s.

pub mod core;
pub mod execution;
pub mod recovery;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use core::error::DomainError;
pub use execution::{
    CompletionSignal, CompletionStatus, CorrelationMethod, ExecutionEvent, ExecutionEventKind,
    ExecutionId, ExecutionRecord, ExecutionStatus,
};
pub use recovery::{
    CLASSIFICATION_RULES, ConversationId, ErrorClassification, ErrorKind, RecoveryAction,
    RecoveryResult, RecoveryStrategy, Severity, ToolCallContext, classify,
};
pub use session::{Conversation, Message, Role, StreamEvent};
pub use tool::{CacheKey, ToolCall, ToolCallStatus, ToolDefinition, ToolError, ToolParameter, ToolSpec};

//! Tool domain module
//!
//! Core abstractions for the tools a model can request during a conversation.
//!
//! # Overview
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ output  or ToolError │
//! │ (registry)   │    │ (invocation) │    │                      │
//! └──────┬───────┘    └──────┬───────┘    └──────────────────────┘
//!        │                   │
//!        ├─ aliases          └─ CacheKey = sha256(name ∥ canonical(input))
//!        └─ asynchronous tools (delegated to an external actor)
//! ```
//!
//! # Key Types
//!
//! - [`ToolSpec`]: Registry of available tools + alias mappings, in registration order
//! - [`ToolDefinition`]: Schema for a single tool
//! - [`ToolCall`]: A model request with a call id and structured input
//! - [`ToolError`]: Failure record fed to classification and recovery
//! - [`CacheKey`]: Content address for the result cache
//!
//! The domain layer holds only definitions; invocation lives behind the application
//! layer's `ToolInvokerPort`.

pub mod cache_key;
pub mod entities;
pub mod value_objects;

pub use cache_key::{CacheKey, canonicalize};
pub use entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use value_objects::{ToolCallStatus, ToolError};

//! Tool Invoker port
//!
//! Defines the interface for invoking tools by name with structured input.

use async_trait::async_trait;
use relay_domain::tool::entities::{ToolDefinition, ToolSpec};
use thiserror::Error;

/// Failure reported by a tool invocation.
///
/// The display text is what classification matches against.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Failed(String),
}

/// Port for tool invocation
///
/// Implementations must be safe to call concurrently for distinct calls.
#[async_trait]
pub trait ToolInvokerPort: Send + Sync {
    /// Descriptors of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool (or alias) is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().resolve(name).is_some()
    }

    /// Get the definition of a tool, following aliases
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get_resolved(name)
    }

    /// Get names of all available tools
    fn available_tools(&self) -> Vec<&str> {
        self.tool_spec().names().collect()
    }

    /// Invoke a tool by canonical name.
    async fn invoke(
        &self,
        tool_name: &str,
        input: &serde_json::Value,
    ) -> Result<String, InvocationError>;
}

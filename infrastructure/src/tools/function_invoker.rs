//! Tool invoker backed by a table of async closures.
//!
//! [`FunctionToolInvoker`] is the in-process adapter for [`ToolInvokerPort`]:
//! each registered [`ToolDefinition`] is paired with a handler closure that
//! receives the call input and resolves to the tool output.
//!
//! ```text
//! invoke("cat", input)
//!   └─ orchestrator resolves alias → "read_file"
//!        └─ handlers["read_file"](input) → Result<String, InvocationError>
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;
use relay_application::ports::tool_invoker::{InvocationError, ToolInvokerPort};
use relay_domain::{ToolDefinition, ToolSpec};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<String, InvocationError>> + Send + Sync>;

/// Invoker dispatching by canonical tool name.
///
/// Handlers are `Fn`, so one handler may run concurrently for distinct calls.
#[derive(Clone, Default)]
pub struct FunctionToolInvoker {
    spec: ToolSpec,
    handlers: HashMap<String, Handler>,
}

impl FunctionToolInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with its handler. A later registration of the same name
    /// replaces both definition and handler.
    pub fn register<F, Fut>(mut self, definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, InvocationError>> + Send + 'static,
    {
        let name = definition.name.clone();
        self.spec = self.spec.register(definition);
        self.handlers
            .insert(name, Arc::new(move |input| Box::pin(handler(input))));
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.spec = self.spec.register_alias(alias, canonical);
        self
    }
}

impl std::fmt::Debug for FunctionToolInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionToolInvoker")
            .field("tools", &self.spec.names().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl ToolInvokerPort for FunctionToolInvoker {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, tool_name: &str, input: &Value) -> Result<String, InvocationError> {
        // Direct callers may still pass an alias
        let canonical = self.spec.resolve(tool_name).unwrap_or(tool_name);
        let Some(handler) = self.handlers.get(canonical) else {
            return Err(InvocationError::NotFound(tool_name.to_string()));
        };
        debug!(tool = canonical, "Invoking tool");
        handler(input.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo() -> FunctionToolInvoker {
        FunctionToolInvoker::new()
            .register(ToolDefinition::new("echo", "Echo text"), |input: Value| async move {
                input
                    .get("text")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| InvocationError::Failed("invalid parameter: text".to_string()))
            })
            .with_alias("say", "echo")
    }

    #[tokio::test]
    async fn test_invoke_registered_tool() {
        let tools = echo();
        assert_eq!(tools.invoke("echo", &json!({"text": "hi"})).await.unwrap(), "hi");
        assert!(tools.has_tool("echo"));
        assert_eq!(tools.available_tools(), vec!["echo"]);
    }

    #[tokio::test]
    async fn test_alias_dispatches_to_canonical() {
        let tools = echo();
        assert_eq!(tools.invoke("say", &json!({"text": "yo"})).await.unwrap(), "yo");
        assert_eq!(tools.get_tool("say").unwrap().name, "echo");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let err = echo().invoke("missing", &json!({})).await.unwrap_err();
        assert_eq!(err, InvocationError::NotFound("missing".to_string()));
        assert_eq!(err.to_string(), "Tool not found: missing");
    }

    #[tokio::test]
    async fn test_handler_error_is_propagated() {
        let err = echo().invoke("echo", &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("invalid parameter"));
    }

    #[tokio::test]
    async fn test_reregistration_replaces_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let tools = echo().register(ToolDefinition::new("echo", "Echo v2"), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("v2".to_string())
            }
        });

        assert_eq!(tools.tool_spec().len(), 1);
        assert_eq!(tools.get_tool("echo").unwrap().description, "Echo v2");
        assert_eq!(tools.invoke("echo", &json!({})).await.unwrap(), "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

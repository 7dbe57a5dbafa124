//! Demonstration tool set used by the CLI.
//!
//! Covers each path through the orchestrator: plain output, I/O failures that
//! classify as permission or not-found errors, a transient network failure that
//! recovers on retry, and an asynchronous delegation.

use super::function_invoker::FunctionToolInvoker;
use relay_application::ports::tool_invoker::InvocationError;
use relay_domain::{ToolDefinition, ToolParameter};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ECHO: &str = "echo";
pub const READ_FILE: &str = "read_file";
pub const FLAKY_FETCH: &str = "flaky_fetch";
pub const DELEGATE_TASK: &str = "delegate_task";

/// Maximum bytes returned by `read_file`
const MAX_READ_BYTES: usize = 64 * 1024;

fn string_arg<'a>(input: &'a Value, key: &str) -> Result<&'a str, InvocationError> {
    input
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| InvocationError::Failed(format!("invalid parameter: '{key}' is required")))
}

async fn read_file(input: Value) -> Result<String, InvocationError> {
    let path = string_arg(&input, "path")?;
    match tokio::fs::read_to_string(path).await {
        Ok(mut content) => {
            if content.len() > MAX_READ_BYTES {
                let mut end = MAX_READ_BYTES;
                while !content.is_char_boundary(end) {
                    end -= 1;
                }
                content.truncate(end);
                content.push_str("\n... (truncated)");
            }
            Ok(content)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Err(InvocationError::Failed(
            format!("Permission denied: {path}"),
        )),
        Err(e) => Err(InvocationError::Failed(format!("Failed to read {path}: {e}"))),
    }
}

/// Build the demo tools. `flaky_fetch` fails every other invocation.
pub fn demo_tools() -> FunctionToolInvoker {
    let fetches = Arc::new(AtomicUsize::new(0));

    FunctionToolInvoker::new()
        .register(
            ToolDefinition::new(ECHO, "Return the given text unchanged")
                .with_parameter(ToolParameter::new("text", "Text to echo", true)),
            |input: Value| async move { string_arg(&input, "text").map(str::to_string) },
        )
        .register(
            ToolDefinition::new(READ_FILE, "Read a UTF-8 file from the local filesystem")
                .with_parameter(ToolParameter::new("path", "Path to the file", true).with_type("path")),
            read_file,
        )
        .register(
            ToolDefinition::new(FLAKY_FETCH, "Fetch a resource over an unreliable network")
                .with_parameter(ToolParameter::new("url", "Resource to fetch", true)),
            move |input: Value| {
                let attempt = fetches.fetch_add(1, Ordering::SeqCst);
                async move {
                    let url = string_arg(&input, "url")?;
                    if attempt % 2 == 0 {
                        Err(InvocationError::Failed(format!(
                            "network unreachable while fetching {url}"
                        )))
                    } else {
                        Ok(format!("fetched {url} (attempt {})", attempt + 1))
                    }
                }
            },
        )
        .register(
            ToolDefinition::new(DELEGATE_TASK, "Hand a task to a background agent")
                .with_parameter(ToolParameter::new("task", "What the agent should do", true))
                .asynchronous(),
            |input: Value| async move {
                let task = string_arg(&input, "task")?;
                Ok(format!("accepted: {task}"))
            },
        )
        .with_alias("cat", READ_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_application::ports::tool_invoker::ToolInvokerPort;
    use serde_json::json;

    #[tokio::test]
    async fn test_demo_spec() {
        let tools = demo_tools();
        assert_eq!(tools.tool_spec().len(), 4);
        assert!(tools.get_tool(DELEGATE_TASK).unwrap().asynchronous);
        assert_eq!(tools.get_tool("cat").unwrap().name, READ_FILE);
    }

    #[tokio::test]
    async fn test_flaky_fetch_alternates() {
        let tools = demo_tools();
        let input = json!({"url": "https://example.com"});
        let first = tools.invoke(FLAKY_FETCH, &input).await.unwrap_err();
        assert!(first.to_string().contains("network"));
        assert!(tools.invoke(FLAKY_FETCH, &input).await.is_ok());
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let tools = demo_tools();
        let out = tools
            .invoke(READ_FILE, &json!({"path": path.to_string_lossy()}))
            .await
            .unwrap();
        assert_eq!(out, "hello");

        let missing = tools
            .invoke(READ_FILE, &json!({"path": dir.path().join("nope").to_string_lossy()}))
            .await
            .unwrap_err();
        assert!(missing.to_string().starts_with("Failed to read"));
    }

    #[tokio::test]
    async fn test_missing_argument_is_invalid_parameter() {
        let err = demo_tools().invoke(ECHO, &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("invalid parameter"));
    }
}

//! Human-readable guidance per error kind.

use super::classification::{ErrorClassification, ErrorKind};
use super::context::ToolCallContext;
use crate::core::string::join_or_none;
use crate::tool::value_objects::ToolError;

pub fn suggestions_for(
    classification: &ErrorClassification,
    error: &ToolError,
    context: &ToolCallContext,
) -> Vec<String> {
    match classification.kind {
        ErrorKind::ToolNotFound => vec![
            format!("'{}' is not registered in this session", error.tool_name),
            format!("Available tools: {}", join_or_none(&context.tool_names())),
            "Check the tool name for typos or a missing alias".to_string(),
        ],
        ErrorKind::PermissionDenied => vec![
            "Check that the workspace is trusted and the sandbox allows this operation"
                .to_string(),
            "Verify filesystem permissions for the target path".to_string(),
            format!("Grant access, then ask again to rerun '{}'", error.tool_name),
        ],
        ErrorKind::Timeout => vec![
            "The operation may be slow; retrying with a longer timeout can help".to_string(),
            "Narrow the request (smaller path, fewer results) to reduce work".to_string(),
        ],
        ErrorKind::InvalidParameters => vec![
            format!("Review the parameters passed to '{}'", error.tool_name),
            "Make sure required parameters are present and correctly typed".to_string(),
        ],
        ErrorKind::RateLimit => vec![
            match classification.suggested_delay_ms() {
                Some(ms) => format!("Wait about {}s before retrying", ms / 1000),
                None => "Wait before retrying".to_string(),
            },
            "Reduce the number of parallel requests".to_string(),
        ],
        ErrorKind::NetworkError => vec![
            "Check network connectivity".to_string(),
            "Check proxy configuration (HTTP_PROXY / HTTPS_PROXY)".to_string(),
            "Retry once the remote service is reachable".to_string(),
        ],
        ErrorKind::Unknown => vec![
            format!("'{}' failed with an unrecognized error", error.tool_name),
            "Rephrase the request or continue without this tool".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::classification::classify;
    use crate::tool::entities::ToolDefinition;

    fn suggest(text: &str) -> Vec<String> {
        let ctx = ToolCallContext::new("conv-1", "x").with_tools(vec![
            ToolDefinition::new("read_file", "Read"),
            ToolDefinition::new("write_file", "Write"),
        ]);
        let error = ToolError::new("edit_file", "call_1", text);
        suggestions_for(&classify(&error, &ctx), &error, &ctx)
    }

    #[test]
    fn test_permission_mentions_trust_and_filesystem() {
        let joined = suggest("permission denied").join("\n").to_lowercase();
        assert!(joined.contains("trusted"));
        assert!(joined.contains("filesystem permissions"));
    }

    #[test]
    fn test_network_mentions_proxy() {
        let joined = suggest("network unreachable").join("\n").to_lowercase();
        assert!(joined.contains("connectivity"));
        assert!(joined.contains("proxy"));
    }

    #[test]
    fn test_tool_not_found_lists_tools() {
        let joined = suggest("tool not found").join("\n");
        assert!(joined.contains("read_file, write_file"));
    }
}

//! Shared helpers for tool use cases.

use relay_domain::core::string::truncate;
use relay_domain::tool::entities::ToolCall;

/// Argument keys that describe delegated work, in priority order.
const TASK_KEYS: [&str; 3] = ["task", "prompt", "description"];

/// Extract a short preview string from tool call input.
///
/// Looks for well-known keys (`path`, `command`, `pattern`, `query`, `url`)
/// first, then falls back to the first string value found.
pub(crate) fn tool_args_preview(call: &ToolCall) -> String {
    let keys = ["path", "command", "pattern", "query", "url"];
    for key in &keys {
        if let Some(s) = call.get_string(key) {
            return truncate(s, 50);
        }
    }
    if let Some(object) = call.input.as_object() {
        for value in object.values() {
            if let Some(s) = value.as_str() {
                return truncate(s, 50);
            }
        }
    }
    String::new()
}

/// Task description for a delegated call: the first non-empty task-like
/// argument, else `fallback`.
pub(crate) fn task_description_for(call: &ToolCall, fallback: &str) -> String {
    TASK_KEYS
        .iter()
        .filter_map(|key| call.get_string(key))
        .find(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_call(input: serde_json::Value) -> ToolCall {
        ToolCall::new("call_1", "test_tool").with_input(input)
    }

    #[test]
    fn test_path_key_preferred() {
        let call = make_call(json!({"other": "ignored", "path": "src/main.rs"}));
        assert_eq!(tool_args_preview(&call), "src/main.rs");
    }

    #[test]
    fn test_command_key() {
        let call = make_call(json!({"command": "cargo test"}));
        assert_eq!(tool_args_preview(&call), "cargo test");
    }

    #[test]
    fn test_fallback_to_first_string() {
        let call = make_call(json!({"count": 3, "label": "nightly"}));
        assert_eq!(tool_args_preview(&call), "nightly");
    }

    #[test]
    fn test_no_strings() {
        assert_eq!(tool_args_preview(&make_call(json!({"n": 1}))), "");
        assert_eq!(tool_args_preview(&make_call(json!([1, 2]))), "");
    }

    #[test]
    fn test_long_value_truncated() {
        let long = "x".repeat(80);
        let call = make_call(json!({"query": long}));
        assert!(tool_args_preview(&call).chars().count() <= 53);
    }

    #[test]
    fn test_task_description_priority() {
        let call = make_call(json!({"description": "d", "prompt": "p"}));
        assert_eq!(task_description_for(&call, "intent"), "p");

        let blank = make_call(json!({"task": "  ", "description": "d"}));
        assert_eq!(task_description_for(&blank, "intent"), "d");

        assert_eq!(task_description_for(&make_call(json!({})), "intent"), "intent");
    }
}

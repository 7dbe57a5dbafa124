//! Per-round snapshot handed to classification and recovery.

use crate::session::entities::Message;
use crate::tool::entities::ToolDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of one orchestration run.
///
/// Recovery history is scoped by this id so failures from earlier conversations
/// never count against the current one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id (uuid v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<String>> From<T> for ConversationId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

/// Immutable snapshot of the conversation state for one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallContext {
    /// Conversation this snapshot belongs to
    pub conversation_id: ConversationId,
    /// The user's original request
    pub user_intent: String,
    /// Tools offered to the model this round
    pub available_tools: Vec<ToolDefinition>,
    /// Messages accumulated so far
    pub conversation_history: Vec<Message>,
    /// Successful outputs so far, keyed by call id
    pub previous_results: HashMap<String, String>,
    /// 1-indexed round counter; strictly increasing within a run
    pub round_number: u32,
}

impl ToolCallContext {
    pub fn new(conversation_id: impl Into<ConversationId>, user_intent: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_intent: user_intent.into(),
            available_tools: Vec::new(),
            conversation_history: Vec::new(),
            previous_results: HashMap::new(),
            round_number: 0,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.available_tools = tools;
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.conversation_history = history;
        self
    }

    pub fn with_previous_results(mut self, results: HashMap<String, String>) -> Self {
        self.previous_results = results;
        self
    }

    pub fn with_round(mut self, round_number: u32) -> Self {
        self.round_number = round_number;
        self
    }

    /// Names of the tools offered this round, in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.available_tools.iter().map(|t| t.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id() {
        let id = ConversationId::new("conv-1");
        assert_eq!(id.as_str(), "conv-1");
        assert_eq!(id.to_string(), "conv-1");

        let generated = ConversationId::generate();
        assert_ne!(generated, ConversationId::generate());
    }

    #[test]
    fn test_context_builder() {
        let context = ToolCallContext::new("conv-1", "summarize the repo")
            .with_tools(vec![
                ToolDefinition::new("read_file", "Read"),
                ToolDefinition::new("grep_search", "Grep"),
            ])
            .with_round(3);

        assert_eq!(context.round_number, 3);
        assert_eq!(context.tool_names(), vec!["read_file", "grep_search"]);
        assert!(context.previous_results.is_empty());
    }
}

//! Recovery decisions and their outcomes.

use super::classification::{ErrorClassification, RecoveryStrategy};
use super::context::ToolCallContext;
use crate::tool::value_objects::ToolError;
use serde::{Deserialize, Serialize};

/// Parameter key: delay before retrying, in milliseconds.
pub const DELAY_KEY: &str = "delay";
/// Parameter key: retry number this action represents.
pub const RETRY_COUNT_KEY: &str = "retryCount";
/// Parameter key: set when a person has to act before progress can resume.
pub const USER_ACTION_REQUIRED_KEY: &str = "userActionRequired";

/// Decision produced from a classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryAction {
    pub strategy: RecoveryStrategy,
    pub description: String,
    pub parameters: serde_json::Map<String, serde_json::Value>,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_options: Option<Vec<String>>,
}

impl RecoveryAction {
    /// Build the strategy-specific action for a classified failure.
    ///
    /// `default_delay_ms` applies to retries whose classification does not carry
    /// its own suggested delay.
    pub fn plan(
        classification: &ErrorClassification,
        error: &ToolError,
        context: &ToolCallContext,
        default_delay_ms: u64,
    ) -> Self {
        let mut parameters = serde_json::Map::new();
        match classification.suggested_strategy {
            RecoveryStrategy::Retry => {
                let delay = classification
                    .suggested_delay_ms()
                    .unwrap_or(default_delay_ms);
                let retry_count = error.retry_count + 1;
                parameters.insert(DELAY_KEY.into(), delay.into());
                parameters.insert(RETRY_COUNT_KEY.into(), retry_count.into());
                Self {
                    strategy: RecoveryStrategy::Retry,
                    description: format!(
                        "Retry '{}' in {}ms (attempt {})",
                        error.tool_name, delay, retry_count
                    ),
                    parameters,
                    retryable: true,
                    fallback_options: None,
                }
            }
            RecoveryStrategy::FallbackTool => {
                let options: Vec<String> = context
                    .available_tools
                    .iter()
                    .filter(|t| t.name != error.tool_name)
                    .map(|t| t.name.clone())
                    .collect();
                Self {
                    strategy: RecoveryStrategy::FallbackTool,
                    description: format!(
                        "Use an alternative to '{}' ({} candidate(s))",
                        error.tool_name,
                        options.len()
                    ),
                    parameters,
                    retryable: false,
                    fallback_options: Some(options),
                }
            }
            RecoveryStrategy::UserIntervention => {
                parameters.insert(USER_ACTION_REQUIRED_KEY.into(), true.into());
                Self {
                    strategy: RecoveryStrategy::UserIntervention,
                    description: format!(
                        "'{}' needs user action before it can proceed: {}",
                        error.tool_name, error.error
                    ),
                    parameters,
                    retryable: false,
                    fallback_options: None,
                }
            }
            RecoveryStrategy::ParameterCorrection => Self {
                strategy: RecoveryStrategy::ParameterCorrection,
                description: format!(
                    "Ask the model to call '{}' again with corrected parameters",
                    error.tool_name
                ),
                parameters,
                retryable: false,
                fallback_options: None,
            },
            RecoveryStrategy::GracefulDegradation => Self {
                strategy: RecoveryStrategy::GracefulDegradation,
                description: format!("Proceed without the output of '{}'", error.tool_name),
                parameters,
                retryable: false,
                fallback_options: None,
            },
        }
    }

    pub fn delay_ms(&self) -> Option<u64> {
        self.parameters.get(DELAY_KEY).and_then(|v| v.as_u64())
    }

    pub fn retry_count(&self) -> Option<u32> {
        self.parameters
            .get(RETRY_COUNT_KEY)
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok())
    }

    pub fn requires_user_action(&self) -> bool {
        self.parameters
            .get(USER_ACTION_REQUIRED_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Outcome of executing a [`RecoveryAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryResult {
    pub success: bool,
    pub action: RecoveryAction,
    pub should_continue: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_approach: Option<String>,
}

impl RecoveryResult {
    /// Text to place in the conversation for the failed call.
    pub fn narrative(&self) -> String {
        self.alternative_approach
            .clone()
            .or_else(|| self.user_message.clone())
            .unwrap_or_else(|| self.action.description.clone())
    }
}

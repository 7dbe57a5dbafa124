//! Error classification as an ordered rule table.
//!
//! Rules are evaluated top to bottom against the lower-cased error text and the
//! first rule with a matching pattern wins. Text that matches nothing (or is empty)
//! classifies as [`ErrorKind::Unknown`].

use super::context::ToolCallContext;
use crate::tool::value_objects::ToolError;
use serde::{Deserialize, Serialize};

/// Delay (ms) suggested for rate-limited calls.
pub const RATE_LIMIT_DELAY_MS: u64 = 5000;

/// Detail key carrying a suggested delay in milliseconds.
pub const SUGGESTED_DELAY_KEY: &str = "suggestedDelay";

const UNKNOWN_CONFIDENCE: f64 = 0.3;
const EMPTY_TEXT_CONFIDENCE: f64 = 0.1;

/// Failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ToolNotFound,
    PermissionDenied,
    Timeout,
    InvalidParameters,
    RateLimit,
    NetworkError,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ToolNotFound => "TOOL_NOT_FOUND",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::InvalidParameters => "INVALID_PARAMETERS",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Categorical recovery policy chosen for a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryStrategy {
    Retry,
    FallbackTool,
    ParameterCorrection,
    UserIntervention,
    GracefulDegradation,
}

impl RecoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStrategy::Retry => "RETRY",
            RecoveryStrategy::FallbackTool => "FALLBACK_TOOL",
            RecoveryStrategy::ParameterCorrection => "PARAMETER_CORRECTION",
            RecoveryStrategy::UserIntervention => "USER_INTERVENTION",
            RecoveryStrategy::GracefulDegradation => "GRACEFUL_DEGRADATION",
        }
    }

    /// Whether the strategy re-invokes the same tool without model involvement.
    pub fn implies_automatic_retry(&self) -> bool {
        matches!(self, RecoveryStrategy::Retry)
    }
}

impl std::fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying a [`ToolError`]. Pure data, no side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorClassification {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub severity: Severity,
    pub recoverable: bool,
    pub suggested_strategy: RecoveryStrategy,
    /// Always within `[0, 1]`
    pub confidence: f64,
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ErrorClassification {
    /// Suggested delay in milliseconds, when the rule provides one.
    pub fn suggested_delay_ms(&self) -> Option<u64> {
        self.details
            .get(SUGGESTED_DELAY_KEY)
            .and_then(|v| v.as_u64())
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub kind: ErrorKind,
    /// Lower-case substrings; any one matching selects the rule
    pub patterns: &'static [&'static str],
    pub severity: Severity,
    pub recoverable: bool,
    pub strategy: RecoveryStrategy,
    pub confidence: f64,
    pub suggested_delay_ms: Option<u64>,
}

impl ClassificationRule {
    /// First pattern found in `lowered`, if any.
    pub fn matched_pattern(&self, lowered: &str) -> Option<&'static str> {
        self.patterns.iter().copied().find(|p| lowered.contains(p))
    }
}

/// Ordered classification table. Earlier rows take priority.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        kind: ErrorKind::ToolNotFound,
        patterns: &["tool not found"],
        severity: Severity::Medium,
        recoverable: true,
        strategy: RecoveryStrategy::FallbackTool,
        confidence: 0.95,
        suggested_delay_ms: None,
    },
    ClassificationRule {
        kind: ErrorKind::PermissionDenied,
        patterns: &["permission denied", "access denied"],
        severity: Severity::High,
        recoverable: false,
        strategy: RecoveryStrategy::UserIntervention,
        confidence: 0.95,
        suggested_delay_ms: None,
    },
    ClassificationRule {
        kind: ErrorKind::Timeout,
        patterns: &["timed out", "timeout"],
        severity: Severity::Medium,
        recoverable: true,
        strategy: RecoveryStrategy::Retry,
        confidence: 0.9,
        suggested_delay_ms: None,
    },
    ClassificationRule {
        kind: ErrorKind::InvalidParameters,
        patterns: &["invalid parameter", "validation failed"],
        severity: Severity::Low,
        recoverable: true,
        strategy: RecoveryStrategy::ParameterCorrection,
        confidence: 0.85,
        suggested_delay_ms: None,
    },
    ClassificationRule {
        kind: ErrorKind::RateLimit,
        patterns: &["rate limit", "too many requests"],
        severity: Severity::Low,
        recoverable: true,
        strategy: RecoveryStrategy::Retry,
        confidence: 0.9,
        suggested_delay_ms: Some(RATE_LIMIT_DELAY_MS),
    },
    ClassificationRule {
        kind: ErrorKind::NetworkError,
        patterns: &["network", "connection refused", "connection reset", "dns"],
        severity: Severity::Medium,
        recoverable: true,
        strategy: RecoveryStrategy::Retry,
        confidence: 0.85,
        suggested_delay_ms: None,
    },
];

/// Classify a tool failure against [`CLASSIFICATION_RULES`].
pub fn classify(error: &ToolError, context: &ToolCallContext) -> ErrorClassification {
    let lowered = error.error.trim().to_lowercase();

    let mut details = serde_json::Map::new();
    details.insert("toolName".into(), error.tool_name.clone().into());
    details.insert("roundNumber".into(), context.round_number.into());

    if !lowered.is_empty() {
        for rule in CLASSIFICATION_RULES {
            let Some(pattern) = rule.matched_pattern(&lowered) else {
                continue;
            };
            details.insert("matchedPattern".into(), pattern.into());
            if let Some(delay) = rule.suggested_delay_ms {
                details.insert(SUGGESTED_DELAY_KEY.into(), delay.into());
            }
            if rule.kind == ErrorKind::ToolNotFound {
                details.insert("availableTools".into(), context.tool_names().into());
            }
            return ErrorClassification {
                kind: rule.kind,
                severity: rule.severity,
                recoverable: rule.recoverable,
                suggested_strategy: rule.strategy,
                confidence: rule.confidence.clamp(0.0, 1.0),
                details,
            };
        }
    }

    let (confidence, reason) = if lowered.is_empty() {
        (EMPTY_TEXT_CONFIDENCE, "empty error text")
    } else {
        (UNKNOWN_CONFIDENCE, "no matching pattern")
    };
    details.insert("reason".into(), reason.into());

    ErrorClassification {
        kind: ErrorKind::Unknown,
        severity: Severity::Medium,
        recoverable: false,
        suggested_strategy: RecoveryStrategy::GracefulDegradation,
        confidence,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolDefinition;

    fn context() -> ToolCallContext {
        ToolCallContext::new("conv-1", "find the config")
            .with_tools(vec![
                ToolDefinition::new("read_file", "Read"),
                ToolDefinition::new("grep_search", "Grep"),
            ])
            .with_round(1)
    }

    fn classify_text(text: &str) -> ErrorClassification {
        classify(&ToolError::new("read_file", "call_1", text), &context())
    }

    #[test]
    fn test_tool_not_found() {
        let c = classify_text("tool not found: xyz");
        assert_eq!(c.kind, ErrorKind::ToolNotFound);
        assert_eq!(c.suggested_strategy, RecoveryStrategy::FallbackTool);
        assert!(c.confidence > 0.8);
        assert_eq!(
            c.details["availableTools"],
            serde_json::json!(["read_file", "grep_search"])
        );
    }

    #[test]
    fn test_permission_denied() {
        let c = classify_text("permission denied: access denied");
        assert_eq!(c.kind, ErrorKind::PermissionDenied);
        assert!(!c.recoverable);
        assert_eq!(c.suggested_strategy, RecoveryStrategy::UserIntervention);
        assert_eq!(c.severity, Severity::High);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify_text("Request TIMED OUT").kind, ErrorKind::Timeout);
        assert_eq!(
            classify_text("Access Denied for /root").kind,
            ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_first_rule_wins() {
        // Matches both TIMEOUT and RATE_LIMIT; TIMEOUT comes first
        let c = classify_text("rate limit exceeded, request timed out");
        assert_eq!(c.kind, ErrorKind::Timeout);
    }

    #[test]
    fn test_rate_limit_suggests_delay() {
        let c = classify_text("429 Too Many Requests");
        assert_eq!(c.kind, ErrorKind::RateLimit);
        assert_eq!(c.suggested_strategy, RecoveryStrategy::Retry);
        assert_eq!(c.suggested_delay_ms(), Some(RATE_LIMIT_DELAY_MS));
    }

    #[test]
    fn test_invalid_parameters_and_network() {
        assert_eq!(
            classify_text("validation failed: path is required").kind,
            ErrorKind::InvalidParameters
        );
        assert_eq!(
            classify_text("connection refused (os error 111)").kind,
            ErrorKind::NetworkError
        );
    }

    #[test]
    fn test_unknown_and_empty() {
        let c = classify_text("segfault in plugin");
        assert_eq!(c.kind, ErrorKind::Unknown);
        assert!(!c.recoverable);
        assert_eq!(c.suggested_strategy, RecoveryStrategy::GracefulDegradation);
        assert!(c.confidence <= 0.5);

        let empty = classify_text("   ");
        assert_eq!(empty.kind, ErrorKind::Unknown);
        assert!(empty.confidence < c.confidence);
    }

    #[test]
    fn test_confidence_bounds_and_retry_only_when_recoverable() {
        let samples = [
            "",
            "tool not found",
            "permission denied",
            "timeout",
            "invalid parameter",
            "rate limit",
            "dns lookup failed",
            "something else",
        ];
        for text in samples {
            let c = classify_text(text);
            assert!((0.0..=1.0).contains(&c.confidence), "{text}");
            if !c.recoverable {
                assert!(!c.suggested_strategy.implies_automatic_retry(), "{text}");
            }
        }
    }

    #[test]
    fn test_serialization_uses_type_field() {
        let json = serde_json::to_value(classify_text("timeout")).unwrap();
        assert_eq!(json["type"], "TIMEOUT");
        assert_eq!(json["suggested_strategy"], "RETRY");
        assert_eq!(json["severity"], "medium");
    }
}

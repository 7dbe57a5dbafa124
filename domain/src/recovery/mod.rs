//! Recovery domain module
//!
//! Pure decision logic for failed tool calls:
//!
//! ```text
//! ToolError + ToolCallContext
//!        │ classify()            (ordered rule table)
//!        ▼
//! ErrorClassification ──▶ RecoveryAction::plan() ──▶ RecoveryAction
//!                                                        │ executed by the application layer
//!                                                        ▼
//!                                                  RecoveryResult
//! ```
//!
//! History, budgets and the asynchronous execution of actions live in the
//! application layer's `ErrorRecoveryEngine`.

pub mod action;
pub mod classification;
pub mod context;
pub mod suggestions;

pub use action::{RecoveryAction, RecoveryResult};
pub use classification::{
    CLASSIFICATION_RULES, ClassificationRule, ErrorClassification, ErrorKind, RecoveryStrategy,
    Severity, classify,
};
pub use context::{ConversationId, ToolCallContext};
pub use suggestions::suggestions_for;

//! Execution domain module
//!
//! Records for work handed off to asynchronous actors, their lifecycle events,
//! and the text heuristics used to attribute completion signals back to them.

pub mod correlation;
pub mod entities;
pub mod events;

pub use correlation::{
    ContentMatch, CorrelationMethod, DEFAULT_OVERLAP_THRESHOLD, match_content, normalize,
    overlap_ratio, significant_words,
};
pub use entities::{
    CompletionSignal, CompletionStatus, ExecutionId, ExecutionRecord, ExecutionStatus,
};
pub use events::{ExecutionEvent, ExecutionEventKind};

//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod handle_completion;
pub mod orchestrate_conversation;
pub(crate) mod shared;
pub(crate) mod tool_helpers;

//! Conversation session domain.
//!
//! - [`entities::Message`]: a single message (system, user, assistant, tool result)
//! - [`entities::Conversation`]: the append-only message log of one run
//! - [`stream::StreamEvent`]: parts of a streaming model response

pub mod entities;
pub mod stream;

pub use entities::{Conversation, Message, Role};
pub use stream::StreamEvent;

//! Persistence of execution history between runs.

mod history_store;

pub use history_store::{HistoryStoreError, JsonHistoryStore};

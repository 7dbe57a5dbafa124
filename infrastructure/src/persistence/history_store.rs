//! Pretty-printed JSON file holding execution records.
//!
//! Pairs with [`ExecutionRegistry::snapshot`] and [`ExecutionRegistry::restore`]:
//! save on shutdown, load and restore on startup.
//!
//! [`ExecutionRegistry::snapshot`]: relay_application::ExecutionRegistry::snapshot
//! [`ExecutionRegistry::restore`]: relay_application::ExecutionRegistry::restore

use relay_application::RegistrySnapshot;
use relay_domain::ExecutionRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum HistoryStoreError {
    #[error("History file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("History file {path} is not valid: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records in the file, or none if it does not exist yet.
    pub fn load(&self) -> Result<Vec<ExecutionRecord>, HistoryStoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source)),
        };
        let records: Vec<ExecutionRecord> =
            serde_json::from_str(&content).map_err(|source| HistoryStoreError::Format {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), count = records.len(), "Loaded execution history");
        Ok(records)
    }

    /// Replace the file contents with `records`.
    ///
    /// Writes to a sibling temp file first so a crash never leaves a truncated file.
    pub fn save(&self, records: &[ExecutionRecord]) -> Result<(), HistoryStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(records).map_err(|source| HistoryStoreError::Format {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), count = records.len(), "Saved execution history");
        Ok(())
    }

    pub fn save_snapshot(&self, snapshot: RegistrySnapshot) -> Result<(), HistoryStoreError> {
        self.save(&snapshot.into_records())
    }

    fn io_error(&self, source: std::io::Error) -> HistoryStoreError {
        HistoryStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

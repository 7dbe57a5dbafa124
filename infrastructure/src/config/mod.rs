//! Configuration file loading for tool-relay
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TOOL_RELAY_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./tool-relay.toml` or `./.tool-relay.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/tool-relay/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileCacheConfig, FileConfig, FileLoggingConfig,
    FileOrchestratorConfig, FileRecoveryConfig, FileRegistryConfig,
};
pub use loader::ConfigLoader;

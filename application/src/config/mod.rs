//! Application-level configuration.
//!
//! This module provides the parameter types that control how services and use
//! cases behave:
//!
//! - [`OrchestratorParams`]: round loop control (ceiling, timeouts, parallelism)
//! - [`RecoveryPolicy`]: error ceilings and retry delays
//! - [`RegistryParams`]: execution timeout, history bound, correlation threshold
//! - [`CacheParams`]: result cache TTL
//! - [`RelayConfig`]: container for all four

pub mod orchestrator_params;
pub mod relay_config;
pub mod service_params;

pub use orchestrator_params::OrchestratorParams;
pub use relay_config::RelayConfig;
pub use service_params::{CacheParams, RecoveryPolicy, RegistryParams};

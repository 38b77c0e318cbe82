//! Error types.
//!
//! The simulation itself never fails; only loading configuration can.

use thiserror::Error;

/// Errors that can occur while loading a [`PhysicsConfig`](crate::PhysicsConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

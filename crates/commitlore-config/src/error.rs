//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid TOML syntax or shape.
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// A key holds a value the grammar cannot use.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid {
        /// The offending key, e.g. `stream.high_water_mark`.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

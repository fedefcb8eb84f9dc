//! Core error types for confsnap.
//!
//! Subsystem crates own their own error enums; this one covers what the
//! shared types and the run setup can fail with.

use thiserror::Error;

/// Central error type for all confsnap operations.
///
/// Per-file and per-application failures are recovered where they happen and
/// never reach this type; what does reach it is either a validation failure
/// of an input value or a fatal condition for the whole run.
#[derive(Error, Debug)]
pub enum ConfsnapError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A required filesystem root is absent (home directory, rules directory)
    #[error("{what} not found at {path}")]
    NotFound {
        /// What was expected at the path
        what: String,
        /// Path that was checked
        path: String,
    },

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `ConfsnapError`.
pub type Result<T> = std::result::Result<T, ConfsnapError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

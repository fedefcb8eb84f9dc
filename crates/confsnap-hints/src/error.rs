//! Error types for the hints subsystem.

use thiserror::Error;

/// Errors that can occur in hints database operations.
#[derive(Error, Debug)]
pub enum HintsError {
    /// No hint entry for the key
    #[error("hint entry not found: {key}")]
    NotFound {
        /// The application key that was not found
        key: String,
    },

    /// Failed to read a hints document
    #[error("failed to load hints database from {path}: {source}")]
    LoadError {
        /// Path to the hints document
        path: String,
        /// Underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The hints document is not valid TOML
    #[error("failed to parse hints TOML in {path}: {source}")]
    ParseError {
        /// Path to the hints document
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// A single hint entry failed validation
    #[error("invalid hint entry for {key}: {reason}")]
    ValidationError {
        /// Key of the rejected entry
        key: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Hints database path does not exist
    #[error("hints database not found at {path}")]
    PathNotFound {
        /// Expected file or directory path
        path: String,
    },

    /// I/O error while accessing the hints database
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid application key
    #[error("invalid application key: {0}")]
    InvalidKey(#[from] confsnap_core::ConfsnapError),
}

/// Result type for hints operations.
pub type Result<T> = std::result::Result<T, HintsError>;

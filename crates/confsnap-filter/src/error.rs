//! Error types for the filter subsystem.

use thiserror::Error;

/// Errors that can occur while loading or compiling filter rules.
#[derive(Error, Debug)]
pub enum FilterError {
    /// A named rule could not be compiled
    #[error("invalid pattern {name}: {reason}")]
    InvalidPattern {
        /// Rule name or the raw pattern
        name: String,
        /// Why compilation failed
        reason: String,
    },

    /// A rule file is not valid TOML
    #[error("failed to parse rules TOML in {path}: {source}")]
    ParseError {
        /// Path to the rule file
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// A binary property list could not be converted to XML
    #[error("invalid property list: {reason}")]
    Plist {
        /// Decoder or encoder error
        reason: String,
    },

    /// I/O error while reading a rule file or a candidate file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilterError {
    pub(crate) fn plist(error: impl std::fmt::Display) -> Self {
        Self::Plist {
            reason: error.to_string(),
        }
    }
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;

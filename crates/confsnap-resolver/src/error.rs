//! Error types for discovery and research.

use thiserror::Error;

/// Errors raised by a research collaborator.
///
/// None of these are fatal to a run: the resolver turns every research error
/// into an undiscovered entry with reason `tier3_inconclusive`.
#[derive(Error, Debug)]
pub enum ResearchError {
    /// The collaborator ran but produced nothing usable
    #[error("research inconclusive for {key}: {reason}")]
    Inconclusive {
        /// Application key
        key: String,
        /// What was missing
        reason: String,
    },

    /// The external research command could not be started
    #[error("failed to start research command {command}: {source}")]
    Spawn {
        /// Program that was launched
        command: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The external research command exited unsuccessfully
    #[error("research command {command} exited with {status}: {stderr}")]
    CommandFailed {
        /// Program that was launched
        command: String,
        /// Exit status description
        status: String,
        /// Trimmed standard error output
        stderr: String,
    },

    /// The collaborator's answer could not be decoded
    #[error("invalid research response: {reason}")]
    InvalidResponse {
        /// Decoding error
        reason: String,
    },

    /// The collaborator reported a failure
    #[error("researcher {researcher} failed: {reason}")]
    Failed {
        /// Researcher identifier
        researcher: String,
        /// Failure description
        reason: String,
    },

    /// A research fixture could not be loaded
    #[error("failed to load research fixture {path}: {reason}")]
    Fixture {
        /// Fixture path
        path: String,
        /// Why loading failed
        reason: String,
    },

    /// I/O error while talking to the collaborator
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur in the resolver crate outside of research.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Research error
    #[error("research error: {0}")]
    Research(#[from] ResearchError),

    /// Hints store error
    #[error("hints error: {0}")]
    Hints(#[from] confsnap_hints::HintsError),

    /// Report serialization failed
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// I/O error while writing a report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for research operations.
pub type ResearchResult<T> = std::result::Result<T, ResearchError>;

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;

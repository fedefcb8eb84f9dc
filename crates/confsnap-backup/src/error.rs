//! Error types for the backup executor.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while materializing a backup.
///
/// Per-file errors are caught by the executor and recorded as
/// `skipped_error`; only a failure to create the backup root is returned to
/// the caller.
#[derive(Error, Debug)]
pub enum BackupError {
    /// A directory in the backup tree could not be created
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be read or a destination written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path the operation failed on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A binary property list could not be converted to XML
    #[error("failed to convert {} to XML: {reason}", path.display())]
    Convert {
        /// Property list path
        path: PathBuf,
        /// Decoder error
        reason: String,
    },

    /// The directory walk failed on an entry
    #[error("walk error at {}: {reason}", path.display())]
    Walk {
        /// Entry path, or the walk root when unknown
        path: PathBuf,
        /// Walk error description
        reason: String,
    },
}

impl BackupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for backup operations.
pub type Result<T> = std::result::Result<T, BackupError>;

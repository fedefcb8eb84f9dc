//! Error types for the snapshot aggregator.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading inventory or writing snapshot artifacts.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The inventory file could not be read
    #[error("failed to read inventory {}: {source}", path.display())]
    Read {
        /// Inventory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The inventory file is not valid TOML or JSON
    #[error("failed to parse inventory {}: {reason}", path.display())]
    Parse {
        /// Inventory path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// An artifact could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Artifact path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Snapshot serialization failed
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SnapshotError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnapshotError::Parse {
            path: PathBuf::from("inventory.toml"),
            reason: "expected `=`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse inventory inventory.toml: expected `=`"
        );
    }
}

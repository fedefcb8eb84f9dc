//! Why a candidate path was kept out of the backup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy reason for excluding a path.
///
/// These are decisions, not errors: an excluded path is expected behaviour
/// and is counted, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExcludeReason {
    /// A path component is an excluded directory name (cache, logs, ...)
    ExcludedDirectory {
        /// The matching component
        name: String,
    },
    /// The path matches an exclude glob
    ExcludeGlob {
        /// The matching glob
        pattern: String,
    },
    /// The file is larger than the size ceiling
    SizeLimitExceeded {
        /// File size in bytes
        size: u64,
        /// Ceiling in bytes
        limit: u64,
    },
    /// The file's extension or name is not on the allow-list
    ExtensionNotAllowed {
        /// File name that was checked
        file_name: String,
    },
    /// The path matches an exclusion from the application's hint entry
    HintExclusion {
        /// The matching pattern
        pattern: String,
    },
    /// The path matches the security `exclude_files` list
    ProtectedFile {
        /// The matching pattern
        pattern: String,
    },
    /// The content is private-key material
    PrivateKey,
    /// The content matches credential patterns and secrets are excluded
    SecretDetected {
        /// Names of the matching patterns
        patterns: Vec<String>,
    },
    /// A symbolic link resolves outside the home directory
    SymlinkOutsideHome,
}

impl ExcludeReason {
    /// Whether this exclusion is a security decision rather than a content filter.
    #[must_use]
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            Self::ProtectedFile { .. } | Self::PrivateKey | Self::SecretDetected { .. }
        )
    }
}

impl fmt::Display for ExcludeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcludedDirectory { name } => write!(f, "inside excluded directory: {name}"),
            Self::ExcludeGlob { pattern } => write!(f, "matches exclude pattern: {pattern}"),
            Self::SizeLimitExceeded { size, limit } => {
                write!(f, "file too large: {size} bytes (max {limit})")
            }
            Self::ExtensionNotAllowed { file_name } => {
                write!(f, "not a recognised config file: {file_name}")
            }
            Self::HintExclusion { pattern } => write!(f, "excluded by hint: {pattern}"),
            Self::ProtectedFile { pattern } => write!(f, "protected file: {pattern}"),
            Self::PrivateKey => write!(f, "private key material"),
            Self::SecretDetected { patterns } => {
                write!(f, "contains secrets: {}", patterns.join(", "))
            }
            Self::SymlinkOutsideHome => write!(f, "symlink resolves outside home"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_display() {
        let reason = ExcludeReason::SizeLimitExceeded {
            size: 15_728_640,
            limit: 10_485_760,
        };
        assert_eq!(
            reason.to_string(),
            "file too large: 15728640 bytes (max 10485760)"
        );
        assert!(!reason.is_secret());
        assert!(ExcludeReason::PrivateKey.is_secret());
    }
}

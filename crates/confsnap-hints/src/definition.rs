//! Hint entry types and validation.
//!
//! A hint entry is a curated, trusted mapping from an application key to the
//! configuration paths that application uses.

use crate::error::{HintsError, Result};
use confsnap_core::{AppKey, InstallMethod, Roots};
use globset::Glob;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// On-disk shape of one hints database entry.
///
/// Field names follow the database format; [`HintEntry`] is the validated form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HintRecord {
    /// macOS bundle identifier (absent for CLI tools)
    #[serde(default)]
    pub bundle_id: Option<String>,

    /// Install method name
    #[serde(default)]
    pub install_method: Option<String>,

    /// Paths relative to the home directory
    #[serde(default)]
    pub configuration_files: Vec<String>,

    /// Paths relative to the XDG configuration root
    #[serde(default)]
    pub xdg_configuration_files: Vec<String>,

    /// Globs of files under the configured paths that must not be backed up
    #[serde(default)]
    pub exclude_files: Vec<String>,

    /// Free-form notes for maintainers
    #[serde(default)]
    pub notes: Option<String>,
}

/// A validated tier-1 hint entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintEntry {
    /// Application key this entry applies to
    pub key: AppKey,
    /// macOS bundle identifier
    pub bundle_id: Option<String>,
    /// How the application is usually installed
    pub install_method: InstallMethod,
    /// Home-relative configuration paths, in declaration order
    pub home_relative_paths: Vec<String>,
    /// XDG-relative configuration paths, in declaration order
    pub xdg_relative_paths: Vec<String>,
    /// Exclusion globs applied while walking the configured paths
    pub exclude_patterns: Vec<String>,
    /// Maintainer notes
    pub notes: Option<String>,
}

impl HintEntry {
    /// Build and validate an entry from its database record.
    ///
    /// # Errors
    /// Returns `ValidationError` if the record breaks any entry rule.
    pub fn from_record(key: AppKey, record: HintRecord) -> Result<Self> {
        let install_method = match record.install_method.as_deref() {
            None => InstallMethod::Unknown,
            Some(raw) => raw.parse().map_err(|_| HintsError::ValidationError {
                key: key.to_string(),
                reason: format!("unknown install_method '{raw}'"),
            })?,
        };

        let entry = Self {
            key,
            bundle_id: record.bundle_id.filter(|id| !id.trim().is_empty()),
            install_method,
            home_relative_paths: record.configuration_files,
            xdg_relative_paths: record.xdg_configuration_files,
            exclude_patterns: record.exclude_files,
            notes: record.notes,
        };

        entry.validate()?;
        Ok(entry)
    }

    /// Validate the entry.
    ///
    /// # Errors
    /// Returns `ValidationError` if:
    /// - both path lists are empty
    /// - any path is absolute, home-anchored, or contains `..`
    /// - any exclude pattern is absolute or not a valid glob
    pub fn validate(&self) -> Result<()> {
        if self.home_relative_paths.is_empty() && self.xdg_relative_paths.is_empty() {
            return Err(self.invalid(
                "must have configuration_files or xdg_configuration_files".to_string(),
            ));
        }

        for path in self.home_relative_paths.iter().chain(&self.xdg_relative_paths) {
            check_relative_path(path).map_err(|reason| self.invalid(reason))?;
        }

        for pattern in &self.exclude_patterns {
            if pattern.starts_with('/') {
                return Err(self.invalid(format!(
                    "absolute path not allowed in exclude_files: {pattern}"
                )));
            }
            Glob::new(pattern).map_err(|e| {
                self.invalid(format!("invalid exclude_files pattern '{pattern}': {e}"))
            })?;
        }

        Ok(())
    }

    /// Resolve the configured paths to absolute paths, home paths first.
    ///
    /// Existence is not checked here.
    #[must_use]
    pub fn resolve_paths(&self, roots: &Roots) -> Vec<PathBuf> {
        let home = self
            .home_relative_paths
            .iter()
            .map(|p| roots.home().join(trim_dir_marker(p)));
        let xdg = self
            .xdg_relative_paths
            .iter()
            .map(|p| roots.xdg_config_home().join(trim_dir_marker(p)));
        home.chain(xdg).collect()
    }

    /// Total number of configured paths.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.home_relative_paths.len() + self.xdg_relative_paths.len()
    }

    fn invalid(&self, reason: String) -> HintsError {
        HintsError::ValidationError {
            key: self.key.to_string(),
            reason,
        }
    }
}

/// Check that a configured path is relative and stays inside its root.
///
/// Returns the reason on failure.
pub fn check_relative_path(path: &str) -> std::result::Result<(), String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err("empty path".to_string());
    }
    if trimmed.starts_with('~') || trimmed.starts_with('$') {
        return Err(format!("home marker not allowed, use a relative path: {path}"));
    }
    if Path::new(trimmed).is_absolute() || trimmed.starts_with('/') {
        return Err(format!("absolute path not allowed: {path}"));
    }
    if Path::new(trimmed)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(format!("path traversal (..) not allowed: {path}"));
    }
    Ok(())
}

fn trim_dir_marker(path: &str) -> &str {
    let trimmed = path.trim();
    let stripped = trimmed.trim_end_matches('/');
    if stripped.is_empty() {
        trimmed
    } else {
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(paths: &[&str]) -> HintRecord {
        HintRecord {
            bundle_id: Some("com.googlecode.iterm2".to_string()),
            install_method: Some("cask".to_string()),
            configuration_files: paths.iter().map(ToString::to_string).collect(),
            ..HintRecord::default()
        }
    }

    fn key(raw: &str) -> AppKey {
        AppKey::new(raw).expect("valid key")
    }

    #[test]
    fn test_from_record_valid() {
        let entry = HintEntry::from_record(
            key("iterm2"),
            record(&["Library/Preferences/com.googlecode.iterm2.plist"]),
        )
        .expect("valid entry");

        assert_eq!(entry.install_method, InstallMethod::Cask);
        assert_eq!(entry.path_count(), 1);
    }

    #[test]
    fn test_rejects_entry_without_paths() {
        let result = HintEntry::from_record(key("empty"), record(&[]));
        assert!(matches!(
            result.unwrap_err(),
            HintsError::ValidationError { .. }
        ));
    }

    #[test]
    fn test_rejects_non_relative_paths() {
        for bad in ["/etc/hosts", "~/.zshrc", "$HOME/.zshrc", "../outside", "a/../../b"] {
            let result = HintEntry::from_record(key("bad"), record(&[bad]));
            assert!(result.is_err(), "Should fail for: {bad}");
        }
    }

    #[test]
    fn test_rejects_unknown_install_method() {
        let mut rec = record(&[".vimrc"]);
        rec.install_method = Some("pkg".to_string());
        assert!(HintEntry::from_record(key("vim"), rec).is_err());
    }

    #[test]
    fn test_rejects_invalid_exclude_glob() {
        let mut rec = record(&[".config/app"]);
        rec.exclude_files = vec!["[unclosed".to_string()];
        assert!(HintEntry::from_record(key("app"), rec).is_err());
    }

    #[test]
    fn test_resolve_paths_order() {
        let tmp = TempDir::new().expect("create temp dir");
        let roots = Roots::new(tmp.path(), None).expect("create roots");

        let mut rec = record(&[".gitconfig"]);
        rec.xdg_configuration_files = vec!["git/".to_string()];
        let entry = HintEntry::from_record(key("git"), rec).expect("valid entry");

        let paths = entry.resolve_paths(&roots);
        assert_eq!(
            paths,
            vec![
                tmp.path().join(".gitconfig"),
                tmp.path().join(".config").join("git"),
            ]
        );
    }
}

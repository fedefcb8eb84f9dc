//! Pattern filter for convention-derived and researched paths.
//!
//! The filter is a pure function of `(path, size, is_directory)`. Rules are
//! applied in priority order:
//!
//! 1. exclude rules (excluded directory names, exclude globs)
//! 2. size ceiling
//! 3. allow-list for files (extension, safe file name, dotfile suffix)
//!
//! Directories that pass are walked and every descendant is evaluated again.
//! Curated tier-1 paths never reach this filter.

use crate::globs::PatternList;
use crate::reason::ExcludeReason;
use crate::rules::PatternRules;
use confsnap_core::config::DEFAULT_MAX_FILE_SIZE_BYTES;
use std::collections::HashSet;
use std::path::{Component, Path};
use tracing::warn;

/// Outcome of evaluating one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// The path is configuration and may be backed up
    Include,
    /// The path is kept out of the backup
    Exclude(ExcludeReason),
}

impl FilterDecision {
    /// Whether the decision is `Include`.
    #[must_use]
    pub fn is_include(&self) -> bool {
        matches!(self, Self::Include)
    }
}

/// Classifies candidate paths as configuration or not.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    allowed_extensions: HashSet<String>,
    safe_filenames: HashSet<String>,
    dotfile_suffixes: Vec<String>,
    excluded_directories: HashSet<String>,
    exclude_globs: PatternList,
    max_file_size: u64,
}

impl Default for PatternFilter {
    fn default() -> Self {
        Self::new(&PatternRules::default())
    }
}

impl PatternFilter {
    /// Build a filter from rules. Invalid globs are logged and dropped.
    #[must_use]
    pub fn new(rules: &PatternRules) -> Self {
        let (exclude_globs, errors) = PatternList::lenient(&rules.exclude_globs);
        for e in errors {
            warn!(error = %e, "skipping invalid exclude glob");
        }

        Self {
            allowed_extensions: rules
                .allowed_extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            safe_filenames: rules
                .safe_filenames
                .iter()
                .map(|name| name.to_lowercase())
                .collect(),
            dotfile_suffixes: rules
                .dotfile_suffixes
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            excluded_directories: rules
                .excluded_directories
                .iter()
                .map(|d| d.trim_end_matches('/').to_lowercase())
                .collect(),
            exclude_globs,
            max_file_size: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }

    /// Set the size ceiling in bytes.
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// The size ceiling in bytes.
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Evaluate one path.
    ///
    /// `path` should be relative to the scan base (the home directory) so
    /// that directory-name rules only look at components below it.
    #[must_use]
    pub fn evaluate(&self, path: &Path, size: u64, is_dir: bool) -> FilterDecision {
        if let Some(name) = self.excluded_component(path, is_dir) {
            return FilterDecision::Exclude(ExcludeReason::ExcludedDirectory { name });
        }

        if let Some(pattern) = self.exclude_globs.first_match(path) {
            return FilterDecision::Exclude(ExcludeReason::ExcludeGlob {
                pattern: pattern.to_string(),
            });
        }

        if is_dir {
            return FilterDecision::Include;
        }

        if size > self.max_file_size {
            return FilterDecision::Exclude(ExcludeReason::SizeLimitExceeded {
                size,
                limit: self.max_file_size,
            });
        }

        if self.is_allowed_file(path) {
            FilterDecision::Include
        } else {
            FilterDecision::Exclude(ExcludeReason::ExtensionNotAllowed {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
        }
    }

    /// First directory component of `path` that is on the exclusion list.
    ///
    /// For files the final component (the file name) is not checked.
    fn excluded_component(&self, path: &Path, is_dir: bool) -> Option<String> {
        let components: Vec<&std::ffi::OsStr> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name),
                _ => None,
            })
            .collect();

        let checked = if is_dir {
            &components[..]
        } else {
            &components[..components.len().saturating_sub(1)]
        };

        checked
            .iter()
            .map(|name| name.to_string_lossy())
            .find(|name| self.excluded_directories.contains(&name.to_lowercase()))
            .map(|name| name.into_owned())
    }

    fn is_allowed_file(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
            return false;
        };

        if self.safe_filenames.contains(&file_name) {
            return true;
        }

        if let Some(ext) = path.extension() {
            let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
            if self.allowed_extensions.contains(&ext) {
                return true;
            }
        }

        // Dotfiles like `.zshrc`, `.npmrc`, `.bash_profile`
        file_name.starts_with('.')
            && !file_name.starts_with("..")
            && self
                .dotfile_suffixes
                .iter()
                .any(|suffix| file_name.ends_with(suffix.as_str()))
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn filter() -> PatternFilter {
        PatternFilter::default()
    }

    #[test]
    fn test_includes_allow_listed_extension() {
        let decision = filter().evaluate(
            Path::new("Library/Application Support/ExampleApp/settings.json"),
            2048,
            false,
        );
        assert_eq!(decision, FilterDecision::Include);
    }

    #[test]
    fn test_excludes_cache_directory() {
        let decision = filter().evaluate(
            Path::new("Library/Application Support/ExampleApp/Cache"),
            0,
            true,
        );
        assert_eq!(
            decision,
            FilterDecision::Exclude(ExcludeReason::ExcludedDirectory {
                name: "Cache".to_string()
            })
        );
    }

    #[test]
    fn test_excludes_files_below_excluded_directory() {
        let decision = filter().evaluate(Path::new(".myapp/logs/today.json"), 10, false);
        assert!(matches!(
            decision,
            FilterDecision::Exclude(ExcludeReason::ExcludedDirectory { .. })
        ));
    }

    #[test]
    fn test_exclude_glob_wins_over_size() {
        // 15 MiB database: the glob is checked before the size ceiling
        let decision = filter().evaluate(Path::new(".myapp/store.db"), 15 * MIB, false);
        assert_eq!(
            decision,
            FilterDecision::Exclude(ExcludeReason::ExcludeGlob {
                pattern: "**/*.db".to_string()
            })
        );
    }

    #[test]
    fn test_size_ceiling() {
        let limit = 10 * MIB;
        let at_limit = filter().evaluate(Path::new(".myapp/big.json"), limit, false);
        assert_eq!(at_limit, FilterDecision::Include);

        let over = filter().evaluate(Path::new(".myapp/big.json"), limit + 1, false);
        assert_eq!(
            over,
            FilterDecision::Exclude(ExcludeReason::SizeLimitExceeded {
                size: limit + 1,
                limit
            })
        );
    }

    #[test]
    fn test_custom_size_ceiling() {
        let small = filter().with_max_file_size(1024);
        assert!(!small.evaluate(Path::new("a.json"), 2048, false).is_include());
        assert_eq!(small.max_file_size(), 1024);
    }

    #[test]
    fn test_extension_not_allowed() {
        let decision = filter().evaluate(Path::new(".myapp/bin/helper"), 100, false);
        assert_eq!(
            decision,
            FilterDecision::Exclude(ExcludeReason::ExtensionNotAllowed {
                file_name: "helper".to_string()
            })
        );
    }

    #[test]
    fn test_safe_filenames_and_dotfiles() {
        let f = filter();
        assert!(f.evaluate(Path::new(".config/ghostty/config"), 10, false).is_include());
        assert!(f.evaluate(Path::new(".npmrc"), 10, false).is_include());
        assert!(f.evaluate(Path::new(".bash_profile"), 10, false).is_include());
        assert!(f.evaluate(Path::new(".tmux.conf"), 10, false).is_include());
        assert!(!f.evaluate(Path::new(".viminfo"), 10, false).is_include());
    }

    #[test]
    fn test_case_insensitive_rules() {
        let f = filter();
        assert!(f.evaluate(Path::new("App/Settings.JSON"), 10, false).is_include());
        assert!(!f.evaluate(Path::new("App/CACHES"), 0, true).is_include());
        assert!(!f.evaluate(Path::new("App/.ds_store"), 10, false).is_include());
    }

    #[test]
    fn test_directories_ignore_allow_list() {
        assert!(filter()
            .evaluate(Path::new("Library/Application Support/ExampleApp"), 0, true)
            .is_include());
    }
}

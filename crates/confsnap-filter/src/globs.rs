//! Compiled glob lists that remember which pattern matched.

use crate::error::{FilterError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

/// A set of case-insensitive globs.
///
/// Patterns without a `/` match the file name alone; patterns with a `/`
/// match anywhere in the path (`.aws/credentials` matches
/// `/home/u/.aws/credentials`).
#[derive(Debug, Clone)]
pub struct PatternList {
    name_set: GlobSet,
    name_sources: Vec<String>,
    path_set: GlobSet,
    path_sources: Vec<String>,
}

impl PatternList {
    /// Compile all patterns, failing on the first invalid one.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if a pattern is not a valid glob.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut name_builder = GlobSetBuilder::new();
        let mut path_builder = GlobSetBuilder::new();
        let mut name_sources = Vec::new();
        let mut path_sources = Vec::new();

        for pattern in patterns {
            let trimmed = pattern.trim().trim_end_matches('/');
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.contains('/') {
                let anchored = if trimmed.starts_with("**/") {
                    trimmed.to_string()
                } else {
                    format!("**/{trimmed}")
                };
                path_builder.add(compile(&anchored, pattern)?);
                path_sources.push(pattern.clone());
            } else {
                name_builder.add(compile(trimmed, pattern)?);
                name_sources.push(pattern.clone());
            }
        }

        Ok(Self {
            name_set: build(name_builder)?,
            name_sources,
            path_set: build(path_builder)?,
            path_sources,
        })
    }

    /// Compile the patterns, dropping invalid ones.
    ///
    /// Returns the list and the errors for the patterns that were dropped.
    #[must_use]
    pub fn lenient(patterns: &[String]) -> (Self, Vec<FilterError>) {
        let mut valid = Vec::new();
        let mut errors = Vec::new();

        for pattern in patterns {
            match Self::new(std::slice::from_ref(pattern)) {
                Ok(_) => valid.push(pattern.clone()),
                Err(e) => errors.push(e),
            }
        }

        let list = Self::new(&valid).unwrap_or_else(|_| Self::empty());
        (list, errors)
    }

    /// A list that matches nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            name_set: GlobSet::empty(),
            name_sources: Vec::new(),
            path_set: GlobSet::empty(),
            path_sources: Vec::new(),
        }
    }

    /// Whether the list has no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name_sources.is_empty() && self.path_sources.is_empty()
    }

    /// The first pattern (in declaration order) that matches `path`.
    #[must_use]
    pub fn first_match(&self, path: &Path) -> Option<&str> {
        if let Some(name) = path.file_name() {
            if let Some(idx) = self.name_set.matches(Path::new(name)).into_iter().min() {
                return Some(self.name_sources[idx].as_str());
            }
        }

        self.path_set
            .matches(path)
            .into_iter()
            .min()
            .map(|idx| self.path_sources[idx].as_str())
    }
}

fn compile(glob: &str, source: &str) -> Result<globset::Glob> {
    GlobBuilder::new(glob)
        .case_insensitive(true)
        .build()
        .map_err(|e| FilterError::InvalidPattern {
            name: source.to_string(),
            reason: e.to_string(),
        })
}

fn build(builder: GlobSetBuilder) -> Result<GlobSet> {
    builder.build().map_err(|e| FilterError::InvalidPattern {
        name: "glob set".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(patterns: &[&str]) -> PatternList {
        let owned: Vec<String> = patterns.iter().map(ToString::to_string).collect();
        PatternList::new(&owned).expect("valid patterns")
    }

    #[test]
    fn test_name_patterns_match_file_name() {
        let patterns = list(&["id_rsa*", "*.pem"]);
        assert_eq!(
            patterns.first_match(Path::new("/home/u/.ssh/id_rsa.pub")),
            Some("id_rsa*")
        );
        assert_eq!(patterns.first_match(Path::new("certs/Server.PEM")), Some("*.pem"));
        assert_eq!(patterns.first_match(Path::new(".ssh/config")), None);
    }

    #[test]
    fn test_path_patterns_match_suffix() {
        let patterns = list(&[".aws/credentials", "workspaceStorage/**"]);
        assert_eq!(
            patterns.first_match(Path::new("/home/u/.aws/credentials")),
            Some(".aws/credentials")
        );
        assert_eq!(
            patterns.first_match(Path::new("Code/User/workspaceStorage/abc/state.json")),
            Some("workspaceStorage/**")
        );
        assert_eq!(patterns.first_match(Path::new("/home/u/.aws/config")), None);
    }

    #[test]
    fn test_lenient_drops_invalid() {
        let (patterns, errors) =
            PatternList::lenient(&["*.log".to_string(), "[broken".to_string()]);
        assert_eq!(errors.len(), 1);
        assert_eq!(patterns.first_match(Path::new("app.log")), Some("*.log"));
    }

    #[test]
    fn test_empty_list() {
        let patterns = PatternList::empty();
        assert!(patterns.is_empty());
        assert_eq!(patterns.first_match(Path::new("anything")), None);
    }
}

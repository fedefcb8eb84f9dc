//! Tier-2 candidate generation from standard OS configuration locations.
//!
//! The scanner substitutes variations of an application's display name and
//! bundle identifier into a fixed list of templates and keeps the candidates
//! that exist on disk. It only reads the filesystem.

use confsnap_core::{ApplicationIdentity, Roots};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

static WORD_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("word separator regex is valid"));

/// Home-relative templates filled with a name variation.
const NAME_TEMPLATES: &[&str] = &[".{}", "Library/Application Support/{}"];

/// Home-relative templates filled with a bundle-id variation.
const BUNDLE_TEMPLATES: &[&str] = &[
    "Library/Application Support/{}",
    "Library/Preferences/{}.plist",
    "Library/Containers/{}",
    "Library/Containers/{}/Data/Library/Preferences",
    "Library/Containers/{}/Data/Library/Application Support",
    "Library/Group Containers/{}",
    "Library/Group Containers/group.{}",
];

/// Outcome of a convention scan for one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConventionScan {
    /// Candidates that exist, de-duplicated, in template order
    pub found: Vec<PathBuf>,
    /// Every candidate that was checked
    pub checked: Vec<PathBuf>,
}

/// Generates and verifies convention-derived configuration paths.
#[derive(Debug, Clone)]
pub struct ConventionScanner {
    roots: Roots,
}

impl ConventionScanner {
    /// Create a scanner rooted at the given home and XDG directories.
    #[must_use]
    pub fn new(roots: Roots) -> Self {
        Self { roots }
    }

    /// All candidate paths for an identity, without touching the filesystem.
    #[must_use]
    pub fn candidates(&self, identity: &ApplicationIdentity) -> Vec<PathBuf> {
        let home = self.roots.home();
        let xdg = self.roots.xdg_config_home();
        let names = name_variations(identity.display_name());
        let bundles = identity
            .bundle_id
            .as_deref()
            .map(bundle_variations)
            .unwrap_or_default();

        let mut candidates = Vec::new();
        for name in &names {
            for template in NAME_TEMPLATES {
                candidates.push(home.join(template.replace("{}", name)));
            }
        }
        for bundle in &bundles {
            for template in BUNDLE_TEMPLATES {
                candidates.push(home.join(template.replace("{}", bundle)));
            }
        }
        for name in &names {
            candidates.push(xdg.join(name));
        }

        let mut seen = HashSet::new();
        candidates.retain(|path| seen.insert(path.clone()));
        candidates
    }

    /// Scan for existing convention paths.
    #[must_use]
    pub fn scan(&self, identity: &ApplicationIdentity) -> ConventionScan {
        let checked = self.candidates(identity);
        let mut found: Vec<PathBuf> = Vec::new();
        let mut accepted: Vec<PathBuf> = Vec::new();
        let mut seen = HashSet::new();

        for candidate in &checked {
            if !candidate.exists() {
                continue;
            }

            // Case-insensitive filesystems report every casing as present
            let canonical = candidate
                .canonicalize()
                .unwrap_or_else(|_| candidate.clone());
            if !seen.insert(canonical.to_string_lossy().to_lowercase()) {
                continue;
            }

            if accepted.iter().any(|parent| canonical.starts_with(parent)) {
                debug!(path = %candidate.display(), "skipping nested candidate");
                continue;
            }

            // A later ancestor replaces descendants accepted earlier
            let mut idx = 0;
            while idx < accepted.len() {
                if accepted[idx].starts_with(&canonical) {
                    accepted.remove(idx);
                    found.remove(idx);
                } else {
                    idx += 1;
                }
            }

            debug!(key = %identity.key, path = %candidate.display(), "convention candidate exists");
            accepted.push(canonical);
            found.push(candidate.clone());
        }

        ConventionScan { found, checked }
    }

    /// The roots this scanner resolves against.
    #[must_use]
    pub fn roots(&self) -> &Roots {
        &self.roots
    }
}

/// Variations of a display name, in search order, without duplicates.
#[must_use]
pub fn name_variations(name: &str) -> Vec<String> {
    let name = name.trim();
    if name.is_empty() {
        return Vec::new();
    }

    let lower = name.to_lowercase();
    let words: Vec<String> = WORD_SEPARATOR
        .split(&lower)
        .filter(|w| !w.is_empty())
        .map(ToString::to_string)
        .collect();

    let mut variations = vec![
        name.to_string(),
        words.join("-"),
        words.concat(),
        words.join("_"),
    ];
    if let Some(first) = words.first().filter(|w| w.len() > 2) {
        variations.push(first.clone());
    }
    if let Some(last) = words.last().filter(|w| w.len() > 2) {
        variations.push(last.clone());
    }
    variations.push(lower);

    dedup(variations)
}

/// Variations of a bundle identifier, in search order, without duplicates.
#[must_use]
pub fn bundle_variations(bundle_id: &str) -> Vec<String> {
    let bundle_id = bundle_id.trim();
    if bundle_id.is_empty() {
        return Vec::new();
    }

    let parts: Vec<&str> = bundle_id.split('.').filter(|p| !p.is_empty()).collect();
    let mut variations = vec![bundle_id.to_string()];

    if let Some(last) = parts.last() {
        variations.push((*last).to_string());
        variations.push(last.to_lowercase());
    }
    if parts.len() >= 2 {
        variations.push(parts[parts.len() - 2..].join("."));
    }

    dedup(variations)
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| !v.is_empty() && !is_relative_marker(v) && seen.insert(v.clone()))
        .collect()
}

fn is_relative_marker(value: &str) -> bool {
    Path::new(value)
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsnap_core::InstallMethod;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ConventionScanner) {
        let tmp = TempDir::new().expect("create temp dir");
        let roots = Roots::new(tmp.path(), None).expect("roots");
        (tmp, ConventionScanner::new(roots))
    }

    fn identity(name: &str, bundle_id: Option<&str>) -> ApplicationIdentity {
        ApplicationIdentity::new(name, bundle_id.map(String::from), InstallMethod::Cask)
            .expect("valid identity")
    }

    #[test]
    fn test_name_variations() {
        assert_eq!(
            name_variations("Visual Studio Code"),
            vec![
                "Visual Studio Code",
                "visual-studio-code",
                "visualstudiocode",
                "visual_studio_code",
                "visual",
                "code",
                "visual studio code",
            ]
        );
    }

    #[test]
    fn test_name_variations_short_words_and_duplicates() {
        // "go" is too short to be used on its own
        assert_eq!(name_variations("go"), vec!["go"]);
        assert_eq!(name_variations("ExampleApp"), vec!["ExampleApp", "exampleapp"]);
        assert!(name_variations("  ").is_empty());
    }

    #[test]
    fn test_bundle_variations() {
        assert_eq!(
            bundle_variations("com.googlecode.iTerm2"),
            vec!["com.googlecode.iTerm2", "iTerm2", "iterm2", "googlecode.iTerm2"]
        );
        assert_eq!(bundle_variations("single"), vec!["single"]);
    }

    #[test]
    fn test_candidates_cover_templates() {
        let (tmp, scanner) = setup();
        let candidates = scanner.candidates(&identity("ExampleApp", Some("com.example.app")));

        let home = tmp.path();
        assert!(candidates.contains(&home.join(".exampleapp")));
        assert!(candidates.contains(&home.join("Library/Application Support/ExampleApp")));
        assert!(candidates.contains(&home.join("Library/Preferences/com.example.app.plist")));
        assert!(candidates.contains(&home.join("Library/Group Containers/group.com.example.app")));
        assert!(candidates.contains(&home.join(".config/exampleapp")));
    }

    #[test]
    fn test_scan_returns_existing_only() {
        let (tmp, scanner) = setup();
        let support = tmp.path().join("Library/Application Support/ExampleApp");
        fs::create_dir_all(&support).expect("create support dir");

        let scan = scanner.scan(&identity("ExampleApp", None));
        assert_eq!(scan.found, vec![support]);
        assert!(scan.checked.len() > scan.found.len());
    }

    #[test]
    fn test_scan_nothing_found() {
        let (_tmp, scanner) = setup();
        let scan = scanner.scan(&identity("MysteryApp", Some("com.mystery.app")));
        assert!(scan.found.is_empty());
        assert!(!scan.checked.is_empty());
    }

    #[test]
    fn test_scan_drops_nested_candidates() {
        let (tmp, scanner) = setup();
        let container = tmp.path().join("Library/Containers/com.example.app");
        fs::create_dir_all(container.join("Data/Library/Preferences"))
            .expect("create container");

        let scan = scanner.scan(&identity("ExampleApp", Some("com.example.app")));
        assert_eq!(scan.found, vec![container]);
    }
}

//! Rule documents for the pattern filter and the secret scanner.
//!
//! Both documents are optional. A missing or unreadable document falls back
//! to the built-in rules, which mirror the shipped `data/` files.

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// File name of the pattern filter rules inside the data directory.
pub const CONFIG_PATTERNS_FILE: &str = "config-patterns.toml";

/// File name of the security rules inside the data directory.
pub const SECURITY_PATTERNS_FILE: &str = "security-patterns.toml";

/// Pattern filter rules (`config-patterns.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternRules {
    /// File extensions that identify configuration files
    pub allowed_extensions: Vec<String>,
    /// Exact file names that are configuration regardless of extension
    pub safe_filenames: Vec<String>,
    /// Dotfile name suffixes that identify configuration (`.zshrc`, `.npmrc`)
    pub dotfile_suffixes: Vec<String>,
    /// Directory names that are never descended into
    pub excluded_directories: Vec<String>,
    /// Globs for cache, log, temp and binary-package paths
    pub exclude_globs: Vec<String>,
}

impl Default for PatternRules {
    fn default() -> Self {
        Self {
            allowed_extensions: strings(&[
                ".json", ".jsonc", ".json5", ".yaml", ".yml", ".toml", ".plist", ".xml", ".ini",
                ".cfg", ".conf", ".config", ".properties", ".env", ".lua", ".vim", ".el", ".fish",
                ".sh", ".zsh", ".bash", ".nu", ".kdl", ".css", ".scss", ".keylayout",
                ".code-snippets", ".sublime-settings", ".sublime-keymap", ".tmtheme", ".theme",
                ".itermcolors", ".terminal", ".alfredappearance", ".txt", ".md",
            ]),
            safe_filenames: strings(&[
                "config",
                "settings",
                "keybindings",
                "keymap",
                "Brewfile",
                "Gemfile",
                "Procfile",
                ".editorconfig",
                ".gitconfig",
                ".gitignore",
                ".gitignore_global",
                ".gitattributes",
                ".tmux.conf",
                ".vimrc",
                ".gvimrc",
                ".ideavimrc",
                ".inputrc",
                ".hushlogin",
                ".curlrc",
                ".wgetrc",
                ".screenrc",
                ".nanorc",
                ".psqlrc",
                ".sqliterc",
                ".ripgreprc",
            ]),
            dotfile_suffixes: strings(&[
                "rc", "config", "conf", "profile", "login", "logout", "aliases", "exports",
                "functions",
            ]),
            excluded_directories: strings(&[
                "cache",
                "caches",
                "cacheddata",
                "code cache",
                "log",
                "logs",
                "tmp",
                "temp",
                "node_modules",
                ".git",
                "__pycache__",
                "blob_storage",
                "indexeddb",
                "webstorage",
                "workspacestorage",
                "globalstorage",
                "local storage",
                "session storage",
                "service worker",
                "gpucache",
                "shadercache",
                "dawncache",
                "crashpad",
                "crashreporter",
                "crash reports",
                "backups",
                "saved application state",
            ]),
            exclude_globs: strings(&[
                "**/*.log",
                "**/*.log.*",
                "**/*.tmp",
                "**/*.swp",
                "**/*.lock",
                "**/*.pid",
                "**/.DS_Store",
                "**/*.sqlite",
                "**/*.sqlite3",
                "**/*.sqlite-wal",
                "**/*.sqlite-shm",
                "**/*.db",
                "**/*.db-journal",
                "**/*.ldb",
                "**/*.dylib",
                "**/*.so",
                "**/*.dll",
                "**/*.exe",
                "**/*.app/**",
                "**/*.framework/**",
                "**/*.pkg",
                "**/*.dmg",
                "**/*.zip",
                "**/*.tar.gz",
                "**/*.vsix",
                "**/*.pyc",
            ]),
        }
    }
}

impl PatternRules {
    /// Load the rules from a TOML document.
    ///
    /// # Errors
    /// Returns error if the document can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        load_document(path)
    }

    /// Load `config-patterns.toml` from a data directory, falling back to the
    /// built-in rules if it is missing or unreadable.
    #[must_use]
    pub fn load_or_default(data_dir: &Path) -> Self {
        load_or_default(&data_dir.join(CONFIG_PATTERNS_FILE))
    }
}

/// One named credential pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretPatternRule {
    /// Pattern name, reported with every finding
    pub name: String,
    /// Regular expression
    pub regex: String,
    /// Replacement used when redacting (`$1` style group references allowed)
    #[serde(default = "default_replacement")]
    pub replacement: String,
    /// Whether a match identifies private-key material
    #[serde(default)]
    pub private_key: bool,
}

fn default_replacement() -> String {
    "[REDACTED]".to_string()
}

/// Secret scanner rules (`security-patterns.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityRules {
    /// Ordered credential patterns
    pub patterns: Vec<SecretPatternRule>,
    /// Files that are never backed up, under any tier or policy
    pub exclude_files: Vec<String>,
}

impl Default for SecurityRules {
    fn default() -> Self {
        let pattern = |name: &str, regex: &str, replacement: &str, private_key: bool| {
            SecretPatternRule {
                name: name.to_string(),
                regex: regex.to_string(),
                replacement: replacement.to_string(),
                private_key,
            }
        };

        Self {
            patterns: vec![
                pattern(
                    "private_key_header",
                    r"-----BEGIN (?:RSA |OPENSSH |EC |DSA |ENCRYPTED |PGP )?PRIVATE KEY(?: BLOCK)?-----",
                    "[REDACTED_PRIVATE_KEY]",
                    true,
                ),
                pattern("github_pat", r"ghp_[A-Za-z0-9]{36}", "[REDACTED_GITHUB_TOKEN]", false),
                pattern("github_oauth", r"gho_[A-Za-z0-9]{36}", "[REDACTED_GITHUB_TOKEN]", false),
                pattern(
                    "github_fine_grained",
                    r"github_pat_[A-Za-z0-9_]{22,}",
                    "[REDACTED_GITHUB_TOKEN]",
                    false,
                ),
                pattern(
                    "anthropic_key",
                    r"sk-ant-[A-Za-z0-9_\-]{20,}",
                    "[REDACTED_ANTHROPIC_KEY]",
                    false,
                ),
                pattern(
                    "openai_key",
                    r"sk-(?:proj-)?[A-Za-z0-9]{20,}",
                    "[REDACTED_OPENAI_KEY]",
                    false,
                ),
                pattern(
                    "aws_access_key",
                    r"\b(?:AKIA|ASIA)[0-9A-Z]{16}\b",
                    "[REDACTED_AWS_KEY]",
                    false,
                ),
                pattern(
                    "stripe_key",
                    r"\b[sr]k_(?:live|test)_[A-Za-z0-9]{24,}",
                    "[REDACTED_STRIPE_KEY]",
                    false,
                ),
                pattern(
                    "slack_token",
                    r"xox[baprs]-[A-Za-z0-9\-]{10,}",
                    "[REDACTED_SLACK_TOKEN]",
                    false,
                ),
                pattern("npm_token", r"npm_[A-Za-z0-9]{36}", "[REDACTED_NPM_TOKEN]", false),
                pattern(
                    "postgres_url",
                    r"(postgres(?:ql)?://[^:\s/@]+:)[^@\s]+@",
                    "${1}[REDACTED]@",
                    false,
                ),
                pattern(
                    "mysql_url",
                    r"(mysql://[^:\s/@]+:)[^@\s]+@",
                    "${1}[REDACTED]@",
                    false,
                ),
                pattern(
                    "mongodb_url",
                    r"(mongodb(?:\+srv)?://[^:\s/@]+:)[^@\s]+@",
                    "${1}[REDACTED]@",
                    false,
                ),
                pattern(
                    "bearer_token",
                    r"(?i)(bearer\s+)[A-Za-z0-9\-._~+/]{8,}=*",
                    "${1}[REDACTED]",
                    false,
                ),
                pattern(
                    "basic_auth_header",
                    r"(?i)(authorization:\s*basic\s+)[A-Za-z0-9+/]{8,}=*",
                    "${1}[REDACTED]",
                    false,
                ),
                pattern(
                    "generic_api_key",
                    r#"(?i)((?:api[_-]?key|secret[_-]?key|access[_-]?token|auth[_-]?token)\s*[=:]\s*["']?)[A-Za-z0-9_\-]{16,}"#,
                    "${1}[REDACTED]",
                    false,
                ),
            ],
            exclude_files: strings(&[
                "id_rsa*",
                "id_dsa*",
                "id_ecdsa*",
                "id_ed25519*",
                "*.pem",
                "*.key",
                "*.p12",
                "*.pfx",
                "*.keychain",
                "*.keychain-db",
                "*.kdbx",
                ".netrc",
                ".pgpass",
                ".aws/credentials",
                ".gnupg/private-keys-v1.d/**",
                ".config/gh/hosts.yml",
                ".docker/.token_seed",
            ]),
        }
    }
}

impl SecurityRules {
    /// Load the rules from a TOML document.
    ///
    /// # Errors
    /// Returns error if the document can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        load_document(path)
    }

    /// Load `security-patterns.toml` from a data directory, falling back to
    /// the built-in rules if it is missing or unreadable.
    #[must_use]
    pub fn load_or_default(data_dir: &Path) -> Self {
        load_or_default(&data_dir.join(SECURITY_PATTERNS_FILE))
    }
}

fn load_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| FilterError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

fn load_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        debug!(path = %path.display(), "rules file not found, using built-in rules");
        return T::default();
    }

    match load_document(path) {
        Ok(rules) => {
            debug!(path = %path.display(), "loaded rules file");
            rules
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to load rules file, using built-in rules"
            );
            T::default()
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_rules_fall_back_to_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let rules = PatternRules::load_or_default(tmp.path());
        assert!(rules.allowed_extensions.contains(&".json".to_string()));

        let security = SecurityRules::load_or_default(tmp.path());
        assert_eq!(security.patterns[0].name, "private_key_header");
    }

    #[test]
    fn test_corrupt_rules_fall_back_to_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        std::fs::write(tmp.path().join(SECURITY_PATTERNS_FILE), "patterns = [[[")
            .expect("write rules");

        let security = SecurityRules::load_or_default(tmp.path());
        assert!(!security.patterns.is_empty());
        assert!(SecurityRules::load(&tmp.path().join(SECURITY_PATTERNS_FILE)).is_err());
    }

    #[test]
    fn test_partial_rules_document() {
        let tmp = TempDir::new().expect("create temp dir");
        std::fs::write(
            tmp.path().join(CONFIG_PATTERNS_FILE),
            "allowed_extensions = [\".json\"]\n",
        )
        .expect("write rules");

        let rules = PatternRules::load_or_default(tmp.path());
        assert_eq!(rules.allowed_extensions, vec![".json".to_string()]);
        // Unspecified lists keep their defaults
        assert!(rules.excluded_directories.contains(&"cache".to_string()));
    }

    #[test]
    fn test_pattern_rule_default_replacement() {
        let rule: SecretPatternRule =
            toml::from_str("name = \"custom\"\nregex = \"tok_[a-z]+\"\n").expect("parse rule");
        assert_eq!(rule.replacement, "[REDACTED]");
        assert!(!rule.private_key);
    }
}

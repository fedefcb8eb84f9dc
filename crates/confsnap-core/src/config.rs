//! Configuration management for confsnap.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default size ceiling for tier-2/3 files (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Main application configuration.
///
/// This is loaded from `~/.config/confsnap/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Filesystem locations
    pub paths: PathsConfig,
    /// Tier cascade settings
    pub discovery: DiscoveryConfig,
    /// Pattern filter settings
    pub filter: FilterConfig,
    /// Secret handling settings
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides to this configuration.
    ///
    /// Supports the following environment variables:
    /// - `CONFSNAP_HOME`: Override the home directory that is scanned
    /// - `CONFSNAP_OUTPUT_DIR`: Override the backup output directory
    /// - `CONFSNAP_INCLUDE_SECRETS`: Copy files containing secrets (true/false)
    /// - `CONFSNAP_RESEARCH_ENABLED`: Enable tier-3 research (true/false)
    /// - `CONFSNAP_RESEARCH_TIMEOUT_SECS`: Override the per-task research timeout
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("CONFSNAP_HOME") {
            if !val.is_empty() {
                tracing::debug!("Override paths.home_dir from env: {}", val);
                self.paths.home_dir = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("CONFSNAP_OUTPUT_DIR") {
            if !val.is_empty() {
                tracing::debug!("Override paths.output_dir from env: {}", val);
                self.paths.output_dir = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("CONFSNAP_INCLUDE_SECRETS") {
            if let Ok(include) = val.parse::<bool>() {
                self.security.secret_policy = if include {
                    SecretPolicy::Include
                } else {
                    SecretPolicy::Exclude
                };
                tracing::debug!("Override security.secret_policy from env: {}", include);
            }
        }

        if let Ok(val) = std::env::var("CONFSNAP_RESEARCH_ENABLED") {
            if let Ok(enabled) = val.parse() {
                self.discovery.research_enabled = enabled;
                tracing::debug!("Override discovery.research_enabled from env: {}", enabled);
            }
        }

        if let Ok(val) = std::env::var("CONFSNAP_RESEARCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.discovery.research_timeout_secs = secs;
                tracing::debug!("Override discovery.research_timeout_secs from env: {}", secs);
            }
        }
    }

    /// Check value constraints that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.discovery.research_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "discovery.research_batch_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.discovery.research_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "discovery.research_timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.filter.max_file_size_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "filter.max_file_size_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/confsnap/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "confsnap", "confsnap").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Filesystem locations. Unset values are resolved at run time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Home directory to scan (default: the current user's home)
    pub home_dir: Option<PathBuf>,
    /// XDG configuration root (default: `$XDG_CONFIG_HOME` or `<home>/.config`)
    pub xdg_config_home: Option<PathBuf>,
    /// Directory holding `app-hints.toml` and the rule files
    pub data_dir: Option<PathBuf>,
    /// Root of the backup output (default: `<home>/confsnap-backups/<timestamp>`)
    pub output_dir: Option<PathBuf>,
}

/// Tier cascade settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Whether tier-2 convention scanning runs
    pub conventions_enabled: bool,
    /// Whether tier-3 research runs for applications left unresolved
    pub research_enabled: bool,
    /// Number of research tasks in flight at once
    pub research_batch_size: usize,
    /// Per-task research timeout in seconds
    pub research_timeout_secs: u64,
    /// Program and arguments of an external researcher
    pub research_command: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            conventions_enabled: true,
            research_enabled: false,
            research_batch_size: 5,
            research_timeout_secs: 120,
            research_command: Vec::new(),
        }
    }
}

/// Pattern filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Size ceiling applied to tier-2/3 files, in bytes
    pub max_file_size_bytes: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }
}

/// Secret handling settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// What happens to a file whose content matches a credential pattern
    pub secret_policy: SecretPolicy,
}

/// Policy applied to files containing credential-shaped content.
///
/// Private-key material is excluded under every policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretPolicy {
    /// Skip the file and count it as secret-filtered
    #[default]
    Exclude,
    /// Copy the file unmodified and record the findings
    Include,
    /// Copy the file with every match replaced
    Redact,
}

impl SecretPolicy {
    /// Whether files with findings are copied at all.
    #[must_use]
    pub fn includes_secrets(self) -> bool {
        !matches!(self, Self::Exclude)
    }
}

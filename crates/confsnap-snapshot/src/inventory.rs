//! Inventory input produced by the package and application collectors.
//!
//! The collectors themselves run outside this workspace; their combined
//! output arrives as one TOML or JSON document. Every section is optional so
//! a partial inventory still produces a snapshot.

use crate::error::{Result, SnapshotError};
use confsnap_core::{ApplicationIdentity, InstallMethod};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Host identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    /// Host name
    pub hostname: Option<String>,
    /// Operating system version string
    pub os_version: Option<String>,
    /// CPU architecture
    pub arch: Option<String>,
    /// Login name
    pub username: Option<String>,
}

/// One installed application as reported by the application collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryApplication {
    /// Display name
    pub name: String,
    /// Bundle identifier
    #[serde(default)]
    pub bundle_id: Option<String>,
    /// Install method as reported; unrecognised values become `unknown`
    #[serde(default)]
    pub install_method: Option<String>,
    /// Version string
    #[serde(default)]
    pub version: Option<String>,
}

impl InventoryApplication {
    /// Install method, parsed leniently.
    #[must_use]
    pub fn install_method(&self) -> InstallMethod {
        self.install_method
            .as_deref()
            .map_or(InstallMethod::Unknown, InstallMethod::parse_lenient)
    }
}

/// A package name with an optional pinned version.
///
/// Accepts either a bare string or a `{ name, version }` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPackage")]
pub struct Package {
    /// Package name
    pub name: String,
    /// Installed version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Package {
    /// Create an unversioned package.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPackage {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        version: Option<String>,
    },
}

impl From<RawPackage> for Package {
    fn from(raw: RawPackage) -> Self {
        match raw {
            RawPackage::Name(name) => Self::new(name),
            RawPackage::Full { name, version } => Self { name, version },
        }
    }
}

/// Homebrew state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Homebrew {
    /// Third-party taps
    pub taps: Vec<String>,
    /// Installed formulae
    pub formulae: Vec<Package>,
    /// Installed casks
    pub casks: Vec<Package>,
}

/// A Mac App Store application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasApp {
    /// Store identifier
    pub id: u64,
    /// Application name
    pub name: String,
}

/// Globally installed language packages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalPackages {
    /// npm -g
    pub npm: Vec<Package>,
    /// pip (user site)
    pub pip: Vec<Package>,
    /// pipx
    pub pipx: Vec<Package>,
    /// cargo install
    pub cargo: Vec<Package>,
    /// gem
    pub gem: Vec<Package>,
    /// go install
    pub go: Vec<Package>,
}

impl GlobalPackages {
    /// Total number of packages across managers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.npm.len()
            + self.pip.len()
            + self.pipx.len()
            + self.cargo.len()
            + self.gem.len()
            + self.go.len()
    }
}

/// Editor extension identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorExtensions {
    /// Visual Studio Code
    pub vscode: Vec<String>,
    /// Cursor
    pub cursor: Vec<String>,
    /// Zed
    pub zed: Vec<String>,
}

impl EditorExtensions {
    /// Total number of extensions across editors.
    #[must_use]
    pub fn count(&self) -> usize {
        self.vscode.len() + self.cursor.len() + self.zed.len()
    }
}

/// Language runtime versions managed by version managers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeVersions {
    /// Python versions
    pub python: Vec<String>,
    /// Node.js versions
    pub node: Vec<String>,
    /// Ruby versions
    pub ruby: Vec<String>,
}

impl RuntimeVersions {
    /// Total number of installed versions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.python.len() + self.node.len() + self.ruby.len()
    }
}

/// The complete inventory document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    /// Host identity
    pub system: SystemInfo,
    /// Installed applications
    pub applications: Vec<InventoryApplication>,
    /// Homebrew state
    pub homebrew: Homebrew,
    /// Mac App Store applications
    pub mas: Vec<MasApp>,
    /// Global language packages
    pub global_packages: GlobalPackages,
    /// Editor extensions
    pub editor_extensions: EditorExtensions,
    /// Runtime versions
    pub runtime_versions: RuntimeVersions,
}

impl Inventory {
    /// Load an inventory file.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as TOML.
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_toml(&contents)
        };

        let inventory = parsed.map_err(|reason| SnapshotError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!(
            path = %path.display(),
            applications = inventory.applications.len(),
            "loaded inventory"
        );
        Ok(inventory)
    }

    /// Parse an inventory from a TOML string.
    pub fn from_toml(contents: &str) -> std::result::Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Parse an inventory from a JSON string.
    pub fn from_json(contents: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    }

    /// Application identities for the discovery engine.
    ///
    /// Applications whose name yields no usable key are logged and skipped.
    #[must_use]
    pub fn identities(&self) -> Vec<ApplicationIdentity> {
        self.applications
            .iter()
            .filter_map(|app| {
                match ApplicationIdentity::new(
                    app.name.clone(),
                    app.bundle_id.clone(),
                    app.install_method(),
                ) {
                    Ok(identity) => Some(identity),
                    Err(e) => {
                        warn!(name = %app.name, error = %e, "skipping application without a key");
                        None
                    }
                }
            })
            .collect()
    }
}

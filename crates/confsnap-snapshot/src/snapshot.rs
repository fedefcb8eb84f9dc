//! The consolidated system snapshot.
//!
//! A [`Snapshot`] is assembled once at the end of a run by
//! [`SnapshotBuilder`] from the inventory, the discovery outcome and the
//! backup summary. It has no mutating methods; the only thing to do with a
//! built snapshot is read it or write it out.

use crate::error::{Result, SnapshotError};
use crate::inventory::{
    EditorExtensions, GlobalPackages, Homebrew, Inventory, MasApp, RuntimeVersions, SystemInfo,
};
use confsnap_backup::{AppBackupReport, BackupDecision, BackupStats, BackupSummary};
use confsnap_core::{AppKey, InstallMethod, Tier, Timestamp};
use confsnap_resolver::{
    DiscoveryOutcome, DiscoveryStats, ResolutionState, ResolvedConfig, UndiscoveredEntry,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Derived per-category counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    /// Installed applications
    pub total_applications: usize,
    /// Homebrew formulae plus casks
    pub homebrew_packages: usize,
    /// Mac App Store applications
    pub mac_app_store_apps: usize,
    /// Global language packages
    pub global_packages: usize,
    /// Editor extensions
    pub editor_extensions: usize,
    /// Runtime versions
    pub runtime_versions: usize,
    /// Sum of the inventory categories above
    pub total_items: usize,
    /// Applications with resolved configuration
    pub apps_with_config: usize,
    /// Applications no tier could place
    pub apps_undiscovered: usize,
    /// Configuration files copied
    pub config_files_copied: usize,
    /// Configuration entries skipped by filters or secret rules
    pub config_files_skipped: usize,
    /// Configuration entries that failed
    pub config_errors: usize,
    /// Files kept out because of credential material
    pub secrets_filtered: usize,
}

impl SummaryCounts {
    fn from_parts(inventory: &Inventory, discovery: &DiscoveryStats, backup: &BackupStats) -> Self {
        let total_applications = inventory.applications.len();
        let homebrew_packages = inventory.homebrew.formulae.len() + inventory.homebrew.casks.len();
        let mac_app_store_apps = inventory.mas.len();
        let global_packages = inventory.global_packages.count();
        let editor_extensions = inventory.editor_extensions.count();
        let runtime_versions = inventory.runtime_versions.count();

        Self {
            total_applications,
            homebrew_packages,
            mac_app_store_apps,
            global_packages,
            editor_extensions,
            runtime_versions,
            total_items: total_applications
                + homebrew_packages
                + mac_app_store_apps
                + global_packages
                + editor_extensions
                + runtime_versions,
            apps_with_config: discovery.tier1 + discovery.tier2 + discovery.tier3,
            apps_undiscovered: discovery.undiscovered,
            config_files_copied: backup.copied,
            config_files_skipped: backup.skipped_filtered + backup.skipped_secret,
            config_errors: backup.skipped_error,
            secrets_filtered: backup.secrets_filtered,
        }
    }
}

/// One inventory application and what discovery made of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    /// Display name
    pub name: String,
    /// Application key, when one could be derived
    pub key: Option<AppKey>,
    /// Bundle identifier
    pub bundle_id: Option<String>,
    /// Install method
    pub install_method: InstallMethod,
    /// Version string
    pub version: Option<String>,
    /// Terminal discovery state, when the application took part in discovery
    pub discovery: Option<ResolutionState>,
}

/// Package-manager and editor state, copied from the inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagesSection {
    /// Homebrew taps, formulae and casks
    pub homebrew: Homebrew,
    /// Mac App Store applications
    pub mac_app_store: Vec<MasApp>,
    /// Global language packages
    pub global_packages: GlobalPackages,
    /// Editor extensions
    pub editor_extensions: EditorExtensions,
    /// Runtime versions
    pub runtime_versions: RuntimeVersions,
}

/// Configuration backup result for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfiguration {
    /// Application key
    pub key: AppKey,
    /// Display name
    pub name: String,
    /// Tier number the configuration came from
    pub tier: Tier,
    /// Backup subtree label for the tier
    pub tier_label: String,
    /// Resolved source paths
    pub source_paths: Vec<PathBuf>,
    /// Backup counters
    pub stats: BackupStats,
    /// Every skipped entry with its reason, in walk order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

/// One entry kept out of the backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Path on disk
    pub path: PathBuf,
    /// Which kind of skip
    pub decision: BackupDecision,
    /// Why it was skipped
    pub reason: String,
}

/// One credential match, located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretFindingEntry {
    /// Application key
    pub key: AppKey,
    /// File the match was found in
    pub source_path: PathBuf,
    /// Pattern name
    pub pattern: String,
    /// 1-based line number
    pub line: usize,
    /// Truncated match
    pub preview: String,
    /// What the backup did with the file
    pub decision: BackupDecision,
}

/// Configuration section: per-app results, totals and findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationsSection {
    /// Per-application results, in resolution order
    pub applications: Vec<AppConfiguration>,
    /// Counters over every application
    pub backup: BackupStats,
    /// Every credential match
    pub secret_findings: Vec<SecretFindingEntry>,
}

/// Counts for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    /// Applications resolved at this tier
    pub apps_count: usize,
    /// Source paths resolved at this tier
    pub paths_count: usize,
    /// Files copied from this tier
    pub files_backed_up: usize,
    /// Entries the filters kept out at this tier
    pub files_filtered: usize,
}

/// Discovery section: tier breakdown and the undiscovered list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySection {
    /// Per-tier application counts
    pub stats: DiscoveryStats,
    /// Per-tier counts keyed by tier label
    pub by_tier: BTreeMap<String, TierCounts>,
    /// Applications no tier could place
    pub undiscovered: Vec<UndiscoveredEntry>,
}

/// The consolidated, immutable result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Run identifier
    pub run_id: Uuid,
    /// When the snapshot was built
    pub generated_at: Timestamp,
    /// Version of the tool that built it
    pub tool_version: String,
    /// Backup output root
    pub output_directory: Option<PathBuf>,
    /// Host identity
    pub system: SystemInfo,
    /// Derived counts
    pub summary: SummaryCounts,
    /// Installed applications
    pub applications: Vec<ApplicationSummary>,
    /// Package-manager state
    pub packages: PackagesSection,
    /// Configuration backup results
    pub configurations: ConfigurationsSection,
    /// Discovery breakdown
    pub discovery: DiscoverySection,
}

impl Snapshot {
    /// Write the snapshot as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SnapshotError::write(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| SnapshotError::write(path, e))?;

        info!(
            path = %path.display(),
            run_id = %self.run_id,
            total_items = self.summary.total_items,
            "wrote snapshot"
        );
        Ok(())
    }

    /// Read a snapshot written by [`Snapshot::write_json`].
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed.
    pub fn read_json(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|e| SnapshotError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Accumulates run results and builds the [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    inventory: Inventory,
    resolved: Vec<ResolvedConfig>,
    undiscovered: Vec<UndiscoveredEntry>,
    discovery_stats: DiscoveryStats,
    backup: BackupSummary,
    output_directory: Option<PathBuf>,
}

impl SnapshotBuilder {
    /// Start from an inventory.
    #[must_use]
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory,
            ..Self::default()
        }
    }

    /// Add the discovery outcome.
    #[must_use]
    pub fn with_discovery(mut self, outcome: &DiscoveryOutcome) -> Self {
        self.resolved = outcome.resolved.clone();
        self.undiscovered = outcome.undiscovered.entries().to_vec();
        self.discovery_stats = outcome.stats;
        self
    }

    /// Add the backup summary.
    #[must_use]
    pub fn with_backup(mut self, summary: BackupSummary) -> Self {
        self.backup = summary;
        self
    }

    /// Record the backup output root.
    #[must_use]
    pub fn with_output_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(path.into());
        self
    }

    /// Build the snapshot.
    #[must_use]
    pub fn build(self) -> Snapshot {
        let states = self.states();
        let applications = self.application_summaries(&states);
        let configurations = self.configurations();
        let discovery = self.discovery();
        let summary = SummaryCounts::from_parts(
            &self.inventory,
            &self.discovery_stats,
            &self.backup.totals,
        );

        let Inventory {
            system,
            homebrew,
            mas,
            global_packages,
            editor_extensions,
            runtime_versions,
            ..
        } = self.inventory;

        Snapshot {
            run_id: Uuid::new_v4(),
            generated_at: Timestamp::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            output_directory: self.output_directory,
            system,
            summary,
            applications,
            packages: PackagesSection {
                homebrew,
                mac_app_store: mas,
                global_packages,
                editor_extensions,
                runtime_versions,
            },
            configurations,
            discovery,
        }
    }

    fn states(&self) -> HashMap<AppKey, ResolutionState> {
        let resolved = self
            .resolved
            .iter()
            .map(|config| (config.identity.key.clone(), config.tier.into()));
        let undiscovered = self
            .undiscovered
            .iter()
            .map(|entry| (entry.identity.key.clone(), ResolutionState::Undiscovered));
        resolved.chain(undiscovered).collect()
    }

    fn application_summaries(
        &self,
        states: &HashMap<AppKey, ResolutionState>,
    ) -> Vec<ApplicationSummary> {
        self.inventory
            .applications
            .iter()
            .map(|app| {
                let key = AppKey::from_name(&app.name).ok();
                let discovery = key.as_ref().and_then(|k| states.get(k).copied());
                ApplicationSummary {
                    name: app.name.clone(),
                    key,
                    bundle_id: app.bundle_id.clone(),
                    install_method: app.install_method(),
                    version: app.version.clone(),
                    discovery,
                }
            })
            .collect()
    }

    fn configurations(&self) -> ConfigurationsSection {
        let paths: HashMap<&AppKey, &ResolvedConfig> = self
            .resolved
            .iter()
            .map(|config| (&config.identity.key, config))
            .collect();

        let applications = self
            .backup
            .reports
            .iter()
            .map(|report| app_configuration(report, paths.get(&report.key).copied()))
            .collect();

        let secret_findings = self
            .backup
            .findings()
            .map(|(key, record, finding)| SecretFindingEntry {
                key: key.clone(),
                source_path: record.source_path.clone(),
                pattern: finding.pattern.clone(),
                line: finding.line,
                preview: finding.preview.clone(),
                decision: record.decision,
            })
            .collect();

        ConfigurationsSection {
            applications,
            backup: self.backup.totals,
            secret_findings,
        }
    }

    fn discovery(&self) -> DiscoverySection {
        let mut by_tier: BTreeMap<String, TierCounts> = [Tier::Tier1, Tier::Tier2, Tier::Tier3]
            .into_iter()
            .map(|tier| (tier.label().to_string(), TierCounts::default()))
            .collect();

        for config in &self.resolved {
            let counts = by_tier.entry(config.tier.label().to_string()).or_default();
            counts.apps_count += 1;
            counts.paths_count += config.source_paths.len();
        }

        for report in &self.backup.reports {
            let counts = by_tier.entry(report.tier.label().to_string()).or_default();
            counts.files_backed_up += report.stats.copied;
            counts.files_filtered += report.stats.skipped_filtered;
        }

        DiscoverySection {
            stats: self.discovery_stats,
            by_tier,
            undiscovered: self.undiscovered.clone(),
        }
    }
}

fn app_configuration(
    report: &AppBackupReport,
    resolved: Option<&ResolvedConfig>,
) -> AppConfiguration {
    let skipped = report
        .records
        .iter()
        .filter(|record| record.decision != BackupDecision::Copied)
        .map(|record| SkippedEntry {
            path: record.source_path.clone(),
            decision: record.decision,
            reason: record.reason.clone().unwrap_or_default(),
        })
        .collect();

    AppConfiguration {
        key: report.key.clone(),
        name: report.name.clone(),
        tier: report.tier,
        tier_label: report.tier.label().to_string(),
        source_paths: resolved.map(|c| c.source_paths.clone()).unwrap_or_default(),
        stats: report.stats,
        skipped,
    }
}

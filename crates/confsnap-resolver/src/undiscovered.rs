//! Append-only record of applications no tier could place.

use crate::error::Result;
use confsnap_core::{ApplicationIdentity, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Why an application ended up undiscovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndiscoveredReason {
    /// No curated hint, and convention scanning was disabled
    NoHint,
    /// No hint and no convention path, and research was not available
    NoConventionMatch,
    /// Research ran but produced nothing that exists on disk
    Tier3Inconclusive,
}

impl UndiscoveredReason {
    /// Stable string form used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoHint => "no_hint",
            Self::NoConventionMatch => "no_convention_match",
            Self::Tier3Inconclusive => "tier3_inconclusive",
        }
    }
}

impl fmt::Display for UndiscoveredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One application that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndiscoveredEntry {
    /// The application
    pub identity: ApplicationIdentity,
    /// Why no tier matched
    pub reason: UndiscoveredReason,
    /// Candidate paths that were checked and did not exist
    #[serde(default)]
    pub checked_paths: Vec<PathBuf>,
    /// Extra context, such as the research error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl UndiscoveredEntry {
    /// Create an entry with no checked paths.
    #[must_use]
    pub fn new(identity: ApplicationIdentity, reason: UndiscoveredReason) -> Self {
        Self {
            identity,
            reason,
            checked_paths: Vec::new(),
            detail: None,
        }
    }

    /// Attach the candidate paths that were checked.
    #[must_use]
    pub fn with_checked_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.checked_paths = paths;
        self
    }

    /// Attach extra context.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Serialized form of the undiscovered report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndiscoveredReport {
    /// When the report was produced
    pub generated_at: Timestamp,
    /// Number of entries
    pub total: usize,
    /// Entry count per reason
    pub by_reason: BTreeMap<UndiscoveredReason, usize>,
    /// Entries in the order they were recorded
    pub entries: Vec<UndiscoveredEntry>,
}

/// Accumulates undiscovered applications for one run.
#[derive(Debug, Clone, Default)]
pub struct UndiscoveredTracker {
    entries: Vec<UndiscoveredEntry>,
}

impl UndiscoveredTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&mut self, entry: UndiscoveredEntry) {
        self.entries.push(entry);
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[UndiscoveredEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry count per reason.
    #[must_use]
    pub fn count_by_reason(&self) -> BTreeMap<UndiscoveredReason, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.reason).or_insert(0) += 1;
        }
        counts
    }

    /// Append every entry of `other`, keeping its order.
    pub fn merge(&mut self, other: UndiscoveredTracker) {
        self.entries.extend(other.entries);
    }

    /// Build the serializable report.
    #[must_use]
    pub fn report(&self) -> UndiscoveredReport {
        UndiscoveredReport {
            generated_at: Timestamp::now(),
            total: self.entries.len(),
            by_reason: self.count_by_reason(),
            entries: self.entries.clone(),
        }
    }

    /// Write the report as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn write_report(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.report())?;
        std::fs::write(path, json)?;

        info!(path = %path.display(), total = self.entries.len(), "wrote undiscovered report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsnap_core::InstallMethod;
    use tempfile::TempDir;

    fn entry(name: &str, reason: UndiscoveredReason) -> UndiscoveredEntry {
        let identity =
            ApplicationIdentity::new(name, None, InstallMethod::Unknown).expect("valid identity");
        UndiscoveredEntry::new(identity, reason)
    }

    #[test]
    fn test_reason_serialization() {
        let json = serde_json::to_string(&UndiscoveredReason::Tier3Inconclusive)
            .expect("serialize reason");
        assert_eq!(json, "\"tier3_inconclusive\"");
        assert_eq!(UndiscoveredReason::NoConventionMatch.to_string(), "no_convention_match");
    }

    #[test]
    fn test_tracker_keeps_order_and_counts() {
        let mut tracker = UndiscoveredTracker::new();
        tracker.record(entry("Zeta", UndiscoveredReason::NoConventionMatch));
        tracker.record(entry("Alpha", UndiscoveredReason::Tier3Inconclusive));

        let mut other = UndiscoveredTracker::new();
        other.record(entry("Beta", UndiscoveredReason::Tier3Inconclusive));
        tracker.merge(other);

        let names: Vec<&str> = tracker.entries().iter().map(|e| e.identity.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Beta"]);
        assert_eq!(tracker.len(), 3);
        assert_eq!(
            tracker.count_by_reason()[&UndiscoveredReason::Tier3Inconclusive],
            2
        );
    }

    #[test]
    fn test_write_report() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("out").join("undiscovered.json");

        let mut tracker = UndiscoveredTracker::new();
        tracker.record(
            entry("MysteryApp", UndiscoveredReason::Tier3Inconclusive)
                .with_checked_paths(vec![PathBuf::from("/home/u/.mysteryapp")])
                .with_detail("no returned path exists on disk"),
        );
        tracker.write_report(&path).expect("write report");

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read report"))
                .expect("parse report");
        assert_eq!(json["total"], 1);
        assert_eq!(json["by_reason"]["tier3_inconclusive"], 1);
        assert_eq!(json["entries"][0]["reason"], "tier3_inconclusive");
        assert_eq!(json["entries"][0]["identity"]["key"], "mysteryapp");
    }
}

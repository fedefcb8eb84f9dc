//! Per-file backup records and the statistics accumulator.

use confsnap_core::{AppKey, Tier};
use confsnap_filter::SecretFinding;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one file-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupDecision {
    /// The file was copied (possibly redacted)
    Copied,
    /// The pattern filter, an exclusion glob or the symlink boundary kept it out
    SkippedFiltered,
    /// Credential material kept it out
    SkippedSecret,
    /// An I/O or walk error prevented the copy
    SkippedError,
}

/// One file copied or skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Path on disk
    pub source_path: PathBuf,
    /// Path in the backup tree, for copied files
    pub dest_path: Option<PathBuf>,
    /// Tier the source path came from
    pub tier: Tier,
    /// Outcome
    pub decision: BackupDecision,
    /// Source size in bytes (0 when unknown or for directories)
    pub size_bytes: u64,
    /// Why the entry was skipped, or how it was modified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Credential matches found in the content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<SecretFinding>,
}

impl BackupRecord {
    pub(crate) fn skipped(
        source_path: PathBuf,
        tier: Tier,
        decision: BackupDecision,
        size_bytes: u64,
        reason: impl ToString,
    ) -> Self {
        Self {
            source_path,
            dest_path: None,
            tier,
            decision,
            size_bytes,
            reason: Some(reason.to_string()),
            findings: Vec::new(),
        }
    }
}

/// Counters for backup outcomes.
///
/// Every record increments exactly one of the four decision counters, so
/// `copied + skipped_filtered + skipped_secret + skipped_error` equals the
/// number of file-level operations attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupStats {
    /// Files copied
    pub copied: usize,
    /// Entries skipped by filtering
    pub skipped_filtered: usize,
    /// Files skipped because of credential material
    pub skipped_secret: usize,
    /// Entries skipped because of errors
    pub skipped_error: usize,
    /// Files kept out of the backup by the secret rules
    pub secrets_filtered: usize,
    /// Files in which credential patterns matched, whatever the outcome
    pub secrets_detected: usize,
    /// Bytes written to the backup tree
    pub bytes_copied: u64,
}

impl BackupStats {
    /// Count one record.
    pub fn record(&mut self, record: &BackupRecord) {
        match record.decision {
            BackupDecision::Copied => {
                self.copied += 1;
                self.bytes_copied += record.size_bytes;
            }
            BackupDecision::SkippedFiltered => self.skipped_filtered += 1,
            BackupDecision::SkippedSecret => {
                self.skipped_secret += 1;
                self.secrets_filtered += 1;
            }
            BackupDecision::SkippedError => self.skipped_error += 1,
        }

        if !record.findings.is_empty() {
            self.secrets_detected += 1;
        }
    }

    /// Add another accumulator into this one.
    pub fn merge(&mut self, other: &BackupStats) {
        self.copied += other.copied;
        self.skipped_filtered += other.skipped_filtered;
        self.skipped_secret += other.skipped_secret;
        self.skipped_error += other.skipped_error;
        self.secrets_filtered += other.secrets_filtered;
        self.secrets_detected += other.secrets_detected;
        self.bytes_copied += other.bytes_copied;
    }

    /// Number of file-level operations attempted.
    #[must_use]
    pub fn total_operations(&self) -> usize {
        self.copied + self.skipped_filtered + self.skipped_secret + self.skipped_error
    }
}

/// Backup outcome for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppBackupReport {
    /// Application key
    pub key: AppKey,
    /// Display name
    pub name: String,
    /// Tier the configuration came from
    pub tier: Tier,
    /// Number of resolved source paths
    pub source_paths: usize,
    /// Every file-level operation, in walk order
    pub records: Vec<BackupRecord>,
    /// Counters over `records`
    pub stats: BackupStats,
}

impl AppBackupReport {
    pub(crate) fn push(&mut self, record: BackupRecord) {
        self.stats.record(&record);
        self.records.push(record);
    }

    /// Records with the given decision.
    pub fn records_with(&self, decision: BackupDecision) -> impl Iterator<Item = &BackupRecord> {
        self.records.iter().filter(move |r| r.decision == decision)
    }
}

/// Backup outcome for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSummary {
    /// Per-application reports, in resolution order
    pub reports: Vec<AppBackupReport>,
    /// Counters over every report
    pub totals: BackupStats,
}

impl BackupSummary {
    /// Add an application report.
    pub fn push(&mut self, report: AppBackupReport) {
        self.totals.merge(&report.stats);
        self.reports.push(report);
    }

    /// Every secret finding, with the file it was found in.
    pub fn findings(&self) -> impl Iterator<Item = (&AppKey, &BackupRecord, &SecretFinding)> {
        self.reports.iter().flat_map(|report| {
            report.records.iter().flat_map(move |record| {
                record
                    .findings
                    .iter()
                    .map(move |finding| (&report.key, record, finding))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(decision: BackupDecision, size: u64) -> BackupRecord {
        BackupRecord {
            source_path: PathBuf::from("/home/u/.toolrc"),
            dest_path: None,
            tier: Tier::Tier2,
            decision,
            size_bytes: size,
            reason: None,
            findings: Vec::new(),
        }
    }

    #[test]
    fn test_stats_counter_identity() {
        let mut stats = BackupStats::default();
        stats.record(&record(BackupDecision::Copied, 100));
        stats.record(&record(BackupDecision::Copied, 50));
        stats.record(&record(BackupDecision::SkippedFiltered, 0));
        stats.record(&record(BackupDecision::SkippedSecret, 10));
        stats.record(&record(BackupDecision::SkippedError, 0));

        assert_eq!(stats.total_operations(), 5);
        assert_eq!(stats.copied, 2);
        assert_eq!(stats.bytes_copied, 150);
        assert_eq!(stats.secrets_filtered, 1);
    }

    #[test]
    fn test_stats_merge() {
        let mut a = BackupStats::default();
        a.record(&record(BackupDecision::Copied, 10));
        let mut b = BackupStats::default();
        b.record(&record(BackupDecision::SkippedError, 0));

        a.merge(&b);
        assert_eq!(a.total_operations(), 2);
        assert_eq!(a.skipped_error, 1);
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_string(&BackupDecision::SkippedSecret).expect("serialize");
        assert_eq!(json, "\"skipped_secret\"");
    }
}

//! Backup executor: materializes resolved configuration into the backup tree.
//!
//! For every resolved path the executor walks files and directories, applies
//! exclusion globs, the pattern filter (tiers 2 and 3 only) and the secret
//! scanner (every tier), then copies what passes to
//! `configs/apps/<key>/<tier-label>/<path relative to home>` with owner-only
//! permissions. Binary property lists are scanned and stored as XML. A
//! failure on one file is recorded and the walk continues.

use crate::error::{BackupError, Result};
use crate::record::{AppBackupReport, BackupDecision, BackupRecord, BackupStats, BackupSummary};
use confsnap_core::Roots;
use confsnap_filter::{
    property_list, ExcludeReason, FilterDecision, PatternFilter, PatternList, SecretScanner,
    SecretVerdict,
};
use confsnap_resolver::ResolvedConfig;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Directory under the output root that holds per-application backups.
pub const APPS_DIR: &str = "configs/apps";

/// Subdirectory used for XDG paths that live outside the home directory.
const XDG_DIR: &str = "xdg";

/// Copies resolved configuration into a permission-hardened backup tree.
#[derive(Debug, Clone)]
pub struct BackupExecutor {
    output_root: PathBuf,
    roots: Roots,
    filter: PatternFilter,
    scanner: SecretScanner,
}

/// State for one application's walk.
struct AppWalk<'a> {
    config: &'a ResolvedConfig,
    app_root: PathBuf,
    excludes: PatternList,
    prepared_dirs: HashSet<PathBuf>,
    report: AppBackupReport,
}

impl BackupExecutor {
    /// Create an executor writing below `output_root`.
    #[must_use]
    pub fn new(
        output_root: impl Into<PathBuf>,
        roots: Roots,
        filter: PatternFilter,
        scanner: SecretScanner,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            roots,
            filter,
            scanner,
        }
    }

    /// The output root.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Directory that holds the backup of one application.
    #[must_use]
    pub fn app_dir(&self, config: &ResolvedConfig) -> PathBuf {
        self.output_root
            .join(APPS_DIR)
            .join(config.identity.key.as_str())
    }

    /// Back up every resolved application.
    ///
    /// # Errors
    /// Returns `CreateDir` if the backup root can't be created. Per-file
    /// failures never abort the run.
    pub fn backup_all(&self, configs: &[ResolvedConfig]) -> Result<BackupSummary> {
        let apps_root = self.output_root.join(APPS_DIR);
        create_private_dir_all(&apps_root)?;
        for dir in apps_root.ancestors() {
            if dir == self.output_root {
                break;
            }
            restrict_dir(dir)?;
        }

        let mut summary = BackupSummary::default();
        for config in configs {
            summary.push(self.backup(config));
        }

        info!(
            applications = summary.reports.len(),
            copied = summary.totals.copied,
            skipped_filtered = summary.totals.skipped_filtered,
            skipped_secret = summary.totals.skipped_secret,
            skipped_error = summary.totals.skipped_error,
            "backup complete"
        );
        Ok(summary)
    }

    /// Back up one application.
    #[must_use]
    pub fn backup(&self, config: &ResolvedConfig) -> AppBackupReport {
        let (excludes, errors) = PatternList::lenient(&config.exclude_patterns);
        for e in errors {
            warn!(key = %config.identity.key, error = %e, "ignoring invalid exclusion pattern");
        }

        let mut walk = AppWalk {
            config,
            app_root: self.app_dir(config),
            excludes,
            prepared_dirs: HashSet::new(),
            report: AppBackupReport {
                key: config.identity.key.clone(),
                name: config.identity.name.clone(),
                tier: config.tier,
                source_paths: config.source_paths.len(),
                records: Vec::new(),
                stats: BackupStats::default(),
            },
        };

        for source in &config.source_paths {
            self.walk_source(&mut walk, source);
        }

        debug!(
            key = %config.identity.key,
            tier = %config.tier,
            copied = walk.report.stats.copied,
            operations = walk.report.stats.total_operations(),
            "application backed up"
        );
        walk.report
    }

    fn walk_source(&self, walk: &mut AppWalk<'_>, source: &Path) {
        let tier = walk.config.tier;
        let mut entries = WalkDir::new(source).follow_links(true).into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(source).to_path_buf();
                    let error = BackupError::Walk {
                        path: path.clone(),
                        reason: e.to_string(),
                    };
                    warn!(key = %walk.config.identity.key, error = %error, "walk failed");
                    walk.report.push(BackupRecord::skipped(
                        path,
                        tier,
                        BackupDecision::SkippedError,
                        0,
                        error,
                    ));
                    continue;
                }
            };

            let path = entry.path();
            let is_dir = entry.file_type().is_dir();

            if let Some((decision, reason)) = self.exclusion(walk, &entry) {
                debug!(path = %path.display(), reason = %reason, "excluded");
                walk.report.push(BackupRecord::skipped(
                    path.to_path_buf(),
                    tier,
                    decision,
                    0,
                    reason,
                ));
                if is_dir {
                    entries.skip_current_dir();
                }
                continue;
            }

            if is_dir {
                continue;
            }

            let record = if entry.file_type().is_file() {
                self.copy_entry(walk, path)
            } else {
                BackupRecord::skipped(
                    path.to_path_buf(),
                    tier,
                    BackupDecision::SkippedError,
                    0,
                    "not a regular file",
                )
            };
            walk.report.push(record);
        }
    }

    /// Path-level exclusion checks, before any content is read.
    fn exclusion(
        &self,
        walk: &AppWalk<'_>,
        entry: &walkdir::DirEntry,
    ) -> Option<(BackupDecision, ExcludeReason)> {
        let path = entry.path();

        if entry.path_is_symlink() && !self.roots.contains(path) {
            return Some((BackupDecision::SkippedFiltered, ExcludeReason::SymlinkOutsideHome));
        }

        if let Some(pattern) = walk.excludes.first_match(path) {
            return Some((
                BackupDecision::SkippedFiltered,
                ExcludeReason::HintExclusion {
                    pattern: pattern.to_string(),
                },
            ));
        }

        if let Some(reason) = self.scanner.check_path(path) {
            return Some((BackupDecision::SkippedSecret, reason));
        }

        let is_dir = entry.file_type().is_dir();
        let size = if is_dir {
            0
        } else {
            entry.metadata().map(|m| m.len()).unwrap_or(0)
        };

        if walk.config.filtered {
            let relative = self.roots.relative_to_root(path).unwrap_or(path);
            if let FilterDecision::Exclude(reason) = self.filter.evaluate(relative, size, is_dir) {
                return Some((BackupDecision::SkippedFiltered, reason));
            }
        } else if !is_dir && size > self.filter.max_file_size() {
            // Curated paths skip the pattern rules but not the size ceiling
            return Some((
                BackupDecision::SkippedFiltered,
                ExcludeReason::SizeLimitExceeded {
                    size,
                    limit: self.filter.max_file_size(),
                },
            ));
        }

        None
    }

    /// Scan and copy one regular file.
    fn copy_entry(&self, walk: &mut AppWalk<'_>, path: &Path) -> BackupRecord {
        let tier = walk.config.tier;
        let key = &walk.config.identity.key;

        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => return Self::error_record(walk, BackupError::io(path, e)),
        };

        let converted = match property_list::read_binary_as_xml(path) {
            Ok(converted) => converted,
            Err(e) => {
                let error = BackupError::Convert {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                };
                return Self::error_record(walk, error);
            }
        };

        let verdict = match &converted {
            Some(xml) => self.scanner.scan(xml),
            None => match self.scanner.scan_file(path) {
                Ok(verdict) => verdict,
                Err(e) => return Self::error_record(walk, BackupError::io(path, e)),
            },
        };

        for finding in verdict.findings() {
            warn!(
                key = %key,
                path = %path.display(),
                pattern = %finding.pattern,
                line = finding.line,
                preview = %finding.preview,
                "secret detected"
            );
        }

        let dest = walk.app_root.join(tier.label()).join(self.relative_dest(path));

        let (content, findings, reason) = match verdict {
            SecretVerdict::Exclude { reason, findings } => {
                return BackupRecord {
                    source_path: path.to_path_buf(),
                    dest_path: None,
                    tier,
                    decision: BackupDecision::SkippedSecret,
                    size_bytes: size,
                    reason: Some(reason.to_string()),
                    findings,
                };
            }
            SecretVerdict::Pass { findings } => {
                let reason = converted
                    .is_some()
                    .then(|| "converted from binary plist".to_string());
                (converted, findings, reason)
            }
            SecretVerdict::Redact { content, findings } => {
                (Some(content), findings, Some("redacted".to_string()))
            }
        };

        let written = self
            .prepare_parent(walk, &dest)
            .and_then(|()| write_file(path, &dest, content.as_deref()));

        match written {
            Ok(bytes) => BackupRecord {
                source_path: path.to_path_buf(),
                dest_path: Some(dest),
                tier,
                decision: BackupDecision::Copied,
                size_bytes: bytes,
                reason,
                findings,
            },
            Err(error) => {
                let mut record = Self::error_record(walk, error);
                record.size_bytes = size;
                record.findings = findings;
                record
            }
        }
    }

    fn error_record(walk: &AppWalk<'_>, error: BackupError) -> BackupRecord {
        let path = match &error {
            BackupError::Io { path, .. }
            | BackupError::CreateDir { path, .. }
            | BackupError::Convert { path, .. }
            | BackupError::Walk { path, .. } => path.clone(),
        };
        warn!(key = %walk.config.identity.key, error = %error, "failed to back up file");
        BackupRecord::skipped(path, walk.config.tier, BackupDecision::SkippedError, 0, error)
    }

    /// Destination path below the tier directory.
    fn relative_dest(&self, path: &Path) -> PathBuf {
        if let Some(relative) = self.roots.relative_to_home(path) {
            return relative.to_path_buf();
        }
        if let Some(relative) = self.roots.relative_to_xdg(path) {
            return Path::new(XDG_DIR).join(relative);
        }
        path.file_name().map(PathBuf::from).unwrap_or_default()
    }

    /// Create the destination's parent directories with owner-only access.
    fn prepare_parent(&self, walk: &mut AppWalk<'_>, dest: &Path) -> Result<()> {
        let Some(parent) = dest.parent() else {
            return Ok(());
        };
        if walk.prepared_dirs.contains(parent) {
            return Ok(());
        }

        create_private_dir_all(parent)?;

        // Directories that already existed keep their mode until restricted
        for dir in parent.ancestors() {
            if !dir.starts_with(&walk.app_root) {
                break;
            }
            if walk.prepared_dirs.insert(dir.to_path_buf()) {
                restrict_dir(dir)?;
            }
        }
        Ok(())
    }
}

/// Write the file (or its converted or redacted content).
///
/// The destination is created owner-only before any data is written.
/// Returns the number of bytes written.
fn write_file(source: &Path, dest: &Path, content: Option<&str>) -> Result<u64> {
    match content {
        Some(content) => {
            let mut file = create_private_file(dest)?;
            file.write_all(content.as_bytes()).map_err(|e| BackupError::io(dest, e))?;
            Ok(content.len() as u64)
        }
        None => {
            let mut input = fs::File::open(source).map_err(|e| BackupError::io(source, e))?;
            let mut file = create_private_file(dest)?;
            std::io::copy(&mut input, &mut file).map_err(|e| BackupError::io(source, e))
        }
    }
}

/// Create (or truncate) a destination file with owner-only permissions.
fn create_private_file(path: &Path) -> Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let file = options.open(path).map_err(|e| BackupError::io(path, e))?;
    // The creation mode only applies to new files
    restrict_file(path)?;
    Ok(file)
}

/// Create a directory and its missing parents with owner-only permissions.
fn create_private_dir_all(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(path).map_err(|source| BackupError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn restrict_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| BackupError::io(path, e))
}

#[cfg(unix)]
fn restrict_dir(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
        .map_err(|e| BackupError::io(path, e))
}

#[cfg(not(unix))]
fn restrict_file(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir(_path: &Path) -> Result<()> {
    Ok(())
}

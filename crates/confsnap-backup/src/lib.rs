//! Confsnap Backup - Materializes resolved configuration into a backup tree.
//!
//! The executor walks every resolved path, applies exclusion globs, the
//! pattern filter and the secret scanner, and copies what passes into
//! `configs/apps/<key>/<tier-label>/` with owner-only permissions. Every
//! file-level outcome is recorded; a failure on one file never aborts the run.
//!
//! # Modules
//!
//! - [`executor`] - The backup walk and copy
//! - [`record`] - Per-file records, per-application reports and counters
//! - [`error`] - Backup error types
//!
//! # Example
//!
//! ```rust,no_run
//! use confsnap_backup::BackupExecutor;
//! use confsnap_core::{Roots, SecretPolicy};
//! use confsnap_filter::{PatternFilter, SecretScanner};
//!
//! # fn example(resolved: Vec<confsnap_resolver::ResolvedConfig>) -> Result<(), Box<dyn std::error::Error>> {
//! let roots = Roots::new("/Users/me", None)?;
//! let executor = BackupExecutor::new(
//!     "/Users/me/confsnap-backups/20250101-120000",
//!     roots,
//!     PatternFilter::default(),
//!     SecretScanner::default().with_policy(SecretPolicy::Exclude),
//! );
//!
//! let summary = executor.backup_all(&resolved)?;
//! println!("{} files copied", summary.totals.copied);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod executor;
pub mod record;

// Re-export commonly used types
pub use error::{BackupError, Result};
pub use executor::{BackupExecutor, APPS_DIR};
pub use record::{AppBackupReport, BackupDecision, BackupRecord, BackupStats, BackupSummary};

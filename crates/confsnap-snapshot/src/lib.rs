//! Confsnap Snapshot - Consolidated run snapshot and restoration bundles.
//!
//! This crate joins the externally collected inventory (applications,
//! package managers, editor extensions, runtime versions) with the discovery
//! outcome and backup summary of a run into one immutable [`Snapshot`], and
//! derives restoration bundles from the inventory.
//!
//! # Modules
//!
//! - [`inventory`] - Inventory input model (TOML or JSON)
//! - [`snapshot`] - `SnapshotBuilder` and the `Snapshot` sections
//! - [`bundles`] - Per-package-manager restoration manifests
//! - [`error`] - Snapshot error types
//!
//! # Example
//!
//! ```rust,no_run
//! use confsnap_snapshot::{BundleWriter, Inventory, SnapshotBuilder};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let inventory = Inventory::load(Path::new("inventory.toml"))?;
//! let out = Path::new("/tmp/confsnap-out");
//!
//! BundleWriter::new(out).write_all(&inventory)?;
//! let snapshot = SnapshotBuilder::new(inventory).with_output_directory(out).build();
//! snapshot.write_json(&out.join("state.json"))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod bundles;
pub mod error;
pub mod inventory;
pub mod snapshot;

// Re-export commonly used types
pub use bundles::{bundles, Bundle, BundleWriter, BUNDLES_DIR};
pub use error::{Result, SnapshotError};
pub use inventory::{
    EditorExtensions, GlobalPackages, Homebrew, Inventory, InventoryApplication, MasApp, Package,
    RuntimeVersions, SystemInfo,
};
pub use snapshot::{
    AppConfiguration, ApplicationSummary, ConfigurationsSection, DiscoverySection,
    PackagesSection, SecretFindingEntry, SkippedEntry, Snapshot, SnapshotBuilder, SummaryCounts,
    TierCounts,
};

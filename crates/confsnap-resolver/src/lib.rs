//! Confsnap Resolver - Tiered configuration discovery.
//!
//! This crate decides, for each installed application, which paths on disk
//! hold its configuration and at what trust level.
//!
//! # Architecture
//!
//! - **Conventions** ([`conventions`]): tier-2 candidates from standard OS locations
//! - **Research** ([`research`]): the tier-3 collaborator interface and its implementations
//! - **Resolver** ([`resolver`]): the tier cascade and batched research
//! - **Undiscovered** ([`undiscovered`]): applications no tier could place
//! - **Errors** ([`error`]): research and resolver error types
//!
//! # Example
//!
//! ```rust,no_run
//! use confsnap_core::{ApplicationIdentity, InstallMethod, Roots};
//! use confsnap_hints::{HintsLoader, HintsStore};
//! use confsnap_resolver::TieredResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let roots = Roots::new("/Users/me", None)?;
//! let hints = HintsStore::load_from(&HintsLoader::new("data/app-hints.toml")?)?;
//! let resolver = TieredResolver::new(hints, roots);
//!
//! let apps = vec![ApplicationIdentity::new("iTerm2", None, InstallMethod::Cask)?];
//! let outcome = resolver.resolve_all(&apps).await;
//! println!("{} resolved, {} undiscovered", outcome.resolved.len(), outcome.undiscovered.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod conventions;
pub mod error;
pub mod research;
pub mod resolver;
pub mod undiscovered;

// Re-export commonly used types
pub use conventions::{bundle_variations, name_variations, ConventionScan, ConventionScanner};
pub use error::{ResearchError, ResearchResult, ResolverError, Result};
pub use research::{CommandResearcher, ResearchCandidate, ResearchCollaborator, StaticResearcher};
pub use resolver::{
    DiscoveryOutcome, DiscoveryStats, LocalResolution, Resolution, ResolutionState,
    ResolvedConfig, TieredResolver, DEFAULT_BATCH_SIZE, DEFAULT_RESEARCH_TIMEOUT,
};
pub use undiscovered::{
    UndiscoveredEntry, UndiscoveredReason, UndiscoveredReport, UndiscoveredTracker,
};

//! Confsnap Filter - Path filtering and secret scanning for backups.
//!
//! Every candidate file passes through two independent checks before it is
//! copied:
//!
//! - **Pattern Filter** ([`pattern`]): separates configuration from caches,
//!   logs, databases and binaries. Applied to convention and research paths.
//! - **Secret Scanner** ([`secret`]): detects credentials in file content and
//!   applies the secret policy. Applied to every tier. Binary property lists
//!   are converted to XML first ([`property_list`]).
//!
//! Both are driven by rule documents ([`rules`]) that fall back to built-in
//! defaults when the shipped `data/` files are missing.
//!
//! # Example
//!
//! ```rust
//! use confsnap_core::SecretPolicy;
//! use confsnap_filter::{PatternFilter, SecretScanner, SecretVerdict};
//! use std::path::Path;
//!
//! let filter = PatternFilter::default();
//! assert!(filter.evaluate(Path::new(".myapp/settings.json"), 512, false).is_include());
//! assert!(!filter.evaluate(Path::new(".myapp/Cache"), 0, true).is_include());
//!
//! let scanner = SecretScanner::default().with_policy(SecretPolicy::Exclude);
//! let verdict = scanner.scan("theme = \"dark\"\n");
//! assert!(matches!(verdict, SecretVerdict::Pass { .. }));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod globs;
pub mod pattern;
pub mod property_list;
pub mod reason;
pub mod rules;
pub mod secret;

// Re-export commonly used types
pub use error::{FilterError, Result};
pub use globs::PatternList;
pub use pattern::{FilterDecision, PatternFilter};
pub use reason::ExcludeReason;
pub use rules::{PatternRules, SecretPatternRule, SecurityRules};
pub use secret::{is_text, truncate_secret, SecretFinding, SecretScanner, SecretVerdict};

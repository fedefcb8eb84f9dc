//! Confsnap Hints - Curated tier-1 configuration hints.
//!
//! This crate loads the curated hints database, the trusted source of
//! application configuration paths, validates each entry, and serves
//! exact-key lookups.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Hint records and validated entries
//! - **Loader** ([`loader`]): TOML loading from a document or a directory overlay
//! - **Store** ([`store`]): In-memory index with exact-key lookup
//! - **Errors** ([`error`]): Hints-specific error types
//!
//! # Example
//!
//! ```rust,no_run
//! use confsnap_core::AppKey;
//! use confsnap_hints::{HintsLoader, HintsStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = HintsLoader::new("data/app-hints.toml")?;
//! let store = HintsStore::load_from(&loader)?;
//!
//! let key = AppKey::from_name("iTerm2")?;
//! if let Some(hint) = store.lookup(&key) {
//!     println!("{} has {} curated paths", hint.key, hint.path_count());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod definition;
pub mod error;
pub mod loader;
pub mod store;

// Re-export commonly used types
pub use definition::{check_relative_path, HintEntry, HintRecord};
pub use error::{HintsError, Result};
pub use loader::{HintsLoader, LoadReport, RejectedHint};
pub use store::HintsStore;

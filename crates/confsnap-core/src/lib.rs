//! Confsnap Core - Foundation crate for the confsnap configuration backup engine.
//!
//! This crate provides the shared types, error handling, and configuration
//! management that every other confsnap crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes and enums (`AppKey`, `ApplicationIdentity`, `Tier`, `Timestamp`)
//! - [`roots`] - Resolved home and XDG configuration roots
//!
//! # Example
//!
//! ```rust
//! use confsnap_core::{AppConfig, ApplicationIdentity, InstallMethod};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.discovery.research_batch_size, 5);
//!
//! let identity = ApplicationIdentity::new("Visual Studio Code", None, InstallMethod::Cask)?;
//! assert_eq!(identity.key.as_str(), "visual-studio-code");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod roots;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, DiscoveryConfig, FilterConfig, PathsConfig, SecretPolicy, SecurityConfig,
};
pub use error::{ConfigError, ConfigResult, ConfsnapError, Result};
pub use roots::Roots;
pub use types::{AppKey, ApplicationIdentity, InstallMethod, Tier, Timestamp};

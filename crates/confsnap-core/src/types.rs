//! Shared types used across confsnap.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::ConfsnapError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Normalized application key, the join key across all discovery tiers.
///
/// Keys are lowercase and contain no whitespace or path separators, so they
/// are safe to use as a directory name in the backup tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppKey(String);

impl AppKey {
    /// Create an `AppKey` from an already-normalized string.
    ///
    /// # Errors
    /// Returns error if the key is empty, contains uppercase letters,
    /// whitespace or path separators, or is `.`/`..`.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfsnapError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    /// Derive a key from a display name.
    ///
    /// The name is trimmed, a trailing `.app` is dropped, words are lowercased
    /// and joined with `-`, and path separators become `-`.
    pub fn from_name(name: &str) -> Result<Self, ConfsnapError> {
        let trimmed = name.trim();
        let trimmed = trimmed.strip_suffix(".app").unwrap_or(trimmed);
        let key = trimmed
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-")
            .replace(['/', '\\'], "-");
        Self::new(key)
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(key: &str) -> Result<(), ConfsnapError> {
        static KEY_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = KEY_REGEX.get_or_init(|| Regex::new(r"^[^\s/\\]+$").expect("valid regex"));

        if key == "." || key == ".." {
            return Err(ConfsnapError::Validation(format!(
                "invalid application key: '{key}' is a relative path marker"
            )));
        }

        if !regex.is_match(key) || key.chars().any(char::is_uppercase) {
            return Err(ConfsnapError::Validation(format!(
                "invalid application key: must be non-empty lowercase without whitespace or path separators, got '{key}'"
            )));
        }

        Ok(())
    }
}

impl fmt::Display for AppKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AppKey {
    type Error = ConfsnapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AppKey> for String {
    fn from(key: AppKey) -> Self {
        key.0
    }
}

/// How an application was installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMethod {
    /// Homebrew cask
    Cask,
    /// Homebrew formula
    Formula,
    /// Mac App Store
    Mas,
    /// Manually installed disk image
    Dmg,
    /// Shipped with the operating system
    System,
    /// Not known
    #[default]
    Unknown,
}

impl InstallMethod {
    /// All install methods, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Cask,
        Self::Formula,
        Self::Mas,
        Self::Dmg,
        Self::System,
        Self::Unknown,
    ];

    /// Get the canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cask => "cask",
            Self::Formula => "formula",
            Self::Mas => "mas",
            Self::Dmg => "dmg",
            Self::System => "system",
            Self::Unknown => "unknown",
        }
    }

    /// Parse leniently, mapping anything unrecognised to `Unknown`.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(Self::Unknown)
    }
}

impl FromStr for InstallMethod {
    type Err = ConfsnapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == lowered)
            .ok_or_else(|| {
                ConfsnapError::Validation(format!(
                    "invalid install method '{s}': expected one of cask, formula, mas, dmg, system, unknown"
                ))
            })
    }
}

impl fmt::Display for InstallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An installed application as seen by the discovery engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationIdentity {
    /// Display name
    pub name: String,
    /// Normalized key derived from `name`
    pub key: AppKey,
    /// macOS bundle identifier, if any
    pub bundle_id: Option<String>,
    /// How the application was installed
    pub install_method: InstallMethod,
}

impl ApplicationIdentity {
    /// Create an identity, deriving the key from the display name.
    ///
    /// # Errors
    /// Returns error if no valid key can be derived from `name`.
    pub fn new(
        name: impl Into<String>,
        bundle_id: Option<String>,
        install_method: InstallMethod,
    ) -> Result<Self, ConfsnapError> {
        let name = name.into();
        let key = AppKey::from_name(&name)?;
        let bundle_id = bundle_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(Self {
            name,
            key,
            bundle_id,
            install_method,
        })
    }

    /// Display name without a trailing `.app`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        trimmed.strip_suffix(".app").unwrap_or(trimmed)
    }
}

/// Trust level of a discovered configuration path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    /// Curated hints database
    Tier1,
    /// Convention-derived
    Tier2,
    /// Externally researched
    Tier3,
}

impl Tier {
    /// Numeric tier level (1-3).
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::Tier1 => 1,
            Self::Tier2 => 2,
            Self::Tier3 => 3,
        }
    }

    /// Directory label used in the backup tree.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Tier1 => "hints",
            Self::Tier2 => "conventions",
            Self::Tier3 => "research",
        }
    }

    /// Whether paths at this tier go through the pattern filter.
    ///
    /// Curated tier-1 paths are trusted and never filtered.
    #[must_use]
    pub fn is_filtered(self) -> bool {
        !matches!(self, Self::Tier1)
    }
}

impl TryFrom<u8> for Tier {
    type Error = ConfsnapError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Tier1),
            2 => Ok(Self::Tier2),
            3 => Ok(Self::Tier3),
            other => Err(ConfsnapError::Validation(format!(
                "invalid tier {other}: expected 1, 2 or 3"
            ))),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.number()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {} ({})", self.number(), self.label())
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, ConfsnapError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| ConfsnapError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Compact form used in output directory names: `YYYYMMDD-HHMMSS`.
    #[must_use]
    pub fn to_compact(&self) -> String {
        self.0.format("%Y%m%d-%H%M%S").to_string()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

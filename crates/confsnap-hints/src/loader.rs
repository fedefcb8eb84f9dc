//! Hints database loading from TOML documents.
//!
//! A database is either a single document or a directory of documents. In a
//! directory, documents load in file-name order and later documents override
//! earlier entries with the same key, so a user overlay can sit next to the
//! bundled database.

use crate::{
    definition::{HintEntry, HintRecord},
    error::{HintsError, Result},
};
use confsnap_core::AppKey;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An entry dropped at load time, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedHint {
    /// Key as written in the document
    pub key: String,
    /// Document the entry came from
    pub source: PathBuf,
    /// Why it was rejected
    pub reason: String,
}

/// Outcome of loading a hints database.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Valid entries, ordered by key
    pub entries: Vec<HintEntry>,
    /// Entries dropped during validation
    pub rejected: Vec<RejectedHint>,
}

/// Loader for the curated hints database.
pub struct HintsLoader {
    /// Document or directory of documents
    source: PathBuf,
}

impl HintsLoader {
    /// Create a new loader for the given document or directory.
    ///
    /// # Errors
    /// Returns error if the path doesn't exist.
    pub fn new(source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();

        if !source.exists() {
            return Err(HintsError::PathNotFound {
                path: source.display().to_string(),
            });
        }

        Ok(Self { source })
    }

    /// Path this loader reads from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Load every entry from the database.
    ///
    /// Invalid entries are logged as warnings, skipped, and listed in the
    /// report.
    ///
    /// # Errors
    /// Returns error if a document can't be read or is not valid TOML.
    pub fn load_all(&self) -> Result<LoadReport> {
        let mut merged: BTreeMap<AppKey, HintEntry> = BTreeMap::new();
        let mut rejected = Vec::new();

        for document in self.documents()? {
            Self::load_document(&document, &mut merged, &mut rejected)?;
        }

        let report = LoadReport {
            entries: merged.into_values().collect(),
            rejected,
        };

        info!(
            count = report.entries.len(),
            rejected = report.rejected.len(),
            source = %self.source.display(),
            "loaded hints database"
        );

        Ok(report)
    }

    /// List the documents to load, in load order.
    fn documents(&self) -> Result<Vec<PathBuf>> {
        if self.source.is_file() {
            return Ok(vec![self.source.clone()]);
        }

        let mut documents = Vec::new();
        for entry in std::fs::read_dir(&self.source)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml") {
                documents.push(path);
            }
        }
        documents.sort();

        Ok(documents)
    }

    fn load_document(
        path: &Path,
        merged: &mut BTreeMap<AppKey, HintEntry>,
        rejected: &mut Vec<RejectedHint>,
    ) -> Result<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| HintsError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        let table: toml::Table = toml::from_str(&contents).map_err(|e| HintsError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;

        for (raw_key, value) in table {
            match Self::parse_entry(&raw_key, value) {
                Ok(entry) => {
                    if merged.contains_key(&entry.key) {
                        debug!(key = %entry.key, path = %path.display(), "overriding hint entry");
                    }
                    merged.insert(entry.key.clone(), entry);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        key = %raw_key,
                        error = %e,
                        "skipping invalid hint entry"
                    );
                    rejected.push(RejectedHint {
                        key: raw_key,
                        source: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn parse_entry(raw_key: &str, value: toml::Value) -> Result<HintEntry> {
        let key = AppKey::from_name(raw_key)?;
        let record: HintRecord =
            value
                .try_into()
                .map_err(|e: toml::de::Error| HintsError::ValidationError {
                    key: raw_key.to_string(),
                    reason: e.message().to_string(),
                })?;
        HintEntry::from_record(key, record)
    }
}

//! In-memory hints store with exact-key lookup.

use crate::{
    definition::HintEntry,
    error::{HintsError, Result},
    loader::{HintsLoader, LoadReport},
};
use confsnap_core::AppKey;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// In-memory index of curated hint entries, keyed by application key.
///
/// Lookup is an exact match on the normalized key; there is no fuzzy
/// matching. The store is cheap to clone and shares its entries.
#[derive(Clone)]
pub struct HintsStore {
    /// Cached hint entries, indexed by application key
    entries: Arc<RwLock<HashMap<AppKey, HintEntry>>>,
}

impl HintsStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a store and load all entries from the given loader.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn load_from(loader: &HintsLoader) -> Result<Self> {
        let store = Self::new();
        store.reload(loader)?;
        Ok(store)
    }

    /// Reload all entries from the loader, replacing the current contents.
    ///
    /// Returns the load report so rejected entries can be surfaced.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn reload(&self, loader: &HintsLoader) -> Result<LoadReport> {
        let report = loader.load_all()?;

        let mut cache = self.entries.write().expect("acquire write lock on hints");
        cache.clear();
        for entry in &report.entries {
            cache.insert(entry.key.clone(), entry.clone());
        }

        info!(count = cache.len(), "reloaded hints store");

        Ok(report)
    }

    /// Look up the entry for a key.
    #[must_use]
    pub fn lookup(&self, key: &AppKey) -> Option<HintEntry> {
        let cache = self.entries.read().expect("acquire read lock on hints");
        cache.get(key).cloned()
    }

    /// Get the entry for a key.
    ///
    /// # Errors
    /// Returns error if there is no entry for the key.
    pub fn get(&self, key: &AppKey) -> Result<HintEntry> {
        self.lookup(key).ok_or_else(|| HintsError::NotFound {
            key: key.to_string(),
        })
    }

    /// Get all entries, ordered by key.
    #[must_use]
    pub fn get_all(&self) -> Vec<HintEntry> {
        let cache = self.entries.read().expect("acquire read lock on hints");
        let mut all: Vec<HintEntry> = cache.values().cloned().collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    /// Get all keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<AppKey> {
        let cache = self.entries.read().expect("acquire read lock on hints");
        let mut keys: Vec<AppKey> = cache.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of entries in the store.
    #[must_use]
    pub fn count(&self) -> usize {
        let cache = self.entries.read().expect("acquire read lock on hints");
        cache.len()
    }

    /// Check if an entry exists for the key.
    #[must_use]
    pub fn contains(&self, key: &AppKey) -> bool {
        let cache = self.entries.read().expect("acquire read lock on hints");
        cache.contains_key(key)
    }

    /// Add or replace an entry.
    ///
    /// # Errors
    /// Returns error if the entry fails validation.
    pub fn insert(&self, entry: HintEntry) -> Result<()> {
        entry.validate()?;

        let mut cache = self.entries.write().expect("acquire write lock on hints");
        let key = entry.key.clone();
        cache.insert(key.clone(), entry);

        debug!(key = %key, "inserted hint entry");

        Ok(())
    }

    /// Remove an entry.
    ///
    /// Returns `true` if the entry was present, `false` otherwise.
    pub fn remove(&self, key: &AppKey) -> bool {
        let mut cache = self.entries.write().expect("acquire write lock on hints");
        let removed = cache.remove(key).is_some();

        if removed {
            debug!(key = %key, "removed hint entry");
        }

        removed
    }
}

impl Default for HintsStore {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

/// Alias-addressed store of raw graph descriptions.
///
/// Entries are kept exactly as received and are re-materialized on every
/// resolution, so callers never share a graph instance. A single lock guards
/// the whole map; lifetime is the server process.
#[derive(Debug, Default)]
pub struct GraphCache {
    entries: RwLock<HashMap<String, Arc<Value>>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `description` under `alias`, replacing any previous entry.
    /// The description is not validated here.
    pub fn put(&self, alias: impl Into<String>, description: Value) {
        let alias = alias.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.insert(alias.clone(), Arc::new(description)).is_some() {
            tracing::debug!(alias = %alias, "replaced cached graph");
        }
    }

    pub fn get(&self, alias: &str) -> Option<Arc<Value>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(alias).cloned()
    }

    pub fn has(&self, alias: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(alias)
    }

    /// Cached aliases, sorted.
    pub fn aliases(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut aliases: Vec<String> = entries.keys().cloned().collect();
        aliases.sort();
        aliases
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

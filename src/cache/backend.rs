//! Cache store implementations.

use super::key::Fingerprint;
use crate::types::StreamChunk;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

/// A recorded chunk sequence for one fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub chunks: Vec<StreamChunk>,
    pub created_at: SystemTime,
}

/// Storage seam for [`super::ResponseCache`]. Expiry policy lives in the
/// cache itself; stores only hold entries.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &Fingerprint) -> Option<CacheEntry>;
    fn insert(&self, entry: CacheEntry);
    /// Keep only entries for which `keep` returns true; returns how many were removed.
    fn retain(&self, keep: &dyn Fn(&CacheEntry) -> bool) -> usize;
    fn len(&self) -> usize;
    fn clear(&self);
    fn name(&self) -> &'static str;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<Fingerprint, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &Fingerprint) -> Option<CacheEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn insert(&self, entry: CacheEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.fingerprint.clone(), entry);
    }

    fn retain(&self, keep: &dyn Fn(&CacheEntry) -> bool) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, e| keep(e));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Store that never holds anything; disables caching.
#[derive(Debug, Default)]
pub struct NullCacheStore;

impl NullCacheStore {
    pub fn new() -> Self {
        Self
    }
}

impl CacheStore for NullCacheStore {
    fn get(&self, _: &Fingerprint) -> Option<CacheEntry> {
        None
    }
    fn insert(&self, _: CacheEntry) {}
    fn retain(&self, _: &dyn Fn(&CacheEntry) -> bool) -> usize {
        0
    }
    fn len(&self) -> usize {
        0
    }
    fn clear(&self) {}
    fn name(&self) -> &'static str {
        "null"
    }
}

//! TTL-bounded response cache.

use super::backend::{CacheEntry, CacheStore, MemoryCacheStore};
use super::key::Fingerprint;
use crate::clock::{Clock, SystemClock};
use crate::types::StreamChunk;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default entry lifetime: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    evictions: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Maps fingerprints to recorded chunk sequences.
///
/// Reads never evict. Every write sweeps out all entries whose age has
/// reached the TTL, which is the only bound on the cache's size.
pub struct ResponseCache {
    ttl: Duration,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    stats: AtomicStats,
}

impl ResponseCache {
    pub fn new(ttl: Duration, store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            store,
            clock,
            stats: AtomicStats::default(),
        }
    }

    /// In-memory cache on the system clock with the default TTL.
    pub fn in_memory() -> Self {
        Self::new(
            DEFAULT_TTL,
            Arc::new(MemoryCacheStore::new()),
            Arc::new(SystemClock),
        )
    }

    /// Chunks recorded under `key`, if the entry is younger than the TTL.
    pub fn get(&self, key: &Fingerprint) -> Option<Vec<StreamChunk>> {
        match self.store.get(key) {
            Some(entry) if self.is_live(&entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.chunks)
            }
            _ => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace the entry for `key`, then purge expired entries.
    pub fn put(&self, key: Fingerprint, chunks: Vec<StreamChunk>) {
        self.store.insert(CacheEntry {
            fingerprint: key.clone(),
            chunks,
            created_at: self.clock.now(),
        });
        self.stats.writes.fetch_add(1, Ordering::Relaxed);

        let removed = self.store.retain(&|e| self.is_live(e));
        if removed > 0 {
            self.stats
                .evictions
                .fetch_add(removed as u64, Ordering::Relaxed);
        }
        debug!(
            fingerprint = key.short(),
            evicted = removed,
            entries = self.store.len(),
            store = self.store.name(),
            "response cached"
        );
    }

    fn is_live(&self, entry: &CacheEntry) -> bool {
        self.clock.elapsed_since(entry.created_at) < self.ttl
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }
}

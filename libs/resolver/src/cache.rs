//! Identity cache keyed by identifier.
//!
//! Only complete records belong here. The resolver never reads or writes
//! the cache for projected lookups, since a projected record is missing
//! fields. The cache holds at most `capacity` records and evicts the least
//! recently used ones past that.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tagid_id::Identifier;
use tokio::sync::RwLock;
use tracing::debug;

use crate::collection::Record;
use crate::config::DEFAULT_CACHE_CAPACITY;

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub inserts: AtomicU64,
    pub evictions: AtomicU64,
}

#[derive(Debug)]
struct CacheEntry<R> {
    record: R,
    /// Tick of the last insert or hit.
    last_used: AtomicU64,
}

/// Per-process map from identifier to an already fetched record.
#[derive(Debug)]
pub struct IdentityCache<R> {
    capacity: usize,
    entries: RwLock<HashMap<Identifier, CacheEntry<R>>>,
    clock: AtomicU64,
    stats: CacheStats,
}

impl<R> Default for IdentityCache<R> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl<R> IdentityCache<R> {
    /// Creates a cache holding at most `capacity` records. A capacity of
    /// zero stores nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            stats: CacheStats::default(),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}

impl<R: Record> IdentityCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Splits `ids` into cached records and identifiers still to fetch.
    pub async fn partition(&self, ids: Vec<Identifier>) -> (Vec<R>, Vec<Identifier>) {
        let entries = self.entries.read().await;
        let mut hits = Vec::new();
        let mut misses = Vec::new();

        for id in ids {
            match entries.get(&id) {
                Some(entry) => {
                    entry.last_used.store(self.tick(), Ordering::Relaxed);
                    hits.push(entry.record.clone());
                }
                None => misses.push(id),
            }
        }

        self.stats
            .hits
            .fetch_add(hits.len() as u64, Ordering::Relaxed);
        self.stats
            .misses
            .fetch_add(misses.len() as u64, Ordering::Relaxed);

        (hits, misses)
    }

    /// Stores complete records, then evicts down to capacity.
    pub async fn insert_many(&self, records: &[R]) {
        if records.is_empty() || self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.write().await;
        for record in records {
            entries.insert(
                record.id(),
                CacheEntry {
                    record: record.clone(),
                    last_used: AtomicU64::new(self.tick()),
                },
            );
        }

        self.stats
            .inserts
            .fetch_add(records.len() as u64, Ordering::Relaxed);

        let excess = entries.len().saturating_sub(self.capacity);
        if excess > 0 {
            let mut by_age: Vec<(u64, Identifier)> = entries
                .iter()
                .map(|(id, entry)| (entry.last_used.load(Ordering::Relaxed), *id))
                .collect();
            by_age.sort_unstable();

            for (_, id) in by_age.into_iter().take(excess) {
                entries.remove(&id);
            }
            self.stats
                .evictions
                .fetch_add(excess as u64, Ordering::Relaxed);
        }

        debug!(
            count = records.len(),
            evicted = excess,
            size = entries.len(),
            "Cached records"
        );
    }

    pub async fn get(&self, id: &Identifier) -> Option<R> {
        self.entries
            .read()
            .await
            .get(id)
            .map(|entry| entry.record.clone())
    }

    /// Drops one entry, e.g. after the record changed in its store.
    pub async fn remove(&self, id: &Identifier) -> Option<R> {
        self.entries
            .write()
            .await
            .remove(id)
            .map(|entry| entry.record)
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

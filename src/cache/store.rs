//! Cache Store Module
//!
//! Main cache engine: an ordering index of entries, a cache-wide expiration
//! applied lazily on read, and an eviction strategy enforcing capacity.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, EvictionStrategy, OrderingIndex};

/// Upper bound on slots reserved at construction; the index grows past it on demand.
const PREALLOCATE_LIMIT: usize = 1024;

// == Cache Store ==
/// Bounded key-value store with lazy expiration and pluggable eviction.
///
/// All operations are total: misses and expired keys both read as absent,
/// and capacity is enforced by evicting, never by rejecting a set.
#[derive(Debug)]
pub struct CacheStore<V> {
    index: OrderingIndex<V>,
    strategy: EvictionStrategy,
    stats: CacheStats,
    /// Maximum number of live entries
    capacity: usize,
    /// Age after which an entry reads as absent
    expiration: Duration,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries; 0 evicts before every new key
    /// * `expiration` - Cache-wide entry lifetime; zero expires entries immediately
    /// * `strategy` - Eviction policy used for the lifetime of the store
    pub fn new(capacity: usize, expiration: Duration, strategy: EvictionStrategy) -> Self {
        Self {
            index: OrderingIndex::with_capacity(capacity.min(PREALLOCATE_LIMIT)),
            strategy,
            stats: CacheStats::new(),
            capacity,
            expiration,
        }
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// A live key is refreshed in place: new value and timestamp, moved to the
    /// back, frequency kept. A new (or expired) key evicts one entry first when
    /// the store is at capacity, then is inserted at the back with frequency 1.
    pub fn set(&mut self, key: String, value: V) {
        if let Some(entry) = self.index.get_mut(&key) {
            if !entry.is_expired(self.expiration) {
                entry.refresh(value);
                self.index.move_to_back(&key);
                return;
            }
            self.purge(&key);
        }

        if self.index.len() >= self.capacity {
            if let Some(evicted) = self.strategy.evict(&mut self.index) {
                debug!(key = evicted.key(), strategy = %self.strategy, "evicted entry");
                self.stats.record_eviction();
            }
        }

        self.index.push_back(CacheEntry::new(key, value));
        self.stats.set_total_entries(self.index.len());
    }

    // == Delete ==
    /// Removes `key` if present. Returns whether an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.index.remove(key).is_some();
        self.stats.set_total_entries(self.index.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    pub fn strategy(&self) -> EvictionStrategy {
        self.strategy
    }

    fn purge(&mut self, key: &str) {
        if self.index.remove(key).is_some() {
            debug!(key, "purged expired entry");
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.index.len());
        }
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &OrderingIndex<V> {
        &self.index
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Returns a copy of the value for `key`.
    ///
    /// Expired entries are purged and read as absent. A hit is recorded with
    /// the eviction strategy (recency for LRU, frequency for LFU).
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.index.get(key) {
            Some(entry) => entry.is_expired(self.expiration),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.purge(key);
            self.stats.record_miss();
            return None;
        }

        self.strategy.record_hit(&mut self.index, key);
        self.stats.record_hit();
        self.index.get(key).map(|entry| entry.value.clone())
    }

    // == Get All ==
    /// Snapshot of every live entry.
    ///
    /// Purges expired entries on the way; recency and frequency of the
    /// surviving entries are left untouched.
    pub fn get_all(&mut self) -> HashMap<String, V> {
        let expired: Vec<String> = self
            .index
            .iter()
            .filter(|entry| entry.is_expired(self.expiration))
            .map(|entry| entry.key().to_string())
            .collect();

        for key in &expired {
            self.purge(key);
        }

        self.index
            .iter()
            .map(|entry| (entry.key().to_string(), entry.value.clone()))
            .collect()
    }
}

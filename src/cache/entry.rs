//! Cache Entry Module
//!
//! Defines the record stored for every key, together with the bookkeeping
//! used by expiration and eviction.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached key/value record.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    key: String,
    /// The stored value
    pub value: V,
    /// Last write time, refreshed on every set and never on get
    pub(crate) timestamp: Instant,
    /// Access counter, starts at 1 and is only bumped by LFU hits
    pub(crate) frequency: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry stamped with the current time and a frequency of 1.
    pub fn new(key: String, value: V) -> Self {
        Self {
            key,
            value,
            timestamp: Instant::now(),
            frequency: 1,
        }
    }

    /// Returns the key this entry was created under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Time of the last write.
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Number of LFU hits plus one.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    // == Refresh ==
    /// Overwrites the value and restamps the entry. Frequency is left untouched.
    pub fn refresh(&mut self, value: V) {
        self.value = value;
        self.timestamp = Instant::now();
    }

    /// Time elapsed since the last write.
    pub fn age(&self) -> Duration {
        self.timestamp.elapsed()
    }

    // == Is Expired ==
    /// Checks the entry against the cache-wide expiration.
    ///
    /// An entry is expired once its age is strictly greater than `expiration`.
    /// A zero expiration expires everything immediately.
    pub fn is_expired(&self, expiration: Duration) -> bool {
        expiration.is_zero() || self.age() > expiration
    }

    /// Consumes the entry, returning its key and value.
    pub fn into_parts(self) -> (String, V) {
        (self.key, self.value)
    }
}

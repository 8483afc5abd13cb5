//! Eviction Strategy Module
//!
//! Selects which entry to drop when a set would exceed capacity, and keeps
//! the access bookkeeping each policy needs on a cache hit.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::trace;

use crate::cache::{CacheEntry, OrderingIndex};
use crate::error::ParseStrategyError;

// == Eviction Strategy ==
/// Eviction policy, fixed for the lifetime of a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Least recently used: hits move the entry to the back, eviction takes the front.
    #[default]
    Lru,
    /// Least frequently used: hits bump the counter, eviction takes the lowest count.
    Lfu,
}

impl EvictionStrategy {
    // == Evict ==
    /// Removes exactly one entry from `index`, or nothing if it is empty.
    pub fn evict<V>(&self, index: &mut OrderingIndex<V>) -> Option<CacheEntry<V>> {
        match self {
            EvictionStrategy::Lru => index.pop_front(),
            EvictionStrategy::Lfu => {
                let victim = least_frequent(index)?.to_string();
                index.remove(&victim)
            }
        }
    }

    // == Record Hit ==
    /// Applies the policy's bookkeeping for a successful get of `key`.
    pub fn record_hit<V>(&self, index: &mut OrderingIndex<V>, key: &str) {
        match self {
            EvictionStrategy::Lru => {
                index.move_to_back(key);
            }
            EvictionStrategy::Lfu => {
                if let Some(entry) = index.get_mut(key) {
                    entry.frequency += 1;
                    trace!(key, frequency = entry.frequency, "lfu hit");
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Lfu => "lfu",
        }
    }
}

/// Key with the strictly smallest frequency; ties go to the entry nearest the front.
fn least_frequent<V>(index: &OrderingIndex<V>) -> Option<&str> {
    let mut victim: Option<&CacheEntry<V>> = None;
    for entry in index.iter() {
        if victim.map_or(true, |v| entry.frequency < v.frequency) {
            victim = Some(entry);
        }
    }
    victim.map(CacheEntry::key)
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionStrategy::Lru),
            "lfu" => Ok(EvictionStrategy::Lfu),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

//! Shared Cache Module
//!
//! Thread-safe handle over a [`CacheStore`]. Every operation runs under one
//! exclusive lock, so operations are serialized and never observe a
//! half-updated index.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::cache::{CacheStats, CacheStore, EvictionStrategy};

// == Shared Cache ==
/// Clonable, concurrency-safe cache handle. Clones share the same store.
#[derive(Debug)]
pub struct SharedCache<V> {
    inner: Arc<Mutex<CacheStore<V>>>,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> SharedCache<V> {
    /// Creates a new shared cache around a fresh store.
    pub fn new(capacity: usize, expiration: Duration, strategy: EvictionStrategy) -> Self {
        Self::from_store(CacheStore::new(capacity, expiration, strategy))
    }

    /// Wraps an existing store.
    pub fn from_store(store: CacheStore<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn set(&self, key: String, value: V) {
        self.inner.lock().await.set(key, value);
    }

    /// Removes `key` if present. Returns whether an entry was removed.
    pub async fn delete(&self, key: &str) -> bool {
        self.inner.lock().await.delete(key)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    /// Capacity, expiration and strategy the store was built with.
    pub async fn settings(&self) -> (usize, Duration, EvictionStrategy) {
        let store = self.inner.lock().await;
        (store.capacity(), store.expiration(), store.strategy())
    }
}

impl<V: Clone> SharedCache<V> {
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().await.get(key)
    }

    pub async fn get_all(&self) -> HashMap<String, V> {
        self.inner.lock().await.get_all()
    }
}

//! Vibe Hush - An in-memory key-value cache server
//!
//! A bounded cache engine with cache-wide expiration and LRU or LFU eviction,
//! served over a small authenticated HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;

pub use api::AppState;
pub use cache::{CacheStore, EvictionStrategy, SharedCache};
pub use config::Config;

//! Cache Module
//!
//! In-memory cache engine with a cache-wide expiration and LRU or LFU eviction.

mod entry;
mod eviction;
mod index;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use eviction::EvictionStrategy;
pub use index::{Iter, OrderingIndex};
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

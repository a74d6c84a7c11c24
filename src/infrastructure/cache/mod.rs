//! Caching layer for fast lookups and revocation markers.
//!
//! Provides a [`CacheService`] trait with two implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MemoryCache`] - In-process cache for single-node runs and tests
//!
//! [`CachedUrlEntry`] is the JSON wire format entries take inside the cache.

mod entry;
mod memory_cache;
mod redis_cache;
mod service;

pub use entry::CachedUrlEntry;
pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;

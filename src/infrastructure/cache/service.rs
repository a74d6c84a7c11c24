//! Cache service trait and error types.

use crate::error::AppError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        AppError::backend_unavailable(
            "Cache backend unavailable",
            serde_json::json!({ "cause": e.to_string() }),
        )
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for the ephemeral key-value cache.
///
/// Implementations must be thread-safe. Backend failures are *reported*, not
/// swallowed: the resolution path treats an `Err` like a miss and falls back
/// to the durable store, while the revocation path inspects it to pick its
/// configured failure posture. A cached value is never required for
/// correctness, only for speed.
///
/// Keys are plain strings; callers own the key shape (bare alias for cached
/// entries, `blacklist:`-prefixed ids for revocation markers).
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process cache for
///   single-node deployments and tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on hit
    /// - `Ok(None)` on miss (including entries the backend already expired)
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot be reached or the
    /// operation fails.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key` with the given time-to-live.
    ///
    /// The entry disappears on its own once the TTL elapses; nothing ever
    /// extends it in place. `ttl` must be positive.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot be reached or the
    /// operation fails.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes `key` if present. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot be reached or the
    /// operation fails.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Reports whether `key` currently holds a live value.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot be reached or the
    /// operation fails.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Checks if the cache backend is reachable.
    ///
    /// Used by health reporting to expose cache status.
    async fn health_check(&self) -> bool;
}

//! Token revocation list service.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

const BLACKLIST_KEY_PREFIX: &str = "blacklist:";

/// Service maintaining the revocation list for session tokens.
///
/// A revoked token is marked in the cache for exactly its remaining
/// lifetime. Once the token itself would have expired, the marker evaporates
/// on its own and there is nothing to clean up, so the list stays bounded by
/// the number of live revoked tokens.
///
/// # Failure Posture
///
/// `revoke` always surfaces a backend failure: a revocation that cannot be
/// recorded must not look successful. `is_revoked` defaults to treating an
/// unreachable backend as "not revoked" so a cache outage does not lock
/// every session out; constructing the service with `fail_closed = true`
/// propagates the error instead, for deployments that prefer lockout over a
/// revoked token slipping through.
pub struct RevocationService {
    cache: Arc<dyn CacheService>,
    fail_closed: bool,
}

impl RevocationService {
    /// Creates a new revocation service.
    pub fn new(cache: Arc<dyn CacheService>, fail_closed: bool) -> Self {
        Self { cache, fail_closed }
    }

    /// Constructs the marker key for a token id.
    fn build_key(token_id: &str) -> String {
        format!("{BLACKLIST_KEY_PREFIX}{token_id}")
    }

    /// Revokes a token for the remainder of its lifetime.
    ///
    /// The marker is written with `remaining` as its TTL, after which it
    /// expires together with the token it shadows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidTtl`] if `remaining` is zero or negative;
    /// an already-expired token needs no marker.
    /// Returns [`AppError::BackendUnavailable`] if the marker cannot be
    /// written.
    pub async fn revoke(&self, token_id: &str, remaining: Duration) -> Result<(), AppError> {
        if remaining <= Duration::zero() {
            return Err(AppError::invalid_ttl(
                "Token already expired",
                json!({ "remaining_ms": remaining.num_milliseconds() }),
            ));
        }

        let ttl = remaining.to_std().map_err(|e| {
            AppError::internal(
                "Remaining lifetime conversion failed",
                json!({ "reason": e.to_string() }),
            )
        })?;

        self.cache
            .set(&Self::build_key(token_id), "1", ttl)
            .await
            .map_err(AppError::from)?;

        debug!("Revoked token {} for {:?}", token_id, ttl);
        Ok(())
    }

    /// Revokes a token until the moment it would expire anyway.
    ///
    /// Convenience over [`revoke`](Self::revoke) for callers that hold the
    /// token's absolute expiry claim rather than a remaining duration.
    pub async fn revoke_until(
        &self,
        token_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.revoke(token_id, expires_at - Utc::now()).await
    }

    /// Checks whether a token is currently revoked.
    ///
    /// A marker that has outlived its TTL counts as absent, which matches
    /// the token having expired on its own.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] on cache failure only when
    /// the service was built fail-closed; otherwise the failure is logged
    /// and the token is treated as not revoked.
    pub async fn is_revoked(&self, token_id: &str) -> Result<bool, AppError> {
        match self.cache.exists(&Self::build_key(token_id)).await {
            Ok(found) => Ok(found),
            Err(e) if self.fail_closed => {
                warn!("Revocation check failed for {} (fail-closed): {}", token_id, e);
                Err(AppError::from(e))
            }
            Err(e) => {
                warn!(
                    "Revocation check failed for {}, treating as not revoked: {}",
                    token_id, e
                );
                Ok(false)
            }
        }
    }
}

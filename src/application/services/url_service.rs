//! Short URL resolution and lifecycle service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::domain::entities::{ArchivedUrlEntry, NewUrlEntry, UrlEntry};
use crate::domain::repositories::UrlRepository;
use crate::domain::visit_event::VisitEvent;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, CachedUrlEntry};
use crate::utils::alias::{generate_alias, validate_custom_alias};
use crate::utils::url_normalizer::normalize_target_url;
use crate::utils::utc_time::{utc_z, utc_z_opt};

/// Tunables for [`UrlService`], wired from config at startup.
#[derive(Debug, Clone)]
pub struct UrlServiceOptions {
    /// TTL applied to every cached entry.
    pub cache_ttl: Duration,
    /// Default lifetime for entries created without an owner and without an
    /// explicit expiry.
    pub anonymous_expiry_days: u32,
}

impl Default for UrlServiceOptions {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            anonymous_expiry_days: 30,
        }
    }
}

/// Usage statistics view for one alias.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlStats {
    pub original_url: String,
    pub times_visited: i64,
    #[serde(with = "utc_z")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "utc_z_opt")]
    pub last_visited: Option<DateTime<Utc>>,
}

impl From<&UrlEntry> for UrlStats {
    fn from(entry: &UrlEntry) -> Self {
        Self {
            original_url: entry.target_url.clone(),
            times_visited: entry.visit_count,
            created_at: entry.created_at,
            last_visited: entry.last_visited_at,
        }
    }
}

/// Service for resolving and managing shortened URLs.
///
/// Reads go cache-first with the durable store as fallback; the cache is
/// never required for a correct answer. Every successful resolution emits a
/// fire-and-forget visit event consumed by
/// [`crate::domain::visit_worker::run_visit_worker`].
pub struct UrlService<S: UrlRepository> {
    store: Arc<S>,
    cache: Arc<dyn CacheService>,
    visit_tx: mpsc::Sender<VisitEvent>,
    options: UrlServiceOptions,
}

impl<S: UrlRepository> UrlService<S> {
    /// Creates a new URL service.
    pub fn new(
        store: Arc<S>,
        cache: Arc<dyn CacheService>,
        visit_tx: mpsc::Sender<VisitEvent>,
        options: UrlServiceOptions,
    ) -> Self {
        Self {
            store,
            cache,
            visit_tx,
            options,
        }
    }

    /// Resolves an alias to its target URL.
    ///
    /// # Resolution Flow
    ///
    /// 1. Check the cache for the alias
    /// 2. On a miss, fetch from the durable store
    /// 3. Asynchronously repopulate the cache with a fresh TTL
    /// 4. Send a visit event to the background worker
    /// 5. Return the target URL
    ///
    /// # Cache Strategy
    ///
    /// - **Cache hit**: immediate answer, store untouched
    /// - **Cache miss**: store lookup, spawned cache write
    /// - **Cache error or undecodable payload**: log and fall back to the store
    ///
    /// Expiry is enforced lazily by the sweeper, not here: an entry past its
    /// `expires_at` that has not been swept yet still resolves.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the alias does not exist.
    /// Returns [`AppError::BackendUnavailable`] if the store cannot be
    /// reached; a cache failure alone never fails a resolution.
    pub async fn resolve(&self, alias: &str) -> Result<String, AppError> {
        match self.cache.get(alias).await {
            Ok(Some(payload)) => match CachedUrlEntry::from_json(&payload) {
                Ok(cached) => {
                    debug!("Cache HIT for {}", alias);
                    self.record_visit(alias);
                    return Ok(cached.long_url);
                }
                Err(e) => {
                    // Treated as a miss; the repopulate below overwrites it.
                    warn!("Undecodable cache payload for {}: {}", alias, e);
                }
            },
            Ok(None) => {
                debug!("Cache MISS for {}", alias);
            }
            Err(e) => {
                error!("Cache error: {}", e);
                // Backend is down, a write would fail too. Skip the fill.
                return self.resolve_from_store(alias, false).await;
            }
        }

        self.resolve_from_store(alias, true).await
    }

    async fn resolve_from_store(&self, alias: &str, fill_cache: bool) -> Result<String, AppError> {
        let entry = self
            .store
            .find_by_alias(alias)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "alias": alias })))?;

        if fill_cache {
            self.spawn_cache_fill(&entry);
        }
        self.record_visit(alias);
        Ok(entry.target_url)
    }

    /// Creates a short URL.
    ///
    /// # Alias Selection
    ///
    /// - If `custom_alias` is provided, validates and uses it (or returns a
    ///   conflict error)
    /// - Otherwise generates a random 6-character alias, retrying up to 10
    ///   times on collision before failing
    ///
    /// # Expiry
    ///
    /// Entries created without an owner and without an explicit expiry get a
    /// default one (`anonymous_expiry_days` ahead) so abandoned anonymous
    /// aliases age out. Owned entries never expire implicitly.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or custom alias is
    /// invalid, or the expiry lies in the past.
    /// Returns [`AppError::Conflict`] if the custom alias already exists.
    pub async fn create_short_url(
        &self,
        target_url: String,
        custom_alias: Option<String>,
        expires_at: Option<DateTime<Utc>>,
        owner_id: Option<i64>,
    ) -> Result<UrlEntry, AppError> {
        let normalized_url = normalize_target_url(&target_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if let Some(expiry) = expires_at
            && expiry <= Utc::now()
        {
            return Err(AppError::bad_request(
                "Expiry must lie in the future",
                json!({ "expires_at": expiry.to_rfc3339() }),
            ));
        }

        let alias = if let Some(custom) = custom_alias {
            validate_custom_alias(&custom)?;

            if self.store.find_by_alias(&custom).await?.is_some() {
                return Err(AppError::conflict(
                    "Alias already exists",
                    json!({ "alias": custom }),
                ));
            }

            custom
        } else {
            self.generate_unique_alias().await?
        };

        let expires_at = match (expires_at, owner_id) {
            (Some(expiry), _) => Some(expiry),
            (None, Some(_)) => None,
            // Unowned entries do not live forever.
            (None, None) => {
                Some(Utc::now() + chrono::Duration::days(self.options.anonymous_expiry_days as i64))
            }
        };

        let entry = self
            .store
            .save(NewUrlEntry {
                alias,
                target_url: normalized_url,
                owner_id,
                expires_at,
            })
            .await?;

        self.refresh_cache(&entry).await;

        Ok(entry)
    }

    /// Points an existing alias at a new target URL.
    ///
    /// The cached copy is refreshed so readers pick up the new target
    /// without waiting out the old TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is invalid.
    /// Returns [`AppError::NotFound`] if the alias does not exist.
    /// Returns [`AppError::Forbidden`] if the entry is owned by someone else.
    pub async fn update_target_url(
        &self,
        alias: &str,
        new_target_url: String,
        requester: Option<i64>,
    ) -> Result<UrlEntry, AppError> {
        let normalized_url = normalize_target_url(&new_target_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let mut entry = self
            .store
            .find_by_alias(alias)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "alias": alias })))?;

        ensure_owner(&entry, requester)?;

        entry.target_url = normalized_url;
        let updated = self.store.update(&entry).await?;

        self.refresh_cache(&updated).await;

        Ok(updated)
    }

    /// Deletes an alias: removes it from the store, writes an archive
    /// tombstone, purges the cached copy, and returns the removed entry.
    ///
    /// The purge comes after the store delete; a reader racing in between
    /// can re-fill the cache, and that copy ages out with its TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the alias does not exist.
    /// Returns [`AppError::Forbidden`] if the entry is owned by someone else.
    pub async fn delete_by_alias(
        &self,
        alias: &str,
        requester: Option<i64>,
    ) -> Result<UrlEntry, AppError> {
        let entry = self
            .store
            .find_by_alias(alias)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "alias": alias })))?;

        ensure_owner(&entry, requester)?;

        let removed = match self.store.delete(alias).await? {
            Some(removed) => {
                self.store
                    .archive(ArchivedUrlEntry::from_entry(removed.clone(), Utc::now()))
                    .await?;
                removed
            }
            // Lost the race with another deleter; the winner wrote the
            // tombstone, so return the snapshot we already hold.
            None => entry,
        };

        if let Err(e) = self.cache.delete(alias).await {
            warn!("Failed to purge cache for {}: {}", alias, e);
        }

        Ok(removed)
    }

    /// Looks up the entry shortening a given target URL.
    ///
    /// The input is normalized the same way `create_short_url` normalizes
    /// it, so lookups match regardless of case or fragment noise.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is invalid.
    /// Returns [`AppError::NotFound`] if the URL was never shortened.
    pub async fn find_by_target_url(&self, target_url: &str) -> Result<UrlEntry, AppError> {
        let normalized_url = normalize_target_url(target_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        self.store
            .find_by_target(&normalized_url)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "No short URL for this target",
                    json!({ "target_url": normalized_url }),
                )
            })
    }

    /// Returns the usage statistics for an alias, straight from the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the alias does not exist.
    pub async fn get_stats(&self, alias: &str) -> Result<UrlStats, AppError> {
        let entry = self
            .store
            .find_by_alias(alias)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "alias": alias })))?;

        Ok(UrlStats::from(&entry))
    }

    /// Lists every active entry.
    pub async fn list_all(&self) -> Result<Vec<UrlEntry>, AppError> {
        self.store.list_all().await
    }

    /// Lists every archived tombstone.
    pub async fn list_archived(&self) -> Result<Vec<ArchivedUrlEntry>, AppError> {
        self.store.list_archived().await
    }

    /// Generates an alias not yet present in the store, with collision retry.
    ///
    /// Attempts up to 10 times before failing.
    async fn generate_unique_alias(&self) -> Result<String, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for _ in 0..MAX_ATTEMPTS {
            let alias = generate_alias();

            if self.store.find_by_alias(&alias).await?.is_none() {
                return Ok(alias);
            }
        }

        Err(AppError::internal(
            "Failed to generate unique alias",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Enqueues a visit event for the alias without waiting.
    ///
    /// This is the fire-and-forget half of usage tracking: the resolution
    /// path calls it on every successful answer, and callers replaying
    /// recorded traffic can call it directly.
    pub fn record_visit(&self, alias: &str) {
        if let Err(e) = self.visit_tx.try_send(VisitEvent::new(alias)) {
            // Queue full or worker gone. The visit is lost, the answer is not.
            debug!(error = %e, "dropping visit event");
        }
    }

    /// Writes the cached copy asynchronously (fire-and-forget).
    fn spawn_cache_fill(&self, entry: &UrlEntry) {
        let cache = Arc::clone(&self.cache);
        let ttl = self.options.cache_ttl;
        let snapshot = CachedUrlEntry::from_entry(entry);

        tokio::spawn(async move {
            match snapshot.to_json() {
                Ok(payload) => {
                    if let Err(e) = cache.set(&snapshot.short_url, &payload, ttl).await {
                        error!("Failed to cache URL: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to encode cache payload for {}: {}", snapshot.short_url, e);
                }
            }
        });
    }

    /// Writes the cached copy in place, absorbing failures.
    async fn refresh_cache(&self, entry: &UrlEntry) {
        let snapshot = CachedUrlEntry::from_entry(entry);
        match snapshot.to_json() {
            Ok(payload) => {
                if let Err(e) = self
                    .cache
                    .set(&entry.alias, &payload, self.options.cache_ttl)
                    .await
                {
                    warn!("Failed to cache {}: {}", entry.alias, e);
                }
            }
            Err(e) => {
                warn!("Failed to encode cache payload for {}: {}", entry.alias, e);
            }
        }
    }
}

/// Owned entries may only be mutated by their owner. Anonymous entries may
/// be mutated by anyone, including anonymous requesters.
fn ensure_owner(entry: &UrlEntry, requester: Option<i64>) -> Result<(), AppError> {
    match entry.owner_id {
        Some(owner) if requester != Some(owner) => Err(AppError::forbidden(
            "Not the owner of this alias",
            json!({ "alias": entry.alias }),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::cache::MockCacheService;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_entry(alias: &str, url: &str) -> UrlEntry {
        UrlEntry::new(
            10,
            alias.to_string(),
            url.to_string(),
            None,
            Utc::now(),
            None,
            3,
            None,
        )
    }

    fn build_service(
        store: MockUrlRepository,
        cache: MockCacheService,
    ) -> (UrlService<MockUrlRepository>, mpsc::Receiver<VisitEvent>) {
        let (tx, rx) = mpsc::channel(8);
        let service = UrlService::new(
            Arc::new(store),
            Arc::new(cache),
            tx,
            UrlServiceOptions::default(),
        );
        (service, rx)
    }

    #[tokio::test]
    async fn test_resolve_cache_hit_skips_store() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        let payload = CachedUrlEntry::from_entry(&test_entry("abc123", "https://example.com"))
            .to_json()
            .unwrap();
        cache
            .expect_get()
            .withf(|key| key == "abc123")
            .times(1)
            .returning(move |_| Ok(Some(payload.clone())));
        store.expect_find_by_alias().times(0);

        let (service, mut rx) = build_service(store, cache);

        let url = service.resolve("abc123").await.unwrap();

        assert_eq!(url, "https://example.com");
        assert_eq!(rx.try_recv().unwrap().alias, "abc123");
    }

    #[tokio::test]
    async fn test_resolve_cache_miss_falls_back_and_fills() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        cache.expect_get().times(1).returning(|_| Ok(None));
        store
            .expect_find_by_alias()
            .times(1)
            .returning(|_| Ok(Some(test_entry("abc123", "https://example.com"))));
        cache
            .expect_set()
            .withf(|key, payload, _| key == "abc123" && payload.contains("\"longUrl\""))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (service, mut rx) = build_service(store, cache);

        let url = service.resolve("abc123").await.unwrap();

        // Let the spawned cache fill run before expectations are verified.
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(url, "https://example.com");
        assert_eq!(rx.try_recv().unwrap().alias, "abc123");
    }

    #[tokio::test]
    async fn test_resolve_unknown_alias_is_not_found() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        cache.expect_get().times(1).returning(|_| Ok(None));
        store.expect_find_by_alias().times(1).returning(|_| Ok(None));
        cache.expect_set().times(0);

        let (service, mut rx) = build_service(store, cache);

        let err = service.resolve("nope").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resolve_cache_error_falls_back_without_fill() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        cache
            .expect_get()
            .times(1)
            .returning(|_| Err(crate::infrastructure::cache::CacheError::OperationError(
                "connection refused".to_string(),
            )));
        store
            .expect_find_by_alias()
            .times(1)
            .returning(|_| Ok(Some(test_entry("abc123", "https://example.com"))));
        cache.expect_set().times(0);

        let (service, mut rx) = build_service(store, cache);

        let url = service.resolve("abc123").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(url, "https://example.com");
        assert_eq!(rx.try_recv().unwrap().alias, "abc123");
    }

    #[tokio::test]
    async fn test_resolve_undecodable_payload_falls_back_and_overwrites() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        cache
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("{not json".to_string())));
        store
            .expect_find_by_alias()
            .times(1)
            .returning(|_| Ok(Some(test_entry("abc123", "https://example.com"))));
        cache.expect_set().times(1).returning(|_, _, _| Ok(()));

        let (service, _rx) = build_service(store, cache);

        let url = service.resolve("abc123").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn test_create_with_custom_alias() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        store
            .expect_find_by_alias()
            .withf(|alias| alias == "promo")
            .times(1)
            .returning(|_| Ok(None));
        store
            .expect_save()
            .withf(|new_entry| new_entry.alias == "promo" && new_entry.owner_id == Some(7))
            .times(1)
            .returning(|new_entry| {
                Ok(UrlEntry::new(
                    1,
                    new_entry.alias,
                    new_entry.target_url,
                    new_entry.owner_id,
                    Utc::now(),
                    None,
                    0,
                    new_entry.expires_at,
                ))
            });
        cache.expect_set().times(1).returning(|_, _, _| Ok(()));

        let (service, _rx) = build_service(store, cache);

        let entry = service
            .create_short_url(
                "https://example.com".to_string(),
                Some("promo".to_string()),
                None,
                Some(7),
            )
            .await
            .unwrap();

        assert_eq!(entry.alias, "promo");
        // Owned entries get no implicit expiry.
        assert!(entry.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_create_custom_alias_conflict() {
        let mut store = MockUrlRepository::new();
        let cache = MockCacheService::new();

        store
            .expect_find_by_alias()
            .times(1)
            .returning(|_| Ok(Some(test_entry("taken", "https://other.example"))));
        store.expect_save().times(0);

        let (service, _rx) = build_service(store, cache);

        let err = service
            .create_short_url(
                "https://example.com".to_string(),
                Some("taken".to_string()),
                None,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_alias_and_url() {
        let store = MockUrlRepository::new();
        let cache = MockCacheService::new();
        let (service, _rx) = build_service(store, cache);

        let err = service
            .create_short_url(
                "https://example.com".to_string(),
                Some("way-too-long-alias".to_string()),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = service
            .create_short_url("not-a-url".to_string(), None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_past_expiry() {
        let store = MockUrlRepository::new();
        let cache = MockCacheService::new();
        let (service, _rx) = build_service(store, cache);

        let err = service
            .create_short_url(
                "https://example.com".to_string(),
                None,
                Some(Utc::now() - chrono::Duration::hours(1)),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_anonymous_gets_default_expiry() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        store.expect_find_by_alias().times(1).returning(|_| Ok(None));
        store
            .expect_save()
            .withf(|new_entry| new_entry.owner_id.is_none() && new_entry.expires_at.is_some())
            .times(1)
            .returning(|new_entry| {
                Ok(UrlEntry::new(
                    1,
                    new_entry.alias,
                    new_entry.target_url,
                    None,
                    Utc::now(),
                    None,
                    0,
                    new_entry.expires_at,
                ))
            });
        cache.expect_set().times(1).returning(|_, _, _| Ok(()));

        let (service, _rx) = build_service(store, cache);

        let entry = service
            .create_short_url("https://example.com".to_string(), None, None, None)
            .await
            .unwrap();

        let expiry = entry.expires_at.unwrap();
        assert!(expiry > Utc::now() + chrono::Duration::days(29));
        assert!(expiry < Utc::now() + chrono::Duration::days(31));
    }

    #[tokio::test]
    async fn test_create_retries_alias_collision() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        let calls = AtomicUsize::new(0);
        store
            .expect_find_by_alias()
            .times(2)
            .returning(move |alias| {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(Some(test_entry(alias, "https://already.example")))
                } else {
                    Ok(None)
                }
            });
        store.expect_save().times(1).returning(|new_entry| {
            Ok(UrlEntry::new(
                1,
                new_entry.alias,
                new_entry.target_url,
                None,
                Utc::now(),
                None,
                0,
                new_entry.expires_at,
            ))
        });
        cache.expect_set().times(1).returning(|_, _, _| Ok(()));

        let (service, _rx) = build_service(store, cache);

        let entry = service
            .create_short_url("https://example.com".to_string(), None, None, None)
            .await
            .unwrap();

        assert_eq!(entry.alias.len(), 6);
    }

    #[tokio::test]
    async fn test_update_refreshes_cache() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        store
            .expect_find_by_alias()
            .times(1)
            .returning(|_| Ok(Some(test_entry("abc123", "https://old.example"))));
        store
            .expect_update()
            .withf(|entry| entry.target_url == "https://new.example/")
            .times(1)
            .returning(|entry| Ok(entry.clone()));
        cache
            .expect_set()
            .withf(|key, payload, _| key == "abc123" && payload.contains("new.example"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (service, _rx) = build_service(store, cache);

        let updated = service
            .update_target_url("abc123", "https://new.example".to_string(), None)
            .await
            .unwrap();

        assert_eq!(updated.target_url, "https://new.example/");
    }

    #[tokio::test]
    async fn test_update_foreign_owner_is_forbidden() {
        let mut store = MockUrlRepository::new();
        let cache = MockCacheService::new();

        store.expect_find_by_alias().times(1).returning(|_| {
            let mut entry = test_entry("abc123", "https://example.com");
            entry.owner_id = Some(1);
            Ok(Some(entry))
        });
        store.expect_update().times(0);

        let (service, _rx) = build_service(store, cache);

        let err = service
            .update_target_url("abc123", "https://new.example".to_string(), Some(2))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_delete_archives_and_purges_cache() {
        let mut store = MockUrlRepository::new();
        let mut cache = MockCacheService::new();

        store
            .expect_find_by_alias()
            .times(1)
            .returning(|_| Ok(Some(test_entry("abc123", "https://example.com"))));
        store
            .expect_delete()
            .times(1)
            .returning(|_| Ok(Some(test_entry("abc123", "https://example.com"))));
        store
            .expect_archive()
            .withf(|archived| archived.alias == "abc123")
            .times(1)
            .returning(|_| Ok(()));
        cache
            .expect_delete()
            .withf(|key| key == "abc123")
            .times(1)
            .returning(|_| Ok(()));

        let (service, _rx) = build_service(store, cache);

        let removed = service.delete_by_alias("abc123", None).await.unwrap();
        assert_eq!(removed.alias, "abc123");
    }

    #[tokio::test]
    async fn test_delete_unknown_alias_is_not_found() {
        let mut store = MockUrlRepository::new();
        let cache = MockCacheService::new();

        store.expect_find_by_alias().times(1).returning(|_| Ok(None));
        store.expect_delete().times(0);

        let (service, _rx) = build_service(store, cache);

        let err = service.delete_by_alias("nope", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_foreign_owner_is_forbidden() {
        let mut store = MockUrlRepository::new();
        let cache = MockCacheService::new();

        store.expect_find_by_alias().times(1).returning(|_| {
            let mut entry = test_entry("abc123", "https://example.com");
            entry.owner_id = Some(5);
            Ok(Some(entry))
        });
        store.expect_delete().times(0);

        let (service, _rx) = build_service(store, cache);

        let err = service
            .delete_by_alias("abc123", Some(6))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_find_by_target_url_normalizes_input() {
        let mut store = MockUrlRepository::new();
        let cache = MockCacheService::new();

        store
            .expect_find_by_target()
            .withf(|url| url == "https://example.com/path")
            .times(1)
            .returning(|_| Ok(Some(test_entry("abc123", "https://example.com/path"))));

        let (service, _rx) = build_service(store, cache);

        let entry = service
            .find_by_target_url("HTTPS://EXAMPLE.COM:443/path#frag")
            .await
            .unwrap();

        assert_eq!(entry.alias, "abc123");
    }

    #[tokio::test]
    async fn test_get_stats_maps_entry_fields() {
        let mut store = MockUrlRepository::new();
        let cache = MockCacheService::new();

        store.expect_find_by_alias().times(1).returning(|_| {
            let mut entry = test_entry("abc123", "https://example.com");
            entry.visit_count = 42;
            entry.last_visited_at = Some(Utc::now());
            Ok(Some(entry))
        });

        let (service, _rx) = build_service(store, cache);

        let stats = service.get_stats("abc123").await.unwrap();

        assert_eq!(stats.original_url, "https://example.com");
        assert_eq!(stats.times_visited, 42);
        assert!(stats.last_visited.is_some());

        let body = serde_json::to_value(&stats).unwrap();
        assert!(body.get("originalUrl").is_some());
        assert!(body.get("timesVisited").is_some());
    }

    #[tokio::test]
    async fn test_ensure_owner_matrix() {
        let mut anonymous = test_entry("a", "https://example.com");
        anonymous.owner_id = None;
        let mut owned = test_entry("b", "https://example.com");
        owned.owner_id = Some(1);

        assert!(ensure_owner(&anonymous, None).is_ok());
        assert!(ensure_owner(&anonymous, Some(9)).is_ok());
        assert!(ensure_owner(&owned, Some(1)).is_ok());
        assert!(ensure_owner(&owned, Some(2)).is_err());
        assert!(ensure_owner(&owned, None).is_err());
    }
}

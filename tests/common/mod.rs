#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::mpsc;

use snaplink::application::services::{UrlService, UrlServiceOptions};
use snaplink::domain::entities::UrlEntry;
use snaplink::domain::visit_event::VisitEvent;
use snaplink::infrastructure::cache::{CacheService, CachedUrlEntry, MemoryCache};
use snaplink::infrastructure::persistence::InMemoryUrlRepository;

pub const TEST_CACHE_TTL: Duration = Duration::from_secs(60);

/// A wired service over real in-process backends, with the visit channel's
/// receiving end held by the test so enqueued events can be inspected.
pub struct TestService {
    pub urls: Arc<UrlService<InMemoryUrlRepository>>,
    pub store: Arc<InMemoryUrlRepository>,
    pub cache: Arc<MemoryCache>,
    pub visit_rx: mpsc::Receiver<VisitEvent>,
}

pub fn create_test_service() -> TestService {
    let store = Arc::new(InMemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let (visit_tx, visit_rx) = mpsc::channel(100);

    let urls = Arc::new(UrlService::new(
        Arc::clone(&store),
        Arc::clone(&cache) as Arc<dyn CacheService>,
        visit_tx,
        UrlServiceOptions {
            cache_ttl: TEST_CACHE_TTL,
            anonymous_expiry_days: 30,
        },
    ));

    TestService {
        urls,
        store,
        cache,
        visit_rx,
    }
}

fn base_entry(alias: &str, url: &str) -> UrlEntry {
    UrlEntry::new(
        0,
        alias.to_string(),
        url.to_string(),
        None,
        Utc::now() - ChronoDuration::days(1),
        None,
        0,
        None,
    )
}

pub async fn seed_entry(store: &InMemoryUrlRepository, alias: &str, url: &str) -> UrlEntry {
    store.insert(base_entry(alias, url)).await.unwrap()
}

pub async fn seed_expired_entry(store: &InMemoryUrlRepository, alias: &str, url: &str) -> UrlEntry {
    let mut entry = base_entry(alias, url);
    entry.expires_at = Some(Utc::now() - ChronoDuration::hours(1));
    entry.last_visited_at = Some(Utc::now() - ChronoDuration::minutes(5));
    store.insert(entry).await.unwrap()
}

pub async fn seed_idle_entry(
    store: &InMemoryUrlRepository,
    alias: &str,
    url: &str,
    idle_days: i64,
) -> UrlEntry {
    let mut entry = base_entry(alias, url);
    entry.created_at = Utc::now() - ChronoDuration::days(idle_days + 1);
    entry.last_visited_at = Some(Utc::now() - ChronoDuration::days(idle_days));
    store.insert(entry).await.unwrap()
}

/// Writes the canonical cached form of `entry` straight into the cache,
/// bypassing the service.
pub async fn prime_cache(cache: &MemoryCache, entry: &UrlEntry) {
    cache
        .set(
            &entry.alias,
            &CachedUrlEntry::from_entry(entry).to_json().unwrap(),
            TEST_CACHE_TTL,
        )
        .await
        .unwrap();
}

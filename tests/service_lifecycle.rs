mod common;

use chrono::{Duration as ChronoDuration, Utc};
use snaplink::domain::repositories::UrlRepository;
use snaplink::domain::visit_worker::apply_visit;
use snaplink::infrastructure::cache::{CacheService, CachedUrlEntry};

#[tokio::test]
async fn test_create_generates_alias_and_caches() {
    let svc = common::create_test_service();

    let entry = svc
        .urls
        .create_short_url("https://example.com/page".to_string(), None, None, None)
        .await
        .unwrap();

    assert_eq!(entry.alias.len(), 6);
    assert_eq!(entry.target_url, "https://example.com/page");
    assert_eq!(entry.visit_count, 0);

    // Anonymous entries pick up a default expiry so they age out.
    let expiry = entry.expires_at.expect("anonymous entry must expire");
    let days_out = (expiry - Utc::now()).num_days();
    assert!((29..=30).contains(&days_out));

    // The fresh entry is already cached.
    let payload = svc.cache.get(&entry.alias).await.unwrap().unwrap();
    let cached = CachedUrlEntry::from_json(&payload).unwrap();
    assert_eq!(cached.long_url, "https://example.com/page");
}

#[tokio::test]
async fn test_create_owned_entry_has_no_implicit_expiry() {
    let svc = common::create_test_service();

    let entry = svc
        .urls
        .create_short_url(
            "https://example.com/owned".to_string(),
            None,
            None,
            Some(42),
        )
        .await
        .unwrap();

    assert_eq!(entry.owner_id, Some(42));
    assert!(entry.expires_at.is_none());
}

#[tokio::test]
async fn test_create_custom_alias_conflict() {
    let svc = common::create_test_service();
    common::seed_entry(&svc.store, "taken", "https://example.com/first").await;

    let err = svc
        .urls
        .create_short_url(
            "https://example.com/second".to_string(),
            Some("taken".to_string()),
            None,
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "conflict");
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let svc = common::create_test_service();

    let err = svc
        .urls
        .create_short_url("ftp://example.com/file".to_string(), None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");

    let err = svc
        .urls
        .create_short_url(
            "https://example.com".to_string(),
            Some("way-too-long-alias".to_string()),
            None,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");

    let err = svc
        .urls
        .create_short_url(
            "https://example.com".to_string(),
            None,
            Some(Utc::now() - ChronoDuration::minutes(1)),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");
}

#[tokio::test]
async fn test_update_changes_target_and_refreshes_cache() {
    let svc = common::create_test_service();
    let entry = svc
        .urls
        .create_short_url("https://example.com/before".to_string(), None, None, None)
        .await
        .unwrap();

    let updated = svc
        .urls
        .update_target_url(&entry.alias, "https://example.com/after".to_string(), None)
        .await
        .unwrap();

    assert_eq!(updated.target_url, "https://example.com/after");
    assert_eq!(updated.alias, entry.alias);

    // Readers see the new target without waiting out the old TTL.
    let payload = svc.cache.get(&entry.alias).await.unwrap().unwrap();
    let cached = CachedUrlEntry::from_json(&payload).unwrap();
    assert_eq!(cached.long_url, "https://example.com/after");
}

#[tokio::test]
async fn test_update_foreign_entry_forbidden() {
    let svc = common::create_test_service();
    let entry = svc
        .urls
        .create_short_url(
            "https://example.com/owned".to_string(),
            None,
            None,
            Some(1),
        )
        .await
        .unwrap();

    let err = svc
        .urls
        .update_target_url(&entry.alias, "https://evil.example.com".to_string(), Some(2))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "forbidden");

    // The entry is untouched.
    let stored = svc.store.find_by_alias(&entry.alias).await.unwrap().unwrap();
    assert_eq!(stored.target_url, "https://example.com/owned");
}

#[tokio::test]
async fn test_delete_archives_and_purges_cache() {
    let svc = common::create_test_service();
    let entry = svc
        .urls
        .create_short_url("https://example.com/gone".to_string(), None, None, None)
        .await
        .unwrap();

    let removed = svc.urls.delete_by_alias(&entry.alias, None).await.unwrap();
    assert_eq!(removed.target_url, "https://example.com/gone");

    assert!(svc.store.find_by_alias(&entry.alias).await.unwrap().is_none());
    assert!(svc.cache.get(&entry.alias).await.unwrap().is_none());

    let tombstone = svc
        .store
        .find_archived(&entry.alias)
        .await
        .unwrap()
        .expect("deletion must leave a tombstone");
    assert_eq!(tombstone.target_url, "https://example.com/gone");

    // A second delete finds nothing.
    let err = svc.urls.delete_by_alias(&entry.alias, None).await.unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[tokio::test]
async fn test_stats_reflect_processed_visits() {
    let mut svc = common::create_test_service();
    let entry = svc
        .urls
        .create_short_url("https://example.com/stats".to_string(), None, None, None)
        .await
        .unwrap();

    svc.urls.resolve(&entry.alias).await.unwrap();

    // Stats read the store, so they move only once the worker applies the
    // event, not at enqueue time.
    let before = svc.urls.get_stats(&entry.alias).await.unwrap();
    assert_eq!(before.times_visited, 0);

    let event = svc.visit_rx.try_recv().unwrap();
    apply_visit(
        svc.store.as_ref(),
        svc.cache.as_ref(),
        common::TEST_CACHE_TTL,
        &event,
    )
    .await;

    let after = svc.urls.get_stats(&entry.alias).await.unwrap();
    assert_eq!(after.times_visited, 1);
    assert!(after.last_visited.is_some());
}

#[tokio::test]
async fn test_find_by_target_url_normalizes_input() {
    let svc = common::create_test_service();
    svc.urls
        .create_short_url("https://Example.com/Path#section".to_string(), None, None, None)
        .await
        .unwrap();

    let found = svc
        .urls
        .find_by_target_url("https://example.com/Path")
        .await
        .unwrap();
    assert_eq!(found.target_url, "https://example.com/Path");

    let err = svc
        .urls
        .find_by_target_url("https://example.com/other")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
}

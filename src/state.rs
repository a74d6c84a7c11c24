//! Application wiring and runtime lifecycle.
//!
//! Builds the cache backend, the visit worker, the services and the
//! background sweeper from a loaded [`Config`], and tears them down in the
//! right order on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::services::{RevocationService, UrlService, UrlServiceOptions};
use crate::config::Config;
use crate::domain::repositories::UrlRepository;
use crate::domain::visit_worker::run_visit_worker;
use crate::infrastructure::cache::{CacheService, MemoryCache, RedisCache};
use crate::sweeper::{Sweeper, SweeperHandle};

/// Owns the wired services and the background tasks behind them.
///
/// `urls` and `revocations` are shared handles; clone the `Arc`s freely.
/// `sweeper` runs on-demand cycles via [`Sweeper::sweep_once`] next to the
/// background loop. The state itself is the single owner of the visit
/// worker and the background sweeper task, so dropping it without calling
/// [`AppState::shutdown`] stops the sweeper but abandons queued visit
/// events.
pub struct AppState<S: UrlRepository + 'static> {
    pub urls: Arc<UrlService<S>>,
    pub revocations: Arc<RevocationService>,
    pub sweeper: Sweeper<S>,
    sweeper_handle: SweeperHandle,
    visit_worker: JoinHandle<()>,
}

impl<S: UrlRepository + 'static> AppState<S> {
    /// Builds the full runtime over the given store.
    ///
    /// Connects to Redis when configured, falling back to the in-process
    /// cache if the connection fails; a cache problem must not keep the
    /// service from starting.
    ///
    /// # Errors
    ///
    /// Currently infallible in practice; kept fallible so future backends
    /// that must refuse to start have somewhere to fail.
    pub async fn build(store: Arc<S>, config: &Config) -> Result<Self> {
        let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
            match RedisCache::connect(redis_url).await {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to connect to Redis: {}. Using in-process cache.",
                        e
                    );
                    Arc::new(MemoryCache::new())
                }
            }
        } else {
            tracing::info!("Cache enabled (in-process)");
            Arc::new(MemoryCache::new())
        };

        Ok(Self::build_with_cache(store, cache, config))
    }

    /// Builds the runtime over an already-constructed cache backend.
    ///
    /// This is the seam tests use to inject a specific cache.
    pub fn build_with_cache(
        store: Arc<S>,
        cache: Arc<dyn CacheService>,
        config: &Config,
    ) -> Self {
        let (visit_tx, visit_rx) = mpsc::channel(config.visit_queue_capacity);
        let cache_ttl = config.cache_ttl();

        let visit_worker = tokio::spawn(run_visit_worker(
            visit_rx,
            Arc::clone(&store),
            Arc::clone(&cache),
            cache_ttl,
        ));
        tracing::info!("Visit worker started");

        let urls = Arc::new(UrlService::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            visit_tx,
            UrlServiceOptions {
                cache_ttl,
                anonymous_expiry_days: config.anon_expiry_days,
            },
        ));

        let revocations = Arc::new(RevocationService::new(
            Arc::clone(&cache),
            config.revocation_fail_closed,
        ));

        let sweeper = Sweeper::new(store, cache, config.sweeper_config());
        let sweeper_handle = sweeper.clone().start();

        Self {
            urls,
            revocations,
            sweeper,
            sweeper_handle,
            visit_worker,
        }
    }

    /// Stops background work and drains queued visit events.
    ///
    /// Order matters: the sweeper stops first so no cycle races the
    /// teardown, then the services are dropped. Dropping the last
    /// [`UrlService`] handle closes the visit channel, which lets the
    /// worker finish the events already queued and exit. Callers still
    /// holding a clone of `urls` keep the channel open; after five
    /// seconds the worker is abandoned either way.
    pub async fn shutdown(self) {
        let Self {
            urls,
            revocations,
            sweeper,
            sweeper_handle,
            visit_worker,
        } = self;

        sweeper_handle.stop();
        drop(sweeper_handle);
        drop(sweeper);
        drop(revocations);
        drop(urls);

        match tokio::time::timeout(Duration::from_secs(5), visit_worker).await {
            Ok(Ok(())) => tracing::info!("Visit worker drained"),
            Ok(Err(e)) => tracing::warn!("Visit worker task failed: {}", e),
            Err(_) => tracing::warn!("Visit worker did not drain within 5s, abandoning"),
        }
    }
}

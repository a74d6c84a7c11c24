//! Background worker draining the visit-event queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::repositories::UrlRepository;
use crate::domain::visit_event::VisitEvent;
use crate::infrastructure::cache::{CacheService, CachedUrlEntry};

/// Drains visit events until every sender has been dropped.
///
/// Runs as a single consumer so write-backs for one alias are applied in
/// arrival order. The resolution path never waits on this loop.
pub async fn run_visit_worker<S>(
    mut rx: mpsc::Receiver<VisitEvent>,
    store: Arc<S>,
    cache: Arc<dyn CacheService>,
    cache_ttl: Duration,
) where
    S: UrlRepository,
{
    while let Some(ev) = rx.recv().await {
        apply_visit(store.as_ref(), cache.as_ref(), cache_ttl, &ev).await;
    }
    debug!("visit worker stopped: all senders dropped");
}

/// Applies a single visit: read the entry, bump its stats, write it back,
/// refresh the cached copy.
///
/// Every failure is logged and absorbed. Usage tracking is best effort and
/// must never surface an error to the resolution path that produced the
/// event. Exposed on its own for direct invocation and tests.
pub async fn apply_visit<S>(
    store: &S,
    cache: &dyn CacheService,
    cache_ttl: Duration,
    ev: &VisitEvent,
) where
    S: UrlRepository + ?Sized,
{
    let mut entry = match store.find_by_alias(&ev.alias).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            debug!(alias = %ev.alias, "dropping visit for alias no longer present");
            return;
        }
        Err(e) => {
            warn!(alias = %ev.alias, "visit lookup failed: {e}");
            return;
        }
    };

    entry.record_visit(ev.visited_at);

    let updated = match store.update(&entry).await {
        Ok(entry) => entry,
        Err(e) => {
            warn!(alias = %ev.alias, "visit write-back failed: {e}");
            return;
        }
    };

    // Keep the cached copy aligned with the durable record so hit-path
    // readers observe fresh stats.
    match CachedUrlEntry::from_entry(&updated).to_json() {
        Ok(payload) => {
            if let Err(e) = cache.set(&updated.alias, &payload, cache_ttl).await {
                warn!(alias = %updated.alias, "cache refresh after visit failed: {e}");
            }
        }
        Err(e) => {
            warn!(alias = %updated.alias, "cache encode after visit failed: {e}");
        }
    }
}

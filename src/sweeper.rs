//! Background expiry sweeper.
//!
//! Expiry in this system is lazy: the resolution path never looks at
//! `expires_at`, so an expired entry keeps resolving until something removes
//! it. This module is that something. A sweep cycle scans the durable store
//! and removes two kinds of entries:
//!
//! 1. Entries whose explicit `expires_at` has passed
//! 2. Entries unused for longer than the requested idle window
//!
//! Each removed entry leaves an archive tombstone and has its cached copy
//! purged, so history queries keep working and readers cannot outlive the
//! deletion by more than one cache TTL.
//!
//! ## Shutdown
//!
//! The background loop listens on a watch channel and only acts on it
//! between cycles: a cycle that has started runs to completion, a stop
//! signal received while sleeping cancels before the next cycle begins.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use crate::domain::entities::{ArchivedUrlEntry, UrlEntry};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Interval between background sweep cycles.
    pub interval: Duration,

    /// Idle window the background loop sweeps with: entries with no
    /// activity for this many days are removed.
    pub retention_days: u32,

    /// Budget for removing a single entry; an entry that exceeds it is
    /// skipped until the next cycle so one wedged backend call cannot stall
    /// the whole sweep.
    pub op_timeout: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            retention_days: 30,
            op_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of one sweep cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Aliases removed this cycle, expired entries first, then idle ones.
    pub swept: Vec<String>,

    /// Entries that could not be removed; they stay put and are picked up
    /// again by the next cycle that finds them.
    pub failed: usize,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.swept.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum SweepReason {
    Expired,
    Unused,
}

impl SweepReason {
    fn label(self) -> &'static str {
        match self {
            SweepReason::Expired => "expired",
            SweepReason::Unused => "unused",
        }
    }
}

/// Periodic cleanup of expired and abandoned entries.
///
/// [`Sweeper::start`] spawns the background loop; [`Sweeper::sweep_once`]
/// runs a single cycle directly with a caller-chosen idle window, which is
/// what one-shot maintenance commands use.
pub struct Sweeper<S: UrlRepository> {
    store: Arc<S>,
    cache: Arc<dyn CacheService>,
    config: SweeperConfig,
}

impl<S: UrlRepository> Clone for Sweeper<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
        }
    }
}

impl<S: UrlRepository + 'static> Sweeper<S> {
    /// Creates a sweeper over the given store and cache.
    pub fn new(store: Arc<S>, cache: Arc<dyn CacheService>, config: SweeperConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// Starts the sweeper as a background task.
    ///
    /// The first cycle runs one full interval after start. Returns a handle
    /// that stops the sweeper when asked to, or when dropped.
    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweeper_loop(self, shutdown_rx));

        info!("Background expiry sweeper started");

        SweeperHandle { shutdown_tx }
    }

    /// Runs a single sweep cycle and reports the aliases it removed.
    ///
    /// Removes every entry whose `expires_at` has passed, then every entry
    /// with no activity for `unused_days` days. A cycle is idempotent:
    /// entries removed by a previous cycle (or by a concurrent sweeper) are
    /// simply not found again and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store cannot even be listed; failures
    /// on individual entries are counted in [`SweepReport::failed`] and do
    /// not abort the cycle.
    pub async fn sweep_once(&self, unused_days: u32) -> Result<SweepReport, AppError> {
        let now = Utc::now();
        let mut report = SweepReport::default();

        let expired = self.store.list_expired(now).await?;
        for entry in &expired {
            self.sweep_entry(entry, SweepReason::Expired, &mut report)
                .await;
        }

        let cutoff = now - chrono::Duration::days(unused_days as i64);
        let unused = self.store.list_unused_since(cutoff).await?;
        for entry in &unused {
            self.sweep_entry(entry, SweepReason::Unused, &mut report)
                .await;
        }

        Ok(report)
    }

    async fn sweep_entry(&self, entry: &UrlEntry, reason: SweepReason, report: &mut SweepReport) {
        match tokio::time::timeout(self.config.op_timeout, self.remove_entry(entry)).await {
            Ok(Ok(true)) => {
                debug!("Swept {} entry {}", reason.label(), entry.alias);
                report.swept.push(entry.alias.clone());
            }
            Ok(Ok(false)) => {
                // Already gone, nothing to report.
            }
            Ok(Err(e)) => {
                report.failed += 1;
                warn!("Failed to sweep {}: {}", entry.alias, e);
            }
            Err(_) => {
                report.failed += 1;
                warn!(
                    "Sweep of {} exceeded {:?}, skipping until next cycle",
                    entry.alias, self.config.op_timeout
                );
            }
        }
    }

    /// Removes one entry: store delete, archive tombstone, cache purge.
    ///
    /// The cache purge is best effort; a leftover cached copy ages out with
    /// its TTL.
    async fn remove_entry(&self, entry: &UrlEntry) -> Result<bool, AppError> {
        let Some(removed) = self.store.delete(&entry.alias).await? else {
            return Ok(false);
        };

        self.store
            .archive(ArchivedUrlEntry::from_entry(removed, Utc::now()))
            .await?;

        if let Err(e) = self.cache.delete(&entry.alias).await {
            warn!("Failed to purge cache for {}: {}", entry.alias, e);
        }

        Ok(true)
    }
}

/// A handle to the running sweeper task.
///
/// Stopping is edge-triggered and permanent; a handle cannot restart the
/// loop. Dropping the handle stops the sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl SweeperHandle {
    /// Stops the sweeper before its next cycle.
    ///
    /// Called automatically when the handle is dropped.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        info!("Background expiry sweeper stopped");
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
async fn sweeper_loop<S: UrlRepository + 'static>(
    sweeper: Sweeper<S>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        // Wait for the interval or shutdown signal
        tokio::select! {
            _ = tokio::time::sleep(sweeper.config.interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        match sweeper.sweep_once(sweeper.config.retention_days).await {
            Ok(report) if report.removed() > 0 || report.failed > 0 => {
                info!(
                    removed = report.removed(),
                    failed = report.failed,
                    "Sweep cycle finished"
                );
            }
            Ok(_) => {
                trace!("Sweep cycle found nothing to remove");
            }
            Err(e) => {
                error!("Sweep cycle aborted: {}", e);
            }
        }
    }
}

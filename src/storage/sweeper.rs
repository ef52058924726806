//! Background Sweeper
//!
//! Lazy expiry keeps reads accurate but never frees memory: a record that
//! expires and is never read again would stay in the store forever. The
//! sweeper closes that gap by periodically reclaiming expired records.
//!
//! ## Design
//!
//! The sweeper runs as a Tokio task and alternates between two states:
//! sleeping out its interval and sweeping. Each sweep is two passes over
//! the store:
//!
//! 1. **Collect**: walk the expiry index in ascending creation order and
//!    gather the identities of expired records. By default the walk stops
//!    at the first record that is still live: every later entry was
//!    created more recently, so under a uniform TTL nothing behind it can
//!    be expired yet.
//! 2. **Delete**: remove each collected identity, conditioned on its
//!    `created` timestamp being unchanged, so a record that was refreshed
//!    between the passes survives.
//!
//! Both passes yield control back to the scheduler every
//! [`yield_every`](SweepConfig::yield_every) records, so a large backlog
//! never monopolizes the runtime.
//!
//! ## The early stop and `full_scan`
//!
//! Creation order is not expiry order once TTLs vary: a record created
//! later with a much shorter TTL expires before an earlier long-TTL one,
//! and the default early stop can leave it unswept until an earlier record
//! also expires. Reads mask such records in the meantime (they report
//! absent), but the memory is not reclaimed. [`SweepConfig::full_scan`]
//! trades a complete walk of the index for complete reclamation; the
//! default keeps the cheap early stop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::storage::engine::ExpiryEngine;
use crate::storage::store::{RecordStore, StoreError};

/// Configuration for the background sweeper.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between sweep passes (default: 60s).
    pub interval: Duration,

    /// Yield to the scheduler after this many processed records in each
    /// pass (default: 100).
    pub yield_every: usize,

    /// Walk the whole index instead of stopping at the first live record
    /// (default: false). See the module docs for the trade-off.
    pub full_scan: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            yield_every: 100,
            full_scan: false,
        }
    }
}

/// What a single sweep pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Index entries examined during collection.
    pub scanned: usize,
    /// Records physically removed.
    pub reclaimed: usize,
    /// Scheduler yields during the collection pass.
    pub scan_yields: usize,
    /// Scheduler yields during the deletion pass.
    pub delete_yields: usize,
}

/// Runs one sweep over the store and returns what it did.
///
/// This is the unit of work the background task repeats; it is public so
/// embedders (and tests) can drive a pass on their own schedule. A single
/// clock reading at the start of the pass judges every record, so the pass
/// is internally consistent.
pub async fn sweep_once<S: RecordStore>(
    engine: &ExpiryEngine<S>,
    config: &SweepConfig,
) -> Result<SweepReport, StoreError> {
    let now = engine.clock_now();
    let mut report = SweepReport::default();

    // Pass one: collect expired identities in creation order.
    let mut expired = Vec::new();
    for meta in engine.store().scan_expiry_order()? {
        report.scanned += 1;
        if meta.is_expired(now) {
            expired.push(meta);
        } else if !config.full_scan {
            break;
        }
        if config.yield_every > 0 && report.scanned % config.yield_every == 0 {
            tokio::task::yield_now().await;
            report.scan_yields += 1;
        }
    }

    // Pass two: delete, sparing records refreshed since collection.
    for (processed, meta) in expired.iter().enumerate() {
        if engine.store().delete_if_created(&meta.key, meta.created)? {
            report.reclaimed += 1;
        }
        if config.yield_every > 0 && (processed + 1) % config.yield_every == 0 {
            tokio::task::yield_now().await;
            report.delete_yields += 1;
        }
    }

    Ok(report)
}

/// Handle to the running background sweeper.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
}

impl Sweeper {
    /// Starts the sweeper as a background task over the given engine.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use emberkv::storage::{ExpiryEngine, SweepConfig, Sweeper};
    /// use std::sync::Arc;
    ///
    /// let engine = Arc::new(ExpiryEngine::new());
    /// let sweeper = Sweeper::start(Arc::clone(&engine), SweepConfig::default());
    ///
    /// // Sweeper reclaims expired records in the background...
    ///
    /// drop(sweeper); // stops the task
    /// ```
    pub fn start<S>(engine: Arc<ExpiryEngine<S>>, config: SweepConfig) -> Self
    where
        S: RecordStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweep_loop(engine, config, shutdown_rx));
        debug!("background sweeper started");

        Self { shutdown_tx }
    }

    /// Stops the sweeper. Called automatically when the handle is dropped.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        debug!("background sweeper stopped");
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop: sleep out the interval, sweep, repeat.
async fn sweep_loop<S: RecordStore>(
    engine: Arc<ExpiryEngine<S>>,
    config: SweepConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("sweeper received shutdown signal");
                    return;
                }
            }
        }

        match sweep_once(&engine, &config).await {
            Ok(report) if report.reclaimed > 0 => {
                info!(
                    reclaimed = report.reclaimed,
                    scanned = report.scanned,
                    "swept expired records"
                );
            }
            Ok(_) => {}
            // Collaborator fault: abandon this pass, retry next interval.
            Err(e) => warn!(error = %e, "sweep pass failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::store::MemoryStore;
    use serde_json::json;
    use tokio_test::assert_ok;

    fn manual_engine() -> (Arc<ManualClock>, Arc<ExpiryEngine<MemoryStore>>) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("emberkv=debug")
            .try_init();
        let clock = Arc::new(ManualClock::new());
        let engine = Arc::new(ExpiryEngine::with_parts(MemoryStore::new(), clock.clone()));
        (clock, engine)
    }

    #[tokio::test]
    async fn test_sweep_reclaims_expired_records() {
        let (clock, engine) = manual_engine();

        for i in 0..10 {
            engine.add("otp", i, json!(true), 5.0).unwrap();
        }
        clock.advance(6.0);

        let report = sweep_once(&engine, &SweepConfig::default()).await.unwrap();
        assert_eq!(report.scanned, 10);
        assert_eq!(report.reclaimed, 10);
        assert_eq!(engine.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_keeps_live_records() {
        let (clock, engine) = manual_engine();

        // Same TTL for everything: creation order is expiry order, so the
        // early stop reclaims exactly the elapsed prefix.
        engine.add("g", "old", json!(true), 5.0).unwrap();
        clock.advance(4.0);
        engine.add("g", "new", json!(true), 5.0).unwrap();
        clock.advance(2.0);

        let report = sweep_once(&engine, &SweepConfig::default()).await.unwrap();
        assert_eq!(report.reclaimed, 1);
        assert_eq!(engine.len().unwrap(), 1);
        assert!(engine.exists("g", "new").unwrap());

        let stats = engine.get_stats().unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.active, 1);
    }

    #[tokio::test]
    async fn test_sweep_is_empty_on_empty_store() {
        let (_clock, engine) = manual_engine();

        let report = assert_ok!(sweep_once(&engine, &SweepConfig::default()).await);
        assert_eq!(report, SweepReport::default());
    }

    #[tokio::test]
    async fn test_yield_cadence_in_both_passes() {
        let (clock, engine) = manual_engine();

        for i in 0..250 {
            engine.add("bulk", i, json!(true), 1.0).unwrap();
        }
        clock.advance(2.0);

        let config = SweepConfig {
            yield_every: 100,
            ..Default::default()
        };
        let report = sweep_once(&engine, &config).await.unwrap();

        assert_eq!(report.scanned, 250);
        assert_eq!(report.reclaimed, 250);
        // 250 records at a cadence of 100 crosses the threshold twice in
        // each pass.
        assert!(report.scan_yields >= 2, "collection yielded {} times", report.scan_yields);
        assert!(report.delete_yields >= 2, "deletion yielded {} times", report.delete_yields);
    }

    #[tokio::test]
    async fn test_early_stop_leaves_newer_expired_record() {
        let (clock, engine) = manual_engine();

        // A long-lived record created first, then a short-lived one that
        // expires before it.
        engine.add("g", "a", json!(true), 1000.0).unwrap();
        clock.advance(1.0);
        engine.add("g", "b", json!(true), 1.0).unwrap();
        clock.set(5.0);

        // The scan stops at "a" (still live), so the already-expired "b"
        // behind it is not reclaimed.
        let report = sweep_once(&engine, &SweepConfig::default()).await.unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.reclaimed, 0);
        assert_eq!(engine.len().unwrap(), 2);

        // Reads still mask it.
        assert!(!engine.exists("g", "b").unwrap());
        let stats = engine.get_stats().unwrap();
        assert_eq!(stats.expired, 1);
    }

    #[tokio::test]
    async fn test_full_scan_reclaims_newer_expired_record() {
        let (clock, engine) = manual_engine();

        engine.add("g", "a", json!(true), 1000.0).unwrap();
        clock.advance(1.0);
        engine.add("g", "b", json!(true), 1.0).unwrap();
        clock.set(5.0);

        let config = SweepConfig {
            full_scan: true,
            ..Default::default()
        };
        let report = sweep_once(&engine, &config).await.unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.reclaimed, 1);
        assert!(engine.exists("g", "a").unwrap());
        assert_eq!(engine.time_left("g", "b").unwrap(), None);
    }

    #[tokio::test]
    async fn test_sweep_spares_record_refreshed_after_collection() {
        let (clock, engine) = manual_engine();

        engine.add("g", "k", json!("old"), 5.0).unwrap();
        clock.advance(6.0);

        // Simulate a refresh racing the deletion pass: the identity was
        // collected with the old `created`, then re-added.
        let metas = engine.store().scan_expiry_order().unwrap();
        assert!(engine.add("g", "k", json!("new"), 5.0).unwrap());

        let deleted = engine
            .store()
            .delete_if_created(&metas[0].key, metas[0].created)
            .unwrap();
        assert!(!deleted);
        assert_eq!(engine.get("g", "k").unwrap(), Some(json!("new")));
    }

    #[tokio::test]
    async fn test_sweeper_loop_reclaims_in_background() {
        let engine = Arc::new(ExpiryEngine::new());

        for i in 0..10 {
            engine.add("session", i, json!(true), 0.05).unwrap();
        }
        assert_eq!(engine.len().unwrap(), 10);

        let config = SweepConfig {
            interval: Duration::from_millis(20),
            ..Default::default()
        };
        let _sweeper = Sweeper::start(Arc::clone(&engine), config);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(engine.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_drop() {
        let engine = Arc::new(ExpiryEngine::new());

        {
            let _sweeper = Sweeper::start(
                Arc::clone(&engine),
                SweepConfig {
                    interval: Duration::from_millis(10),
                    ..Default::default()
                },
            );
            tokio::time::sleep(Duration::from_millis(50)).await;
            // Sweeper is dropped here.
        }

        // Give the task time to observe the shutdown before adding.
        tokio::time::sleep(Duration::from_millis(50)).await;

        engine.add("g", "k", json!(true), 0.01).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // No sweeper left: the expired record stays physically present,
        // but reads already treat it as absent.
        assert_eq!(engine.len().unwrap(), 1);
        assert_eq!(engine.get("g", "k").unwrap(), None);
    }
}

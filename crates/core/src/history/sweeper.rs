//! Background expiry sweep task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::metrics;

use super::ledger::HistoryLedger;

/// Runs `HistoryLedger::sweep` on a fixed interval for the life of the
/// process. One sweep per tick, no retries: whatever a cycle misses is
/// picked up by the next one (except entries already dropped — see
/// `SweepStats::delete_failures`).
pub struct HistorySweeper {
    ledger: Arc<HistoryLedger>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HistorySweeper {
    pub fn new(ledger: Arc<HistoryLedger>, interval: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            ledger,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Spawn the sweep loop. The first tick fires immediately, which
    /// reconciles disk against the ledger right after a restart.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("History sweeper already running");
            return;
        }

        info!(
            interval_secs = self.interval.as_secs(),
            "Starting history sweeper"
        );

        let ledger = Arc::clone(&self.ledger);
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let interval = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !running.load(Ordering::SeqCst) {
                            break;
                        }
                        let stats = ledger.sweep().await;
                        metrics::TRACKS_EXPIRED.inc_by(stats.expired as u64);
                        if stats.expired > 0 {
                            info!(
                                expired = stats.expired,
                                kept = stats.kept,
                                delete_failures = stats.delete_failures,
                                "Expired tracks swept"
                            );
                        } else {
                            debug!(kept = stats.kept, "Sweep found nothing to expire");
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }

            debug!("History sweeper stopped");
        });
    }

    /// Stop the sweep loop.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(());
    }
}

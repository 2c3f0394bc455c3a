//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::StoreInner;

/// Spawns the reaper for one store.
///
/// Every `interval` the task runs a full sweep of the store's expiry records.
/// It stops when `true` is sent on `shutdown_rx` or when the sender is dropped.
/// The signal is only looked at between sweeps, so a sweep in progress always
/// completes and releases the store lock before the task exits.
///
/// # Arguments
/// * `inner` - State shared with the owning `CacheStore`
/// * `interval` - Time between sweeps; the first sweep happens one interval after start
/// * `shutdown_rx` - Stop signal owned by the `CacheStore`
pub(crate) fn spawn_cleanup_task(
    inner: Arc<StoreInner>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting TTL cleanup task"
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = inner.purge_expired();
                    if removed > 0 {
                        info!("TTL cleanup: removed {} expired entries", removed);
                    } else {
                        debug!("TTL cleanup: no expired entries found");
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("TTL cleanup task stopped");
    })
}

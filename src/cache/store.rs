//! Cache Store Module
//!
//! Main cache engine: a value map and an expiry map behind a single
//! reader/writer lock, plus the lifecycle of the background reaper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::TimeDelta;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::expiry;
use crate::cache::stats::{CacheStats, StatsCounters};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_cleanup_task;

// == Entries ==
/// Both maps live in one struct so a single lock guards them as a unit.
/// A key in `expiry` is always also in `values`.
#[derive(Debug, Default)]
struct Entries {
    values: HashMap<Bytes, Bytes>,
    expiry: HashMap<Bytes, Instant>,
}

impl Entries {
    fn is_expired(&self, key: &[u8], now: Instant) -> bool {
        self.expiry
            .get(key)
            .is_some_and(|deadline| expiry::is_expired(*deadline, now))
    }

    /// Returns the value only if it has not expired, whether or not a sweep has run yet.
    fn live_value(&self, key: &[u8], now: Instant) -> Option<&Bytes> {
        self.values
            .get(key)
            .filter(|_| !self.is_expired(key, now))
    }
}

// == Store Inner ==
/// State shared between the store handle and the reaper task.
#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    entries: RwLock<Entries>,
    stats: StatsCounters,
}

impl StoreInner {
    // == Purge Expired ==
    /// Removes every entry whose deadline has passed and returns how many went.
    ///
    /// Takes the write lock only when some key carries a TTL, and releases it as
    /// soon as the scan is done. The scan is linear in the number of TTL keys.
    pub(crate) fn purge_expired(&self) -> usize {
        if self.entries.read().expiry.is_empty() {
            return 0;
        }

        let now = Instant::now();
        let removed = {
            let mut guard = self.entries.write();
            let Entries {
                values,
                expiry: deadlines,
            } = &mut *guard;
            let before = deadlines.len();
            deadlines.retain(|key, deadline| {
                if expiry::is_expired(*deadline, now) {
                    values.remove(key);
                    false
                } else {
                    true
                }
            });
            before - deadlines.len()
        };

        self.stats.record_expired(removed);
        removed
    }
}

// == Reaper Handle ==
#[derive(Debug)]
struct Reaper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

// == Cache Store ==
/// Thread-safe byte-keyed cache with per-entry TTL.
///
/// Readers (`get`, `has`, `ttl`) share the lock; writers (`set`, `delete`, and the
/// reaper's sweep) hold it exclusively for their critical section only. Expired
/// entries are invisible to readers immediately, and are physically removed by
/// the reaper started with [`CacheStore::start_cleanup`].
///
/// Dropping the store drops the reaper's shutdown sender, which ends the reaper.
#[derive(Debug)]
pub struct CacheStore {
    inner: Arc<StoreInner>,
    reaper: Mutex<Option<Reaper>>,
    cleanup_interval: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store whose reaper will sweep every `cleanup_interval`.
    ///
    /// The reaper is not started until [`CacheStore::start_cleanup`] is called.
    pub fn new(cleanup_interval: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner::default()),
            reaper: Mutex::new(None),
            cleanup_interval,
        }
    }

    // == Set ==
    /// Inserts or overwrites `key`.
    ///
    /// # TTL Semantics
    /// - negative: rejected with `InvalidArgument`, nothing is modified
    /// - zero: no expiry; any previous expiry record for the key is cleared
    /// - positive: expires at `now + ttl`, replacing any previous deadline
    pub fn set(&self, key: impl Into<Bytes>, value: impl Into<Bytes>, ttl: TimeDelta) -> Result<()> {
        let key = key.into();
        let deadline = expiry::expires_at(ttl, Instant::now())?;

        {
            let mut entries = self.inner.entries.write();
            match deadline {
                Some(at) => entries.expiry.insert(key.clone(), at),
                None => entries.expiry.remove(&key),
            };
            entries.values.insert(key.clone(), value.into());
        }

        debug!(
            key = %String::from_utf8_lossy(&key),
            ttl_ms = ttl.num_milliseconds(),
            "Key set"
        );
        Ok(())
    }

    // == Get ==
    /// Returns the value for `key`, or `NotFound` if it is absent or expired.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<Bytes> {
        let key = key.as_ref();
        let now = Instant::now();
        let found = self.inner.entries.read().live_value(key, now).cloned();

        match found {
            Some(value) => {
                self.inner.stats.record_hit();
                Ok(value)
            }
            None => {
                self.inner.stats.record_miss();
                Err(CacheError::not_found(key))
            }
        }
    }

    // == Has ==
    /// Returns true if `key` is present and not expired.
    pub fn has(&self, key: impl AsRef<[u8]>) -> bool {
        let now = Instant::now();
        self.inner
            .entries
            .read()
            .live_value(key.as_ref(), now)
            .is_some()
    }

    // == TTL ==
    /// Returns the remaining lifetime of a live key; `None` means it never expires.
    pub fn ttl(&self, key: impl AsRef<[u8]>) -> Result<Option<Duration>> {
        let key = key.as_ref();
        let now = Instant::now();
        let entries = self.inner.entries.read();

        if entries.live_value(key, now).is_none() {
            return Err(CacheError::not_found(key));
        }

        Ok(entries
            .expiry
            .get(key)
            .map(|deadline| expiry::remaining(*deadline, now)))
    }

    // == Delete ==
    /// Removes `key` and its expiry record.
    ///
    /// Returns `NotFound` if the key is not held. An expired key the reaper has
    /// not reached yet is still held, so deleting it succeeds.
    pub fn delete(&self, key: impl AsRef<[u8]>) -> Result<()> {
        let key = key.as_ref();
        let removed = {
            let mut entries = self.inner.entries.write();
            entries.expiry.remove(key);
            entries.values.remove(key).is_some()
        };

        if removed {
            debug!(key = %String::from_utf8_lossy(key), "Key deleted");
            Ok(())
        } else {
            Err(CacheError::not_found(key))
        }
    }

    // == Purge Expired ==
    /// Runs one sweep synchronously. Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.inner.purge_expired()
    }

    // == Start Cleanup ==
    /// Starts the background reaper on the current Tokio runtime.
    ///
    /// Returns `Ok(false)` without scheduling anything if a reaper is already
    /// running. A reaper that was stopped may be started again.
    ///
    /// # Errors
    /// `InvalidArgument` when the sweep interval is zero, `Internal` when called
    /// outside a Tokio runtime.
    pub fn start_cleanup(&self) -> Result<bool> {
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidArgument(
                "cleanup interval must be greater than zero".to_string(),
            ));
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CacheError::Internal(
                "start_cleanup requires a Tokio runtime".to_string(),
            ));
        }

        let mut slot = self.reaper.lock();
        if slot.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            warn!("Cleanup already running, ignoring start request");
            return Ok(false);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_cleanup_task(
            Arc::clone(&self.inner),
            self.cleanup_interval,
            shutdown_rx,
        );
        *slot = Some(Reaper {
            shutdown_tx,
            handle,
        });

        info!(interval_ms = self.cleanup_interval.as_millis() as u64, "Cleanup started");
        Ok(true)
    }

    // == Stop Cleanup ==
    /// Signals the reaper to stop after its current sweep.
    ///
    /// Returns the reaper's join handle so the caller can wait for it, or `None`
    /// if no reaper was started.
    pub fn stop_cleanup(&self) -> Option<JoinHandle<()>> {
        let Some(reaper) = self.reaper.lock().take() else {
            warn!("Cleanup is not running, ignoring stop request");
            return None;
        };

        info!("Stopping cleanup");
        // Fails only if the reaper already exited.
        let _ = reaper.shutdown_tx.send(true);
        Some(reaper.handle)
    }

    /// Returns true while a started reaper has not yet exited.
    pub fn is_cleanup_running(&self) -> bool {
        self.reaper
            .lock()
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Returns the configured sweep interval.
    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (total, with_ttl) = {
            let entries = self.inner.entries.read();
            (entries.values.len(), entries.expiry.len())
        };
        self.inner.stats.snapshot(total, with_ttl)
    }

    // == Length ==
    /// Returns the number of entries physically held, expired or not.
    pub fn len(&self) -> usize {
        self.inner.entries.read().values.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().values.is_empty()
    }
}

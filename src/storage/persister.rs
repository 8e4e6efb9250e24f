//! Background Snapshot Persister
//!
//! This module implements the task that keeps the snapshot file in step with
//! the in-memory store.
//!
//! ## Design
//!
//! The persister runs as a Tokio task and, once per interval (default: 1s):
//! 1. Reads and parses the snapshot file (missing file = empty mapping)
//! 2. Compares it with the live store under the store lock
//! 3. If they differ, takes a copy of the store under the same lock and
//!    overwrites the file with it, outside the lock
//!
//! Polling bounds the window of lost writes to one interval. Compare-then-write
//! is not atomic with respect to later mutations; a write that lands after the
//! copy is picked up by the next tick.
//!
//! ## Failure Handling
//!
//! A snapshot file that exists but cannot be read or parsed ends the task with
//! an error. Carrying on would mean comparing against garbage and overwriting
//! whatever is on disk, so the owner is expected to stop the process. A failed
//! write is logged and retried on the next tick.

use crate::storage::snapshot::{self, SnapshotError};
use crate::storage::Store;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Default snapshot file name.
pub const DEFAULT_SNAPSHOT_PATH: &str = "durin.db";

/// Default interval between two snapshot checks.
pub const DEFAULT_PERSIST_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the persister.
#[derive(Debug, Clone)]
pub struct PersisterConfig {
    /// Snapshot file to keep up to date
    pub path: PathBuf,

    /// Interval between checks (default: 1s)
    pub interval: Duration,
}

impl PersisterConfig {
    /// Creates a configuration for `path` with the default interval.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            interval: DEFAULT_PERSIST_INTERVAL,
        }
    }

    /// Sets the interval between checks.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for PersisterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_PATH)
    }
}

/// Counters updated by the persister task.
#[derive(Debug, Default)]
pub struct PersisterStats {
    /// Completed checks
    pub ticks: AtomicU64,
    /// Checks that rewrote the file
    pub writes: AtomicU64,
}

impl PersisterStats {
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

/// A handle to the running persister.
///
/// When this handle is dropped, the persister task will be stopped.
#[derive(Debug)]
pub struct Persister {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,

    /// The background task, until its outcome has been collected
    task: Option<JoinHandle<Result<(), SnapshotError>>>,

    stats: Arc<PersisterStats>,
}

impl Persister {
    /// Starts the persister as a background task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use durin::storage::{Persister, PersisterConfig, Store};
    /// use std::sync::Arc;
    ///
    /// let store = Arc::new(Store::new());
    /// let persister = Persister::start(store, PersisterConfig::new("durin.db"));
    ///
    /// // Persister runs in the background...
    ///
    /// // Dropping the persister will stop it
    /// drop(persister);
    /// ```
    pub fn start(store: Arc<Store>, config: PersisterConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(PersisterStats::default());

        info!(
            path = %config.path.display(),
            interval_ms = config.interval.as_millis() as u64,
            "Snapshot persister started"
        );

        let task = tokio::spawn(persist_loop(
            store,
            config,
            Arc::clone(&stats),
            shutdown_rx,
        ));

        Self {
            shutdown_tx,
            task: Some(task),
            stats,
        }
    }

    /// Returns the persister's counters.
    pub fn stats(&self) -> Arc<PersisterStats> {
        Arc::clone(&self.stats)
    }

    /// Stops the persister.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        if self.shutdown_tx.send(true).is_ok() {
            debug!("Snapshot persister stop requested");
        }
    }

    /// Waits for the task to finish and returns its outcome.
    ///
    /// The task only finishes on its own when the snapshot file turns out to
    /// be unreadable or corrupt; otherwise this resolves after [`stop`].
    /// Calling it again after the outcome was collected returns `Ok(())`.
    ///
    /// [`stop`]: Persister::stop
    pub async fn wait(&mut self) -> Result<(), SnapshotError> {
        let Some(task) = self.task.as_mut() else {
            return Ok(());
        };

        let outcome = task.await;
        self.task = None;

        match outcome {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Ok(()),
        }
    }

    /// Stops the persister and waits for a tick in progress to finish.
    ///
    /// Once this returns the task no longer touches the snapshot file, so a
    /// final [`persist_once`] cannot overlap a write of its own.
    pub async fn shutdown(mut self) -> Result<(), SnapshotError> {
        self.stop();
        self.wait().await
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs one check: loads the file, compares, rewrites on change.
///
/// # Returns
///
/// Returns `true` if the file was rewritten.
pub async fn persist_once(store: &Store, path: &Path) -> Result<bool, SnapshotError> {
    let on_disk = snapshot::load(path).await?;

    match store.diff_snapshot(&on_disk) {
        Some(live) => {
            snapshot::write(path, &live).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// The main persister loop.
async fn persist_loop(
    store: Arc<Store>,
    config: PersisterConfig,
    stats: Arc<PersisterStats>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), SnapshotError> {
    loop {
        // Wait for the interval or shutdown signal
        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Snapshot persister received shutdown signal");
                    return Ok(());
                }
            }
        }

        let outcome = persist_once(&store, &config.path).await;
        stats.ticks.fetch_add(1, Ordering::Relaxed);

        match outcome {
            Ok(true) => {
                stats.writes.fetch_add(1, Ordering::Relaxed);
                info!(path = %config.path.display(), "DB saved on disk");
            }
            Ok(false) => trace!("Snapshot unchanged"),
            Err(e @ (SnapshotError::Write { .. } | SnapshotError::Encode(_))) => {
                warn!(error = %e, "Failed to save snapshot, retrying next interval");
            }
            Err(e) => {
                error!(error = %e, "Snapshot file is not trustworthy, stopping persister");
                return Err(e);
            }
        }
    }
}

// src/watch/poller.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::errors::{Result, WadError};
use crate::fs::FileSystem;
use crate::watch::fingerprint::{Fingerprint, Fingerprinter};

/// Remembers the last observed fingerprint and reports transitions.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    baseline: Fingerprint,
}

impl ChangeDetector {
    pub fn new(baseline: Fingerprint) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> Fingerprint {
        self.baseline
    }

    /// Returns `true` exactly once per transition to a different value; the
    /// observed value becomes the new baseline.
    pub fn observe(&mut self, current: Fingerprint) -> bool {
        if current == self.baseline {
            return false;
        }
        debug!(previous = %self.baseline, current = %current, "fingerprint changed");
        self.baseline = current;
        true
    }
}

/// Handle for the polling task. Dropping it stops polling.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
    baseline: Fingerprint,
}

impl PollerHandle {
    /// Fingerprint observed when the poller was spawned.
    pub fn baseline(&self) -> Fingerprint {
        self.baseline
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a task polling the fingerprint of `fingerprinter.root()` every
/// `interval` and sending `RuntimeEvent::Triggered { FileChange }` whenever it
/// differs from the previous observation.
///
/// The baseline is computed before this returns, so a missing watch root is
/// reported to the caller. Later scan failures are logged and skipped.
/// Changes seen while a cycle runs are not queued here; they only move the
/// baseline.
pub async fn spawn_poller(
    fingerprinter: Fingerprinter,
    fs: Arc<dyn FileSystem>,
    interval: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<PollerHandle> {
    let fingerprinter = Arc::new(fingerprinter);
    let baseline = scan(&fingerprinter, &fs).await?;
    info!(root = ?fingerprinter.root(), ?interval, %baseline, "polling watch root");

    let task = tokio::spawn(async move {
        let mut detector = ChangeDetector::new(baseline);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the baseline already covers it.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let current = match scan(&fingerprinter, &fs).await {
                Ok(current) => current,
                Err(err) => {
                    warn!(error = %err, "fingerprint scan failed; keeping previous baseline");
                    continue;
                }
            };

            if !detector.observe(current) {
                continue;
            }

            if runtime_tx
                .send(RuntimeEvent::Triggered {
                    reason: TriggerReason::FileChange,
                })
                .await
                .is_err()
            {
                debug!("runtime channel closed; stopping poller");
                break;
            }
        }
    });

    Ok(PollerHandle { task, baseline })
}

/// Walk the tree on the blocking pool.
async fn scan(fingerprinter: &Arc<Fingerprinter>, fs: &Arc<dyn FileSystem>) -> Result<Fingerprint> {
    let fingerprinter = Arc::clone(fingerprinter);
    let fs = Arc::clone(fs);
    tokio::task::spawn_blocking(move || fingerprinter.compute(fs.as_ref()))
        .await
        .map_err(|join_err| WadError::Other(anyhow!("fingerprint scan task failed: {join_err}")))?
}

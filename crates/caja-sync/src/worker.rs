//! # Background Sync Worker
//!
//! Long-running task that drives the sync engine.
//!
//! ## Trigger Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SyncWorker::run()                                                      │
//! │                                                                         │
//! │    tokio::select! {                                                     │
//! │      signal_rx.recv()   ← a domain operation committed (fire-and-       │
//! │                           forget nudge from the write path)             │
//! │      interval.tick()    ← periodic safety net (poll_interval_secs)      │
//! │      shutdown_rx        ← graceful stop                                 │
//! │    }                                                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │    engine.push()   (coalesces any signals queued up meanwhile)          │
//! │                                                                         │
//! │  bootstrap() runs pull() once at session start, before the worker is    │
//! │  spawned - the only sync call the app ever awaits.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use caja_db::ReplicateSignal;

use crate::config::SyncConfig;
use crate::engine::SyncEngine;

/// Handle for stopping a running [`SyncWorker`].
pub struct WorkerHandle {
    shutdown_tx: oneshot::Sender<()>,
}

impl WorkerHandle {
    /// Requests a graceful shutdown. The worker finishes any in-flight
    /// cycle and exits.
    pub fn shutdown(self) {
        // An already-exited worker has dropped the receiver; nothing to do.
        let _ = self.shutdown_tx.send(());
    }
}

/// Background task driving periodic and signal-triggered sync cycles.
pub struct SyncWorker {
    engine: Arc<SyncEngine>,
    signal_rx: mpsc::UnboundedReceiver<ReplicateSignal>,
    poll_interval: Duration,
    shutdown_rx: oneshot::Receiver<()>,
}

impl SyncWorker {
    /// Creates a worker and its shutdown handle.
    ///
    /// `signal_rx` is the receiving half of the notifier the write path
    /// pings after each committed operation.
    pub fn new(
        engine: Arc<SyncEngine>,
        config: &SyncConfig,
        signal_rx: mpsc::UnboundedReceiver<ReplicateSignal>,
    ) -> (Self, WorkerHandle) {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = SyncWorker {
            engine,
            signal_rx,
            poll_interval: Duration::from_secs(config.sync.poll_interval_secs),
            shutdown_rx,
        };

        (worker, WorkerHandle { shutdown_tx })
    }

    /// Downloads remote state once so the register opens with the freshest
    /// catalog the network allows. Called at session start, before
    /// [`SyncWorker::run`] is spawned.
    pub async fn bootstrap(&self) {
        self.engine.pull().await;
    }

    /// Enters the trigger loop. Intended to be spawned onto the runtime.
    pub async fn run(mut self) {
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "Sync worker starting"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        // A stalled cycle should not cause a burst of catch-up ticks.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The interval fires immediately once, which doubles as the
        // restart-recovery push for anything queued from the last session.

        loop {
            tokio::select! {
                signal = self.signal_rx.recv() => {
                    match signal {
                        Some(_) => {
                            // One cycle serves every signal queued so far.
                            while self.signal_rx.try_recv().is_ok() {}
                            debug!("Sync cycle triggered by write signal");
                            self.engine.push().await;
                        }
                        // All senders dropped; the periodic tick still runs.
                        None => {
                            debug!("Signal channel closed; periodic sync only");
                            self.run_periodic_only(interval).await;
                            return;
                        }
                    }
                }
                _ = interval.tick() => {
                    debug!("Sync cycle triggered by interval");
                    self.engine.push().await;
                }
                _ = &mut self.shutdown_rx => {
                    info!("Sync worker shutting down");
                    return;
                }
            }
        }
    }

    /// Degraded loop after every notifier sender is gone.
    async fn run_periodic_only(mut self, mut interval: tokio::time::Interval) {
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.engine.push().await;
                }
                _ = &mut self.shutdown_rx => {
                    info!("Sync worker shutting down");
                    return;
                }
            }
        }
    }
}

//! # Replication Notifier
//!
//! Fire-and-forget handoff from domain transactions to the sync worker.
//!
//! ## Why a Channel
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Domain op commits transaction                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  notifier.notify()  ← non-blocking send, never fails the op             │
//! │       │                                                                 │
//! │       ▼  (unbounded mpsc)                                               │
//! │  SyncWorker select loop ──► push attempt on its own schedule            │
//! │                                                                         │
//! │  The local write NEVER waits on the network. If no worker is            │
//! │  listening (tests, offline-only mode) the signal is dropped.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::mpsc;
use tracing::trace;

/// Signal sent to the sync worker after a local commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicateSignal;

/// Sender half handed to domain ops; cheap to clone.
#[derive(Debug, Clone)]
pub struct ReplicationNotifier {
    tx: Option<mpsc::UnboundedSender<ReplicateSignal>>,
}

impl ReplicationNotifier {
    /// Creates a connected notifier plus the receiver the sync worker owns.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReplicateSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ReplicationNotifier { tx: Some(tx) }, rx)
    }

    /// Creates a notifier that drops every signal.
    ///
    /// ## When To Use
    /// Tests and offline-only deployments where no sync worker runs.
    pub fn disabled() -> Self {
        ReplicationNotifier { tx: None }
    }

    /// Signals that committed local changes are waiting to be pushed.
    ///
    /// Never blocks and never errors: a closed or absent receiver means the
    /// worker is gone, and the periodic push will pick the changes up instead.
    pub fn notify(&self) {
        if let Some(tx) = &self.tx {
            if tx.send(ReplicateSignal).is_err() {
                trace!("Replication receiver dropped; relying on periodic push");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_delivers_signal() {
        let (notifier, mut rx) = ReplicationNotifier::channel();
        notifier.notify();
        assert_eq!(rx.recv().await, Some(ReplicateSignal));
    }

    #[test]
    fn test_disabled_notifier_is_silent() {
        let notifier = ReplicationNotifier::disabled();
        notifier.notify(); // must not panic
    }

    #[tokio::test]
    async fn test_notify_after_receiver_dropped() {
        let (notifier, rx) = ReplicationNotifier::channel();
        drop(rx);
        notifier.notify(); // must not panic or error
    }
}

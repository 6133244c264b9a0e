use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::entry::Entry;
use crate::index::Indexer;

/// Write half of the snapshot cell; owned exclusively by the refresh task.
pub struct SnapshotPublisher {
    tx: watch::Sender<Option<Arc<Entry>>>,
}

/// Read half of the snapshot cell; cheap to clone into request handlers.
///
/// Readers never block on the writer: each publication replaces the whole
/// tree reference at once, and a reader holding a previous generation keeps
/// a consistent view until it drops the `Arc`.
#[derive(Clone)]
pub struct SnapshotHandle {
    rx: watch::Receiver<Option<Arc<Entry>>>,
}

/// Creates the snapshot cell, initially empty (no snapshot published).
pub fn snapshot_cell() -> (SnapshotPublisher, SnapshotHandle) {
    let (tx, rx) = watch::channel(None);
    (SnapshotPublisher { tx }, SnapshotHandle { rx })
}

impl SnapshotPublisher {
    /// Publishes a freshly built tree, replacing the previous generation
    /// wholesale.
    pub fn publish(&self, tree: Entry) {
        // Send only fails when every handle is gone, which means nobody is
        // left to serve; the new tree is dropped along with the service.
        let _ = self.tx.send(Some(Arc::new(tree)));
    }
}

impl SnapshotHandle {
    /// Whether a first successful build has been published.
    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// The currently published tree, or `None` before the first successful
    /// build.
    pub fn snapshot(&self) -> Option<Arc<Entry>> {
        self.rx.borrow().clone()
    }
}

/// Runs one rebuild cycle: publish on success, keep the previous snapshot
/// on failure. A failed rebuild never regresses a ready service.
pub async fn refresh_once(indexer: &Indexer, publisher: &SnapshotPublisher) {
    match indexer.build().await {
        Ok(tree) => {
            tracing::debug!("publishing new index snapshot");
            publisher.publish(tree);
        }
        Err(error) => {
            tracing::error!(%error, "index rebuild failed, keeping previous snapshot");
        }
    }
}

/// Spawns the background task that rebuilds the index on a fixed interval.
///
/// Rebuilds run serially on this single task; the first one starts
/// immediately. Cancelling `shutdown` stops the loop between cycles.
pub fn spawn_refresher(
    indexer: Indexer,
    publisher: SnapshotPublisher,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = tick.tick() => refresh_once(&indexer, &publisher).await,
                () = shutdown.cancelled() => break,
            }
        }
    })
}

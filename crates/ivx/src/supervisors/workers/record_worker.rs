//! 🎬 *[a queue fills with rows. four workers wait at the other end.]*
//! *[nobody knows which worker gets which row. nobody needs to.]*
//!
//! 👷 The RecordWorker: receive a row, transform it, forward it, repeat until
//! the Work Queue is closed *and* drained. The loop blocks on `recv()`; it never
//! polls, never sleeps, never checks a flag.
//!
//! A failed transform is this worker's problem to absorb, not the pool's:
//! the row is dropped or passed through per [`TransformErrorPolicy`], a
//! counter goes up, and the loop carries on.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_channel::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::Worker;
use crate::common::InventoryItem;
use crate::transforms::{Transform, TransformErrorPolicy};

/// 📊 What a worker reports when its shift ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct WorkerStats {
    pub(crate) worker_id: usize,
    /// Rows received from the Work Queue.
    pub(crate) processed: usize,
    /// Rows whose transform failed (dropped or passed through, depending on policy).
    pub(crate) rejected: usize,
}

#[derive(Debug)]
pub(crate) struct RecordWorker<T> {
    worker_id: usize,
    rx: Receiver<InventoryItem>,
    tx: Sender<InventoryItem>,
    transformer: Arc<T>,
    on_error: TransformErrorPolicy,
}

impl<T> RecordWorker<T> {
    /// 🏗️ You hand it a receiver (the firehose), a sender (the drain) and a
    /// transformer (the filter in between). It does not ask what the rows are for.
    pub(crate) fn new(
        worker_id: usize,
        rx: Receiver<InventoryItem>,
        tx: Sender<InventoryItem>,
        transformer: Arc<T>,
        on_error: TransformErrorPolicy,
    ) -> Self {
        Self {
            worker_id,
            rx,
            tx,
            transformer,
            on_error,
        }
    }
}

impl<T: Transform + 'static> RecordWorker<T> {
    /// 🔄 Transform one row and decide what, if anything, goes downstream.
    fn process(&self, item: InventoryItem, stats: &mut WorkerStats) -> Option<InventoryItem> {
        // -- the clone only exists when the policy may need the original back
        let original = match self.on_error {
            TransformErrorPolicy::PassThrough => Some(item.clone()),
            TransformErrorPolicy::Drop => None,
        };
        let id = item.id.clone();

        match self.transformer.transform(item) {
            Ok(transformed) => Some(transformed),
            Err(err) => {
                stats.rejected += 1;
                warn!(
                    "⚠️ worker {} rejected row '{}' ({:?}): {:#}",
                    self.worker_id, id, self.on_error, err
                );
                original
            }
        }
    }
}

impl<T: Transform + 'static> Worker for RecordWorker<T> {
    type Report = WorkerStats;

    fn start(self) -> JoinHandle<Result<WorkerStats>> {
        tokio::spawn(async move {
            debug!("👷 worker {} clocked in", self.worker_id);
            let mut stats = WorkerStats {
                worker_id: self.worker_id,
                ..WorkerStats::default()
            };

            // -- Err from recv() means closed AND empty. that is the only way out.
            while let Ok(item) = self.rx.recv().await {
                stats.processed += 1;
                trace!("👷 worker {} took row '{}'", self.worker_id, item.id);

                if let Some(outgoing) = self.process(item, &mut stats) {
                    self.tx.send(outgoing).await.with_context(|| {
                        format!(
                            "💀 worker {} could not forward a row: the result queue is gone \
                             (the load was abandoned while this worker was still busy)",
                            self.worker_id
                        )
                    })?;
                }
            }

            debug!(
                "🏁 worker {} clocked out: {} processed, {} rejected",
                self.worker_id, stats.processed, stats.rejected
            );
            Ok(stats)
        })
    }
}

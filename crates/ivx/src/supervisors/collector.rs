//! 🧺 Fan-in: the barrier that closes the Result Queue, and the collector that drains it.
//!
//! 🎬 *[the last worker sends its last row. its JoinHandle resolves.]*
//! *[only then does the barrier reach for the lights.]*
//!
//! 🧠 Knowledge graph:
//! - [`close_after_all_workers`] owns the orchestrator's copy of the Result
//!   Queue sender. It awaits every worker handle (counted join, `join_all`)
//!   and only then calls `close()`. A worker's sends all happen before its
//!   handle resolves, so "closed after the last send" holds by construction.
//! - Each worker also holds a sender clone that drops when it exits. Until
//!   the barrier lets go, the queue stays open even if every worker is done.
//! - [`collect`] drains until the queue reports closed-and-empty. Completion
//!   order, not source order. Nobody re-sorts. Nobody should.

use anyhow::{Context, Result};
use async_channel::{Receiver, Sender};
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::common::InventoryItem;

/// 🚧 Join every worker, then close the Result Queue. Returns the per-worker reports.
///
/// 💀 If any worker failed or panicked, the error is returned after the queue
/// is closed, so the collector still terminates and the load fails as a whole.
pub(crate) async fn close_after_all_workers<R>(
    workers: Vec<JoinHandle<Result<R>>>,
    result_tx: Sender<InventoryItem>,
) -> Result<Vec<R>> {
    let expected = workers.len();
    let joined = join_all(workers).await;

    // -- every handle has resolved. nobody is left to send. lights out.
    result_tx.close();
    debug!("🚧 all {} workers joined, result queue closed", expected);

    let mut reports = Vec::with_capacity(expected);
    for (worker_id, outcome) in joined.into_iter().enumerate() {
        let report = outcome
            .with_context(|| format!("💀 worker {worker_id} panicked or was cancelled"))?
            .with_context(|| format!("💀 worker {worker_id} failed"))?;
        reports.push(report);
    }
    Ok(reports)
}

/// 🧺 Drain the Result Queue until it is closed and empty.
pub(crate) async fn collect(result_rx: Receiver<InventoryItem>) -> Vec<InventoryItem> {
    let mut items = Vec::with_capacity(result_rx.capacity().unwrap_or(0));
    while let Ok(item) = result_rx.recv().await {
        items.push(item);
    }
    debug!("🧺 collected {} items", items.len());
    items
}

//! 🎬 *[camera pans across a dimly lit warehouse]*
//! 🎬 "In a world where rows must be loaded exactly once..."
//! 🎬 "One supervisor dared to manage them all."
//!
//! 📦 The Supervisor module: part middle manager, part helicopter parent. It
//! owns the load protocol end to end:
//!
//! ```text
//!  1. source.read_all()                       all rows or nothing
//!  2. workers = min(configured, rows)         zero rows? publish [] and go home
//!  3. spawn workers ──────────────┐
//!  4. producer: enqueue all, close │ Work Queue (bounded, capacity = rows)
//!  5. barrier: join workers, close │ Result Queue (bounded, capacity = rows)
//!  6. collector: drain ◀───────────┘
//!  7. store.publish(result set)              one Arc swap
//!  8. LoadReport                              counts, timings, generation
//! ```
//!
//! ⚠️ DO NOT MAKE THIS PUB EVER. WORKERS ARE SUPERVISORS' PRIVATE LITTLE MINIONS.
//! The outside world gets `crate::load_inventory` and a [`LoadReport`]. That's it.

mod collector;
mod workers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use async_channel::Sender;
use tracing::{debug, info};

use crate::app_config::RuntimeConfig;
use crate::backends::Source;
use crate::common::InventoryItem;
use crate::store::InventoryStore;
use crate::transforms::Transform;
use collector::{close_after_all_workers, collect};
use workers::{RecordWorker, Worker, WorkerStats};

/// 📋 What one load did, for the logs and for whoever is watching the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows the source produced.
    pub read: usize,
    /// Rows that ended up in the store.
    pub published: usize,
    /// Rows whose transform failed (dropped or passed through).
    pub rejected: usize,
    /// Workers actually spawned, `min(configured, read)`.
    pub workers: usize,
    /// Store generation after the publish.
    pub generation: u64,
    pub elapsed: Duration,
}

/// 🧺 Everything the pipeline produced, before anyone touches the store.
#[derive(Debug)]
struct PipelineOutcome {
    items: Vec<InventoryItem>,
    read: usize,
    worker_stats: Vec<WorkerStats>,
}

/// 📦 The Supervisor: because even async tasks need someone hovering over them
/// asking "is it done yet?"
pub(crate) struct Supervisor<T> {
    runtime: RuntimeConfig,
    transformer: Arc<T>,
}

impl<T: Transform + 'static> Supervisor<T> {
    pub(crate) fn new(runtime: RuntimeConfig, transformer: T) -> Self {
        Self {
            runtime,
            transformer: Arc::new(transformer),
        }
    }

    /// 🚀 Run one full load and publish the result into `store`.
    ///
    /// All-or-nothing: if reading, any worker, or the deadline fails, the error
    /// comes back and `store` is exactly as it was.
    pub(crate) async fn load<S>(&self, source: &mut S, store: &InventoryStore) -> Result<LoadReport>
    where
        S: Source + ?Sized,
    {
        let started = Instant::now();
        info!(
            "🚀 load started: up to {} workers, transform {:?}, on error {:?}",
            self.runtime.worker_count, self.runtime.transform, self.runtime.on_transform_error
        );

        let outcome = match self.runtime.load_timeout() {
            // -- on timeout the pipeline future is dropped, which drops the result
            // -- receiver; any worker still running fails its next send and exits
            Some(deadline) => tokio::time::timeout(deadline, self.run_pipeline(source))
                .await
                .map_err(|_| {
                    anyhow!(
                        "💀 load did not finish within {:?}; nothing was published",
                        deadline
                    )
                })??,
            None => self.run_pipeline(source).await?,
        };

        let rejected = outcome.worker_stats.iter().map(|s| s.rejected).sum();
        let published = outcome.items.len();
        let generation = store.publish(outcome.items).await;

        let report = LoadReport {
            read: outcome.read,
            published,
            rejected,
            workers: outcome.worker_stats.len(),
            generation,
            elapsed: started.elapsed(),
        };
        info!(
            "✅ Successfully loaded {} items from inventory ({} read, {} rejected, {} workers, generation {}, {:?})",
            report.published, report.read, report.rejected, report.workers, report.generation, report.elapsed
        );
        Ok(report)
    }

    /// 🧵 Steps 1 to 6. Produces the result set; never touches the store.
    async fn run_pipeline<S>(&self, source: &mut S) -> Result<PipelineOutcome>
    where
        S: Source + ?Sized,
    {
        let records = source
            .read_all()
            .await
            .context("💀 Could not obtain inventory records from the source")?;
        let read = records.len();

        let worker_count = self.runtime.worker_count.min(read);
        if worker_count == 0 {
            // -- nothing to do, and bounded(0) is not a channel anyone wants
            debug!("🫙 source produced no records, skipping the worker pool");
            return Ok(PipelineOutcome {
                items: Vec::new(),
                read,
                worker_stats: Vec::new(),
            });
        }

        let (work_tx, work_rx) = async_channel::bounded::<InventoryItem>(read);
        let (result_tx, result_rx) = async_channel::bounded::<InventoryItem>(read);

        let workers: Vec<_> = (0..worker_count)
            .map(|worker_id| {
                RecordWorker::new(
                    worker_id,
                    work_rx.clone(),
                    result_tx.clone(),
                    Arc::clone(&self.transformer),
                    self.runtime.on_transform_error,
                )
                .start()
            })
            .collect();
        // -- the workers hold their own receivers; ours would only keep the queue alive
        drop(work_rx);
        debug!("👷 {} workers started for {} records", worker_count, read);

        let producer = tokio::spawn(enqueue_all(records, work_tx));
        let barrier = tokio::spawn(close_after_all_workers(workers, result_tx));

        let items = collect(result_rx).await;

        let worker_stats = barrier
            .await
            .context("💀 the worker barrier task panicked")??;
        for stats in &worker_stats {
            debug!(
                "📊 worker {}: {} processed, {} rejected",
                stats.worker_id, stats.processed, stats.rejected
            );
        }
        let enqueued = producer
            .await
            .context("💀 the producer task panicked")??;
        debug!("📬 producer enqueued {} records", enqueued);

        Ok(PipelineOutcome {
            items,
            read,
            worker_stats,
        })
    }
}

/// 📬 The producer: every record onto the Work Queue, then close it.
///
/// Capacity equals the record count, so no `send` here ever waits on a full queue.
async fn enqueue_all(records: Vec<InventoryItem>, work_tx: Sender<InventoryItem>) -> Result<usize> {
    let total = records.len();
    for record in records {
        work_tx
            .send(record)
            .await
            .context("💀 the work queue closed before every record was enqueued (all workers gone?)")?;
    }
    // -- the one and only termination signal the workers get
    work_tx.close();
    Ok(total)
}

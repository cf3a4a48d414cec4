//! 🧵 Workers: the ones who actually do the work while the Supervisor takes
//! all the credit in the sprint retro.
//!
//! ⚠️ Workers are the Supervisor's private minions. They read from the Work
//! Queue, write to the Result Queue, and that's it. No store access, no peeking
//! at each other, no sentinel values. When the Work Queue is closed and empty,
//! they go home.

use anyhow::Result;
use tokio::task::JoinHandle;

mod record_worker;
pub(crate) use record_worker::{RecordWorker, WorkerStats};

/// 🏗️ A background worker, that does work. duh.
///
/// `start` consumes the worker and spawns it; the handle resolves once the
/// worker has exited, carrying whatever it wants to report about its shift.
pub(crate) trait Worker {
    type Report: Send + 'static;

    fn start(self) -> JoinHandle<Result<Self::Report>>;
}

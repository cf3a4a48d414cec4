//! 🏪 The Shared Store: one slot, many readers, the occasional writer.
//!
//! 🎬 *[the loader finishes. the result set is complete. it walks to the shelf.]*
//! *[the old set is still there. readers are still reading it. nobody panics.]*
//! *[one `Arc` swap later, the new set is on the shelf. the old one fades away.]*
//!
//! 🧠 Knowledge graph:
//! - Written by exactly one party: the load orchestrator (`Supervisor::load`), once per load.
//! - Read by the HTTP handler, concurrently, as often as browsers refresh.
//! - Holds `Arc<Vec<InventoryItem>>`. The `Vec` is finished before it is wrapped,
//!   and wrapped before the write lock is taken, so the critical section is a
//!   pointer swap. Readers clone the `Arc` and leave. Nobody serializes JSON
//!   while holding the lock.
//! - Immutability of a snapshot is enforced by `Arc`: there is no `&mut` path
//!   to a published set. Want to change it? Publish a new one.
//!
//! ⚠️ `tokio::sync::RwLock` rather than the std one: no poisoning, and a burst
//! of readers cannot starve the writer forever.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::common::InventoryItem;

/// 📸 A published result set. Shared. Immutable. Forever young.
pub type Snapshot = Arc<Vec<InventoryItem>>;

#[derive(Debug)]
struct Shelf {
    items: Snapshot,
    generation: u64,
}

/// 🏪 Cloneable handle to the single published inventory.
///
/// Clones share the same slot, so hand one to the server and keep one for the
/// loader. Constructed empty (generation 0).
#[derive(Debug, Clone)]
pub struct InventoryStore {
    shelf: Arc<RwLock<Shelf>>,
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryStore {
    /// 🚀 An empty store. Serves `[]` until the first publish.
    pub fn new() -> Self {
        Self {
            shelf: Arc::new(RwLock::new(Shelf {
                items: Arc::new(Vec::new()),
                generation: 0,
            })),
        }
    }

    /// 📤 Replace the current set with `items`. Returns the new generation.
    ///
    /// The `Arc` is allocated before the exclusive lock is taken; under the lock
    /// we swap a pointer and bump a counter. The previous set is dropped after
    /// the guard is released (or later, by whichever reader let go of it last).
    pub async fn publish(&self, items: Vec<InventoryItem>) -> u64 {
        let fresh: Snapshot = Arc::new(items);
        let count = fresh.len();

        let (generation, previous) = {
            let mut shelf = self.shelf.write().await;
            let previous = std::mem::replace(&mut shelf.items, fresh);
            shelf.generation += 1;
            (shelf.generation, previous)
        };
        drop(previous);

        debug!("🏪 published generation {} with {} items", generation, count);
        generation
    }

    /// 📸 The current set, as a shared handle. The read lock is held for one `Arc::clone`.
    pub async fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.shelf.read().await.items)
    }

    /// 🔢 How many times `publish` has run. 0 means "still the empty shelf".
    pub async fn generation(&self) -> u64 {
        self.shelf.read().await.generation
    }
}

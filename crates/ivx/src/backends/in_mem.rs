//! # Previously, on ivx...
//!
//! 🎬 Someone needed records without a disk, without a CSV, without a single
//! syscall. Tests, mostly. Benchmarks, occasionally. This backend hands over
//! whatever rows it was built with, exactly once, and then has nothing left
//! to give. Like my motivation on a Friday afternoon.
//!
//! ⚠️ This is NOT for production. If you're deploying this to prod, please
//! also deploy a therapist.

use anyhow::Result;
use async_trait::async_trait;

use crate::backends::Source;
use crate::common::InventoryItem;

/// 📦 A source backed by a `Vec` you already have.
///
/// The first `read_all` moves the rows out; later calls return an empty list.
/// One load per customer. This is Costco, not a buffet.
#[derive(Debug, Default)]
pub struct InMemorySource {
    items: Option<Vec<InventoryItem>>,
}

impl InMemorySource {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items: Some(items) }
    }
}

#[async_trait]
impl Source for InMemorySource {
    async fn read_all(&mut self) -> Result<Vec<InventoryItem>> {
        // -- 🔒 take() leaves None behind: the shelf is empty now, ask again and you get []
        Ok(self.items.take().unwrap_or_default())
    }
}

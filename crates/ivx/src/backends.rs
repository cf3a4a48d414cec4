//! 🔌 Backends: where the records come from.
//!
//! 🚰 A Source hands the loader the complete, ordered list of records in one
//! go. The load is bounded and known in size, so there is no paging, no
//! cursor, no "are we there yet". One call, one `Vec`, or one error.
//!
//! 🎭 This module is the casting agency. Need rows from a CSV on disk? Rows you
//! already built in a test? We've got a backend for that.
//!
//! ## Error taxonomy 🧠
//! A failed `read_all` is fatal to the load. The cause chain says why:
//! - contains a [`std::io::Error`] → the source could not be read ([`is_source_read_error`])
//! - contains a [`csv::Error`] or a [`MissingHeaderRow`] → the source was read but is not
//!   valid inventory ([`is_source_parse_error`])
//!
//! 🦆 The duck is here because every file must have one. Do not question the duck.

use anyhow::Result;
use async_trait::async_trait;

use crate::app_config::SourceConfig;
use crate::common::InventoryItem;

pub(crate) mod file;
pub(crate) mod in_mem;

pub use file::{FileSource, FileSourceConfig, MissingHeaderRow};
pub use in_mem::InMemorySource;

/// 🚰 A source that produces every record of one load.
///
/// # Contract 📜
/// - `read_all` returns the full ordered record sequence, or an error. Never a partial list.
/// - An empty `Vec` is a valid answer: the store will publish an empty set.
/// - `&mut self` because sources may hold state (a consumed buffer, a path, feelings).
#[async_trait]
pub trait Source: std::fmt::Debug + Send {
    async fn read_all(&mut self) -> Result<Vec<InventoryItem>>;
}

/// 🎭 The many faces of a Source. Callers never need to know if the rows
/// came from disk or from a test fixture.
#[derive(Debug)]
pub enum SourceBackend {
    InMemory(InMemorySource),
    File(FileSource),
}

impl SourceBackend {
    /// 🔧 Resolve a backend from config. File sources are lazy: nothing is
    /// opened until `read_all`, so a missing file fails the load, not the constructor.
    pub fn from_config(config: &SourceConfig) -> Self {
        match config {
            SourceConfig::File(file_config) => Self::File(FileSource::new(file_config.clone())),
        }
    }
}

#[async_trait]
impl Source for SourceBackend {
    async fn read_all(&mut self) -> Result<Vec<InventoryItem>> {
        match self {
            SourceBackend::InMemory(i) => i.read_all().await,
            SourceBackend::File(f) => f.read_all().await,
        }
    }
}

/// 📂 True when the failure (anywhere in the chain) is an I/O error: missing
/// file, permissions, the disk being a disk.
pub fn is_source_read_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.downcast_ref::<std::io::Error>().is_some())
}

/// 📄 True when the failure (anywhere in the chain) is malformed tabular data.
pub fn is_source_parse_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<csv::Error>().is_some() || cause.downcast_ref::<MissingHeaderRow>().is_some()
    })
}

//! 📦 ivx: load an inventory CSV through a worker pool, serve it as JSON.
//!
//! 🚰 source → Work Queue → workers → Result Queue → collector → store → `GET /api/inventory`
//!
//! The CLI wires it together as: `app_config::load_config` → [`load_inventory`]
//! → `server::bind` → `server::serve`. Everything in between is the
//! Supervisor's business.

pub mod app_config;
pub mod backends;
pub mod common;
pub mod server;
pub mod store;
pub mod transforms;

mod supervisors;

use anyhow::Result;

use crate::app_config::RuntimeConfig;
use crate::backends::Source;
use crate::store::InventoryStore;
use crate::supervisors::Supervisor;
use crate::transforms::{RecordTransformer, Transform};

pub use supervisors::LoadReport;

/// 🚀 Run one load with the transform named in `runtime.transform` and publish into `store`.
pub async fn load_inventory<S>(
    runtime: &RuntimeConfig,
    source: &mut S,
    store: &InventoryStore,
) -> Result<LoadReport>
where
    S: Source + ?Sized,
{
    let transformer = RecordTransformer::from_kind(runtime.transform);
    load_inventory_with(runtime, transformer, source, store).await
}

/// 🔧 Same as [`load_inventory`], with a transform of your choosing.
pub async fn load_inventory_with<T, S>(
    runtime: &RuntimeConfig,
    transformer: T,
    source: &mut S,
    store: &InventoryStore,
) -> Result<LoadReport>
where
    T: Transform + 'static,
    S: Source + ?Sized,
{
    Supervisor::new(runtime.clone(), transformer)
        .load(source, store)
        .await
}

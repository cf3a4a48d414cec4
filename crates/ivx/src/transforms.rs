//! 🔄 Transforms: what a worker does to a record between two channels 🎭
//!
//! 🎬 COLD OPEN: INT. QUALITY CONTROL BOOTH - NIGHT SHIFT
//!
//! A conveyor belt of inventory rows. A tired inspector with a clipboard.
//! Most rows get waved through. Some get their whitespace trimmed. One has a
//! stock count of minus four, and the inspector sighs the sigh of someone who
//! has met the procurement spreadsheet before.
//!
//! ## Architecture 📐
//!
//! ```text
//!   Work Queue ──▶ RecordWorker ──▶ transformer.transform(item) ──▶ Result Queue
//!                                       │
//!                                       └── Err(..) ──▶ TransformErrorPolicy
//!                                                        ├── Drop        (warn + count)
//!                                                        └── PassThrough (forward original + count)
//! ```
//!
//! Same shape as the backends: a trait, concrete zero-sized impls, an enum
//! dispatcher resolved from config. The pool itself is generic over
//! [`Transform`], so tests can plug in their own.
//!
//! ## Knowledge Graph 🧠
//! - Depends on: `common::InventoryItem`
//! - Used by: `supervisors::workers::RecordWorker`
//! - Resolved from: `RuntimeConfig::transform` via [`RecordTransformer::from_kind`]
//! - Error policy from: `RuntimeConfig::on_transform_error`
//! - Contract: transforms are order-independent and side-effect free. No I/O. No store access.

use anyhow::Result;
use serde::Deserialize;

use crate::common::InventoryItem;

pub(crate) mod normalize;
pub(crate) mod passthrough;

pub use normalize::Normalize;
pub use passthrough::Passthrough;

/// 🔄 A per-record transformation applied inside the worker pool.
///
/// # Contract 📜
/// - Takes ownership of the record, returns the (possibly rewritten) record.
/// - `Err` marks this one record as rejected. The worker keeps going; what
///   happens to the record is the pool's [`TransformErrorPolicy`], not yours.
/// - Must be callable from many workers at once (`&self`, `Send + Sync`).
pub trait Transform: Send + Sync {
    fn transform(&self, item: InventoryItem) -> Result<InventoryItem>;
}

/// 🏷️ Which transform to run. Lowercase in TOML: `transform = "normalize"`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    #[default]
    Passthrough,
    Normalize,
}

/// ⚖️ What the worker does with a record whose transform failed.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransformErrorPolicy {
    /// 🗑️ Log, count, and leave it out of the published set.
    #[default]
    Drop,
    /// 🚶 Log, count, and publish the original, untransformed record.
    PassThrough,
}

/// 🎭 The polymorphic transformer. Enum dispatch, no vtables, resolved once per load.
#[derive(Debug, Clone, Copy)]
pub enum RecordTransformer {
    Passthrough(Passthrough),
    Normalize(Normalize),
}

impl RecordTransformer {
    /// 🔧 Resolve the transformer from config.
    pub fn from_kind(kind: TransformKind) -> Self {
        match kind {
            TransformKind::Passthrough => Self::Passthrough(Passthrough),
            TransformKind::Normalize => Self::Normalize(Normalize),
        }
    }
}

impl Transform for RecordTransformer {
    #[inline]
    fn transform(&self, item: InventoryItem) -> Result<InventoryItem> {
        match self {
            Self::Passthrough(t) => t.transform(item),
            Self::Normalize(t) => t.transform(item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_kinds_resolve_to_their_transformers() {
        assert!(matches!(
            RecordTransformer::from_kind(TransformKind::Passthrough),
            RecordTransformer::Passthrough(_)
        ));
        assert!(matches!(
            RecordTransformer::from_kind(TransformKind::Normalize),
            RecordTransformer::Normalize(_)
        ));
    }

    #[test]
    fn the_one_where_the_dispatcher_forwards_errors_untouched() {
        let transformer = RecordTransformer::from_kind(TransformKind::Normalize);
        let bad = InventoryItem::sample("", 1, 1.0);
        assert!(transformer.transform(bad).is_err());
    }

    #[test]
    fn the_one_where_config_spellings_are_snake_case() -> Result<()> {
        #[derive(Deserialize)]
        struct Knobs {
            transform: TransformKind,
            on_transform_error: TransformErrorPolicy,
        }
        let knobs: Knobs = toml::from_str(
            r#"
            transform = "normalize"
            on_transform_error = "pass_through"
            "#,
        )?;
        assert_eq!(knobs.transform, TransformKind::Normalize);
        assert_eq!(knobs.on_transform_error, TransformErrorPolicy::PassThrough);
        Ok(())
    }
}

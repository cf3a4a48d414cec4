//! 🧹 Normalize Transform: the inspector with the clipboard.
//!
//! Trims whitespace off every string field (spreadsheets love a trailing
//! space), upper-cases the SKU, and refuses rows that cannot be true:
//!
//! - an empty `id` after trimming
//! - a negative `stock`
//! - a `price` that is negative, NaN or infinite
//!
//! A refusal is an `Err` for that one row. The worker decides what happens
//! next per `on_transform_error`; this module just says no.

use anyhow::{Result, bail};

use super::Transform;
use crate::common::InventoryItem;

/// 🧹 Validation + normalization. Zero-sized, shareable across every worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalize;

fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

impl Transform for Normalize {
    fn transform(&self, item: InventoryItem) -> Result<InventoryItem> {
        let id = trimmed(item.id);
        if id.is_empty() {
            bail!("💀 row rejected: empty id (sku '{}')", item.sku.trim());
        }
        if item.stock < 0 {
            bail!("💀 row '{}' rejected: negative stock {}", id, item.stock);
        }
        if !item.price.is_finite() || item.price < 0.0 {
            bail!("💀 row '{}' rejected: price {} is not a sane price", id, item.price);
        }

        Ok(InventoryItem {
            id,
            sku: item.sku.trim().to_uppercase(),
            product_name: trimmed(item.product_name),
            category: trimmed(item.category),
            stock: item.stock,
            price: item.price,
            last_updated: trimmed(item.last_updated),
        })
    }
}

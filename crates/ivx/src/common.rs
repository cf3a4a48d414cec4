//! 📦 Common data structures: the building blocks of ivx
//!
//! 🎬 COLD OPEN: INT. WAREHOUSE - 6:02 AM
//!
//! A forklift beeps in reverse. Somewhere a spreadsheet has been exported to
//! CSV by someone who swears they "didn't touch the columns". Seven columns
//! walk into the loader. Seven fields walk out. This module is the customs
//! desk they pass through.
//!
//! [`InventoryItem`] is the one record type the whole pipeline carries. It is
//! decoded by the source, moved (never cloned, mostly) through the worker
//! pool, and ends its life inside the [`crate::store::InventoryStore`] as part
//! of an immutable published set. 🦆

use serde::{Deserialize, Serialize};

/// 🎯 One row of the inventory spreadsheet. One product, one destiny.
///
/// Field names double as the CSV header names and the JSON keys served on
/// `/api/inventory`, so the frontend, the spreadsheet and this struct all
/// agree on spelling. Renaming a field is a breaking change in three places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// The row identity. A string, because spreadsheets do not respect integers.
    pub id: String,
    pub sku: String,
    pub product_name: String,
    pub category: String,
    /// 📦 Units on hand. Signed on purpose: the `Normalize` transform is the one
    /// who gets to tell a negative stock count that it is wrong.
    pub stock: i64,
    /// 💰 Unit price, as a float. The accountants have been notified.
    pub price: f64,
    /// ⏱️ Opaque timestamp string, passed through as the source wrote it.
    pub last_updated: String,
}

impl InventoryItem {
    /// 🏗️ Builds an item with placeholder descriptive fields.
    ///
    /// The pipeline never calls this; tests and benches do, because typing seven
    /// fields per fixture is how carpal tunnel starts.
    pub fn sample(id: impl Into<String>, stock: i64, price: f64) -> Self {
        let id = id.into();
        Self {
            sku: format!("SKU-{id}"),
            product_name: format!("Product {id}"),
            category: "general".to_string(),
            last_updated: "2024-01-01T00:00:00Z".to_string(),
            id,
            stock,
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn the_one_where_json_keys_match_the_frontend_contract() -> Result<()> {
        let item = InventoryItem::sample("42", 7, 19.5);
        let json: serde_json::Value = serde_json::to_value(&item)?;

        for key in ["id", "sku", "product_name", "category", "stock", "price", "last_updated"] {
            assert!(json.get(key).is_some(), "missing JSON key '{key}'");
        }
        assert_eq!(json["stock"], 7);
        assert_eq!(json["price"], 19.5);
        assert_eq!(json.as_object().map(|o| o.len()), Some(7));
        Ok(())
    }
}

//! 🚶 Passthrough Transform: the "I changed nothing and took credit" of transforms 🎭
//!
//! "What did you do yesterday?"
//! "I passed rows through unchanged."
//! "Any blockers?"
//! "No. I am the blocker. I am become passthrough, destroyer of nothing."
//!
//! This is the reference behavior of the loader: the worker pool exists, the
//! fan-out happens, the fan-in happens, and every record comes out exactly as
//! it went in. Zero cost. The compiler may optimize it to a `mov`. 🦆

use anyhow::Result;

use super::Transform;
use crate::common::InventoryItem;

/// 🚶 Identity transform. Never fails. Never judges.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Transform for Passthrough {
    #[inline]
    fn transform(&self, item: InventoryItem) -> Result<InventoryItem> {
        // -- 📬 return to sender. no modification. ownership moved in, ownership moved out.
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_passthrough_preserves_everything() -> Result<()> {
        // 🧪 even the weird rows survive. passthrough does not have opinions.
        let the_sacred_row = InventoryItem {
            id: "  padded  ".into(),
            sku: "lower-case".into(),
            product_name: "Widget".into(),
            category: "".into(),
            stock: -3,
            price: 0.0,
            last_updated: "whenever".into(),
        };
        let the_output = Passthrough.transform(the_sacred_row.clone())?;
        assert_eq!(the_output, the_sacred_row, "Passthrough must be the identity function");
        Ok(())
    }
}

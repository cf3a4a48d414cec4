//! 📂 Previously, on "Things That Could Go Wrong With A File"...
//!
//! The file didn't exist. Or it did, but someone opened it in a spreadsheet
//! app, "fixed" the header to `Product Name`, and saved it. Or the stock
//! column says `lots`. This module reads an inventory CSV off disk and turns
//! it into records, or into an error chain that says exactly which of those
//! happened.
//!
//! 🚰 disk → tokio::fs::read → csv::Reader → Vec<InventoryItem> → Work Queue
//! 🦆 (mandatory, no notes)

mod file_source;

pub use file_source::{FileSource, FileSourceConfig, MissingHeaderRow};
#[cfg(test)]
pub(crate) use file_source::parse_inventory_csv;

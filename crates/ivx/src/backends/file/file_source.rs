use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, de};
use tracing::{debug, trace};

use crate::backends::Source;
use crate::common::InventoryItem;

// -- 📂 FileSourceConfig: "It's just a file", said no sysadmin ever before the disk filled up.
// -- Lives here, next to the FileSource that uses it, so nobody has to go spelunking at 2am.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FileSourceConfig {
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

// -- 📄 relative to the working directory, like every CSV ever emailed to ops
fn default_file_name() -> String {
    "inventory.csv".to_string()
}

impl Default for FileSourceConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
        }
    }
}

/// 📂 FileSource: reads an inventory CSV with a header row, all of it, in one go.
///
/// Header cells are trimmed before matching (` stock` is still `stock`), and
/// so are numeric cells. Extra columns are ignored. No header row at all is
/// a [`MissingHeaderRow`]. A missing required column, or a cell that does
/// not fit its field type, fails the whole file: there is no partial load.
#[derive(Debug)]
pub struct FileSource {
    source_config: FileSourceConfig,
}

impl FileSource {
    /// 🚀 Remembers the path. Opening happens in `read_all`, so construction can't fail.
    pub fn new(source_config: FileSourceConfig) -> Self {
        Self { source_config }
    }
}

#[async_trait]
impl Source for FileSource {
    async fn read_all(&mut self) -> Result<Vec<InventoryItem>> {
        let file_name = &self.source_config.file_name;

        // -- 💀 the door. it's locked. or it doesn't exist. or the filesystem lied to you.
        let raw = tokio::fs::read(file_name).await.with_context(|| {
            format!(
                "💀 Could not read inventory file '{}'. Check that it exists and that we are \
                 allowed to read it (relative paths resolve against the working directory).",
                file_name
            )
        })?;
        debug!("📖 read {} bytes from '{}'", raw.len(), file_name);

        parse_inventory_csv(&raw, file_name)
    }
}

/// 🕳️ The file had no header row at all (zero bytes, or nothing but blank lines).
///
/// Every required column is missing, so this is a parse failure, same family
/// as a `csv::Error`. [`crate::backends::is_source_parse_error`] knows both.
#[derive(Debug)]
pub struct MissingHeaderRow {
    pub origin: String,
}

impl fmt::Display for MissingHeaderRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' has no header row. Expected columns: \
             id, sku, product_name, category, stock, price, last_updated.",
            self.origin
        )
    }
}

impl std::error::Error for MissingHeaderRow {}

/// 📄 One CSV row as written. Numeric cells get trimmed before parsing
/// (` 10 ` is 10); text cells are kept exactly as they are.
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    sku: String,
    product_name: String,
    category: String,
    #[serde(deserialize_with = "trimmed_number")]
    stock: i64,
    #[serde(deserialize_with = "trimmed_number")]
    price: f64,
    last_updated: String,
}

impl From<CsvRow> for InventoryItem {
    fn from(row: CsvRow) -> Self {
        Self {
            id: row.id,
            sku: row.sku,
            product_name: row.product_name,
            category: row.category,
            stock: row.stock,
            price: row.price,
            last_updated: row.last_updated,
        }
    }
}

// -- 🔢 errors raised here surface as csv::Error (Deserialize kind), with row and field
fn trimmed_number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim()
        .parse()
        .map_err(|err| de::Error::custom(format!("'{raw}' is not a number: {err}")))
}

/// 📄 Decode CSV bytes into records. `origin` only shows up in error messages.
pub(crate) fn parse_inventory_csv(raw: &[u8], origin: &str) -> Result<Vec<InventoryItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(raw);

    // -- no header at all is not "an empty inventory", it is not an inventory
    let header_cells = reader
        .headers()
        .with_context(|| format!("💀 Could not read the header row of '{origin}'"))?
        .len();
    if header_cells == 0 {
        return Err(MissingHeaderRow {
            origin: origin.to_string(),
        })
        .context("💀 Could not parse inventory file");
    }

    let mut items = Vec::new();
    for (row_index, row) in reader.deserialize::<CsvRow>().enumerate() {
        // -- row 1 is the first data row; the header is row 0 in our heads
        let item = row.with_context(|| {
            format!(
                "💀 Could not parse data row {} of '{}' as an inventory item. Expected columns: \
                 id, sku, product_name, category, stock (integer), price (number), last_updated.",
                row_index + 1,
                origin
            )
        })?;
        trace!("📄 row {}: {}", row_index + 1, item.id);
        items.push(item.into());
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const THREE_ROWS: &str = "\
id,sku,product_name,category,stock,price,last_updated
1,SKU-001,Widget,tools,10,2.5,2024-01-01
2,SKU-002,Gadget,tools,0,19.99,2024-01-02
3,SKU-003,Doohickey,misc,7,0.1,2024-01-03
";

    #[test]
    fn the_one_where_three_rows_come_out_in_file_order() -> Result<()> {
        let items = parse_inventory_csv(THREE_ROWS.as_bytes(), "inline")?;
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(items[1].product_name, "Gadget");
        assert_eq!(items[1].stock, 0);
        assert_eq!(items[1].price, 19.99);
        Ok(())
    }

    #[test]
    fn the_one_where_a_header_only_file_is_an_empty_inventory() -> Result<()> {
        let items = parse_inventory_csv(
            b"id,sku,product_name,category,stock,price,last_updated\n",
            "inline",
        )?;
        assert!(items.is_empty());
        Ok(())
    }

    #[test]
    fn the_one_where_a_zero_byte_file_is_refused() {
        for nothing in [&b""[..], b"\n\n"] {
            let err = parse_inventory_csv(nothing, "empty.csv").err();
            assert!(
                err.as_ref()
                    .is_some_and(|e| e.chain().any(|c| c.downcast_ref::<MissingHeaderRow>().is_some())),
                "no header row must not load as an empty inventory: {err:?}"
            );
            let msg = err.map(|e| format!("{e:#}")).unwrap_or_default();
            assert!(msg.contains("empty.csv"), "{msg}");
        }
    }

    #[test]
    fn the_one_where_padded_numbers_still_count() -> Result<()> {
        let raw = "id,sku,product_name,category,stock,price,last_updated\n1,S,W,t, 10 , 2.5 ,2024\n";
        let items = parse_inventory_csv(raw.as_bytes(), "inline")?;
        assert_eq!(items[0].stock, 10);
        assert_eq!(items[0].price, 2.5);
        // -- text cells are not the parser's business; Normalize trims those
        let raw = "id,sku,product_name,category,stock,price,last_updated\n 1 ,S, W ,t,1,1,2024\n";
        let items = parse_inventory_csv(raw.as_bytes(), "inline")?;
        assert_eq!(items[0].id, " 1 ");
        assert_eq!(items[0].product_name, " W ");
        Ok(())
    }

    #[test]
    fn the_one_where_columns_can_be_shuffled_padded_and_extra() -> Result<()> {
        let raw = "\
 price , stock ,id,sku,product_name,category,last_updated,warehouse
3.5,4,9,S-9,Thing,misc,2024-02-02,north
";
        let items = parse_inventory_csv(raw.as_bytes(), "inline")?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "9");
        assert_eq!(items[0].stock, 4);
        assert_eq!(items[0].price, 3.5);
        Ok(())
    }

    #[test]
    fn the_one_where_stock_says_lots_and_the_whole_file_is_refused() {
        let raw = "\
id,sku,product_name,category,stock,price,last_updated
1,SKU-001,Widget,tools,10,2.5,2024-01-01
2,SKU-002,Gadget,tools,lots,19.99,2024-01-02
";
        let err = parse_inventory_csv(raw.as_bytes(), "inventory.csv").err();
        let msg = err.map(|e| format!("{e:#}")).unwrap_or_default();
        assert!(msg.contains("row 2"), "error should point at the bad row: {msg}");
        assert!(msg.contains("inventory.csv"));
    }

    #[test]
    fn the_one_where_a_missing_column_is_a_parse_error() {
        let raw = "id,sku,product_name,category,price,last_updated\n1,S,W,t,2.5,2024\n";
        assert!(parse_inventory_csv(raw.as_bytes(), "inline").is_err());
    }

    #[tokio::test]
    async fn the_one_where_a_real_file_on_disk_is_read() -> Result<()> {
        let mut scratch = tempfile::NamedTempFile::new()?;
        scratch.write_all(THREE_ROWS.as_bytes())?;
        let mut source = FileSource::new(FileSourceConfig {
            file_name: scratch.path().display().to_string(),
        });
        assert_eq!(source.read_all().await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_file_is_not_there() {
        let mut source = FileSource::new(FileSourceConfig {
            file_name: "/nope/inventory.csv".into(),
        });
        let msg = source.read_all().await.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("/nope/inventory.csv"), "context should name the file: {msg}");
    }
}

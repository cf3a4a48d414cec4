//! 🚀 ivx-cli: the front door, the bouncer, the maitre d' of ivx.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary is the thin wrapper that loads config, sets up logging, runs
//! the startup load, prints a table about it, and then serves until Ctrl-C.
//! Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ivx::LoadReport;
use ivx::backends::{SourceBackend, is_source_parse_error, is_source_read_error};
use ivx::store::InventoryStore;

/// 📦 Load an inventory CSV through a worker pool and serve it at /api/inventory.
#[derive(Debug, Parser)]
#[command(name = "ivx", version)]
struct Args {
    /// 🔧 TOML config file. Used only if it exists; IVX_* env vars and defaults cover the rest.
    #[arg(default_value = "ivx.toml")]
    config: PathBuf,
}

/// 🚀 main(): where it all begins.
///
/// 🔧 Steps:
/// 1. Init tracing (so we can see what goes wrong, and when)
/// 2. Parse args
/// 3. Load config
/// 4. Load the inventory (all of it, or we don't start)
/// 5. Bind and serve
/// 6. Handle errors (cry, then exit 1)
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Err(err) = run(args).await {
        error!("💀 error: {}", err);
        // -- 🧅 peel the onion of sadness, one layer at a time
        for cause in err.chain().skip(1) {
            error!("⚠️  cause: {}", cause);
        }

        // -- 🕵️ sniff the chain for the two failures people actually hit at startup
        if is_source_read_error(&err) {
            error!(
                "🔧 hint: the inventory file could not be read. Check `[source_config.File] file_name` \
                 (relative paths resolve against the working directory) and its permissions."
            );
        } else if is_source_parse_error(&err) {
            error!(
                "🔧 hint: the inventory file is not valid CSV for ivx. It needs a header row with \
                 id, sku, product_name, category, stock, price, last_updated."
            );
        }

        // 🗑️ Exit with prejudice. Process exitus maximus.
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    // 🔒 Use the config file only if it is actually there; otherwise env + defaults
    let config_file = args.config.as_path();
    let config_file = match config_file
        .try_exists()
        .with_context(|| format!("💀 Could not check whether '{}' exists", config_file.display()))?
    {
        true => Some(config_file),
        false => {
            info!(
                "📄 no config file at '{}', using IVX_* env vars and defaults",
                config_file.display()
            );
            None
        }
    };

    let app_config = ivx::app_config::load_config(config_file)
        .context("💀 In ivx-cli, main, we couldn't load the configuration")?;

    let store = InventoryStore::new();
    let mut source = SourceBackend::from_config(&app_config.source_config);
    let report = ivx::load_inventory(&app_config.runtime, &mut source, &store)
        .await
        .context("💀 Failed to load inventory")?;
    println!("{}", render_report(&report));

    let app = ivx::server::router(store, &app_config.server)?;
    let listener = ivx::server::bind(&app_config.server).await?;
    ivx::server::serve(listener, app).await
}

/// 🍽️ One comfy table summarizing the startup load.
fn render_report(report: &LoadReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["📦 read", "✅ published", "⚠️ rejected", "👷 workers", "🔢 generation", "⏱️ elapsed"]);
    table.add_row(vec![
        Cell::new(report.read).set_alignment(CellAlignment::Right),
        Cell::new(report.published).set_alignment(CellAlignment::Right),
        Cell::new(report.rejected).set_alignment(CellAlignment::Right),
        Cell::new(report.workers).set_alignment(CellAlignment::Right),
        Cell::new(report.generation).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2?}", report.elapsed)).set_alignment(CellAlignment::Right),
    ]);
    table
}

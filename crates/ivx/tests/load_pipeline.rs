//! 🧪 End to end through the public API: CSV on disk → pipeline → store → (concurrent) readers.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tempfile::NamedTempFile;

use ivx::app_config::{RuntimeConfig, SourceConfig};
use ivx::backends::{
    FileSourceConfig, InMemorySource, SourceBackend, is_source_parse_error, is_source_read_error,
};
use ivx::common::InventoryItem;
use ivx::store::InventoryStore;
use ivx::transforms::TransformKind;

const HEADER: &str = "id,sku,product_name,category,stock,price,last_updated\n";

fn csv_file(rows: &[String]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(HEADER.as_bytes())?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(file)
}

fn file_backend(file: &NamedTempFile) -> SourceBackend {
    SourceBackend::from_config(&SourceConfig::File(FileSourceConfig {
        file_name: file.path().display().to_string(),
    }))
}

fn runtime(worker_count: usize) -> RuntimeConfig {
    RuntimeConfig {
        worker_count,
        ..RuntimeConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn the_one_where_a_thousand_rows_arrive_exactly_once() -> Result<()> {
    let rows: Vec<String> = (0..1000)
        .map(|i| format!("{i},SKU-{i},Product {i},cat-{},{},{}.25,2024-01-01", i % 7, i % 50, i))
        .collect();
    let file = csv_file(&rows)?;
    let store = InventoryStore::new();

    let report = ivx::load_inventory(&runtime(8), &mut file_backend(&file), &store).await?;

    assert_eq!(report.read, 1000);
    assert_eq!(report.published, 1000);
    assert_eq!(report.workers, 8);
    let mut ids: Vec<u32> = store
        .snapshot()
        .await
        .iter()
        .map(|item| item.id.parse())
        .collect::<Result<_, _>>()?;
    ids.sort_unstable();
    assert_eq!(ids, (0..1000).collect::<Vec<u32>>(), "no loss, no duplicates");
    Ok(())
}

#[tokio::test]
async fn the_one_where_a_header_only_file_serves_nothing_without_deadlocking() -> Result<()> {
    let file = csv_file(&[])?;
    let store = InventoryStore::new();

    let report = ivx::load_inventory(&runtime(4), &mut file_backend(&file), &store).await?;

    assert_eq!(report.workers, 0);
    assert_eq!(report.generation, 1, "an empty set still counts as a publication");
    assert!(store.snapshot().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn the_one_where_a_zero_byte_file_stops_the_load_cold() -> Result<()> {
    let empty = NamedTempFile::new()?;
    let store = InventoryStore::new();

    let outcome = ivx::load_inventory(&runtime(4), &mut file_backend(&empty), &store).await;

    assert!(outcome.as_ref().err().is_some_and(is_source_parse_error));
    assert_eq!(store.generation().await, 0, "nothing published, nothing served");
    Ok(())
}

#[tokio::test]
async fn the_one_where_more_workers_than_rows_is_fine() -> Result<()> {
    let store = InventoryStore::new();
    let mut source = SourceBackend::InMemory(InMemorySource::new(vec![
        InventoryItem::sample("a", 1, 1.0),
        InventoryItem::sample("b", 2, 2.0),
    ]));

    let report = ivx::load_inventory(&runtime(16), &mut source, &store).await?;
    assert_eq!(report.workers, 2, "pool is capped at the record count");
    assert_eq!(store.snapshot().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn the_one_where_normalize_cleans_rows_from_disk() -> Result<()> {
    let file = csv_file(&[
        " 1 , sku-a ,  Widget ,tools,3,1.5,2024-01-01".to_string(),
        "2,sku-b,Gadget,tools,-1,1.5,2024-01-01".to_string(),
    ])?;
    let store = InventoryStore::new();
    let config = RuntimeConfig {
        worker_count: 2,
        transform: TransformKind::Normalize,
        ..RuntimeConfig::default()
    };

    let report = ivx::load_inventory(&config, &mut file_backend(&file), &store).await?;

    assert_eq!(report.rejected, 1);
    let published = store.snapshot().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].id, "1");
    assert_eq!(published[0].sku, "SKU-A");
    assert_eq!(published[0].product_name, "Widget");
    Ok(())
}

#[tokio::test]
async fn the_one_where_missing_and_malformed_files_fail_differently() -> Result<()> {
    let store = InventoryStore::new();

    let mut missing = SourceBackend::from_config(&SourceConfig::File(FileSourceConfig {
        file_name: "/this/path/does/not/exist.csv".into(),
    }));
    let read_failure = ivx::load_inventory(&runtime(2), &mut missing, &store).await.err();
    assert!(read_failure.as_ref().is_some_and(is_source_read_error));

    let file = csv_file(&["1,SKU,Widget,tools,many,1.5,2024-01-01".to_string()])?;
    let parse_failure = ivx::load_inventory(&runtime(2), &mut file_backend(&file), &store).await.err();
    assert!(parse_failure.as_ref().is_some_and(is_source_parse_error));
    assert!(!parse_failure.as_ref().is_some_and(is_source_read_error));

    assert_eq!(store.generation().await, 0, "failed loads publish nothing");
    Ok(())
}

/// 🧪 Readers keep snapshotting while loads keep publishing. Each load's rows
/// share one tag and declare the load's size, so any torn read is visible.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn the_one_where_readers_and_loads_overlap_without_tearing() -> Result<()> {
    let store = InventoryStore::new();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                while !done.load(Ordering::Acquire) {
                    let snapshot = store.snapshot().await;
                    if let Some(first) = snapshot.first() {
                        let declared = usize::try_from(first.stock).unwrap_or(usize::MAX);
                        assert_eq!(snapshot.len(), declared, "torn read");
                        assert!(snapshot.iter().all(|item| item.category == first.category));
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for round in 1..=30usize {
        let size = round * 3;
        let rows = (0..size)
            .map(|i| {
                let mut item = InventoryItem::sample(format!("{round}-{i}"), size as i64, 1.0);
                item.category = format!("round-{round}");
                item
            })
            .collect();
        let mut source = SourceBackend::InMemory(InMemorySource::new(rows));
        let report = ivx::load_inventory(&runtime(3), &mut source, &store).await?;
        assert_eq!(report.published, size);
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.await?;
    }
    assert_eq!(store.generation().await, 30);
    Ok(())
}

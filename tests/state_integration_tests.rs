//! Integration tests for InventoryManager and the presentation thread
//!
//! These tests verify that:
//! - Inventory changes are broadcast to subscribers
//! - Concurrent producers funnel every update through the single presentation writer
//! - Updates for the same row are applied one at a time

use modinv::models::ModRecord;
use modinv::presentation::{ModRow, ModsView, PresentationBridge};
use modinv::services::RowUpdate;
use modinv::{InventoryChange, InventoryManager};
use std::sync::Arc;
use std::thread;
use tokio::time::{Duration, timeout};

fn row(key: &str) -> ModRow {
    ModRow {
        key: key.to_string(),
        enabled: true,
        name: String::new(),
        version: String::new(),
    }
}

fn update(index: usize, version: &str) -> RowUpdate {
    RowUpdate {
        row_key: format!("mods/mod{}.jar", index),
        file: format!("mod{}.jar", index),
        name: format!("Mod {}", index),
        version: version.to_string(),
        internal_metadata: Vec::new(),
        failed: false,
    }
}

#[tokio::test]
async fn test_pass_events_emitted() {
    let inventory = InventoryManager::new();
    let mut rx = inventory.subscribe();

    inventory.start_pass(vec![("mods/mod0.jar".to_string(), ModRecord::new("mod0.jar", "", ""))], 1);
    inventory.record_enrichment(&update(0, "1.0"));
    inventory.finish_pass();

    let started = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");
    assert_eq!(started, InventoryChange::PassStarted { total_rows: 1 });

    let enriched = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");
    assert!(matches!(enriched, InventoryChange::RowEnriched { ref row_key, .. } if row_key == "mods/mod0.jar"));

    let finished = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");
    assert_eq!(finished, InventoryChange::PassFinished { enriched: 1, failed: 0 });
}

#[test]
fn test_concurrent_producers_single_writer() {
    const ROWS: usize = 50;
    const PRODUCERS: usize = 8;

    let inventory = InventoryManager::new();
    let bridge = PresentationBridge::spawn(ModsView::new(inventory.clone())).unwrap();

    let rows = (0..ROWS).map(|i| row(&format!("mods/mod{}.jar", i))).collect();
    let records = (0..ROWS)
        .map(|i| (format!("mods/mod{}.jar", i), ModRecord::new(format!("mod{}.jar", i), "", "")))
        .collect();
    bridge.dispatch(move |view| view.begin_pass(rows, records));

    let handle = Arc::new(bridge.handle());
    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for i in 0..ROWS {
                    let update = update(i, &format!("{}", producer));
                    handle.dispatch(move |view| view.apply_update(update));
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    bridge.dispatch(ModsView::finish_pass);
    let view = bridge.shutdown().unwrap();

    assert_eq!(view.updates_applied(), ROWS * PRODUCERS);
    assert_eq!(view.table().len(), ROWS);

    let state = inventory.snapshot();
    assert!(!state.pass_in_progress);
    assert_eq!(state.enriched_rows, ROWS * PRODUCERS);

    // Every row holds one producer's complete value, never a mix
    for i in 0..ROWS {
        let row = view.table().row(&format!("mods/mod{}.jar", i)).unwrap();
        let record = &state.records[&format!("mods/mod{}.jar", i)];
        assert_eq!(row.name, format!("Mod {}", i));
        assert_eq!(row.version, record.version);
    }
}

#[tokio::test]
async fn test_query_sees_applied_updates() {
    let bridge = PresentationBridge::spawn(ModsView::new(InventoryManager::new())).unwrap();
    let handle = bridge.handle();

    handle.dispatch(|view| {
        view.begin_pass(
            vec![row("mods/mod1.jar")],
            vec![("mods/mod1.jar".to_string(), ModRecord::new("mod1.jar", "", ""))],
        )
    });
    handle.dispatch(|view| view.apply_update(update(1, "3.0")));

    let version = handle
        .query(|view| view.table().row("mods/mod1.jar").map(|r| r.version.clone()))
        .await
        .flatten();

    assert_eq!(version.as_deref(), Some("3.0"));
    bridge.shutdown().unwrap();
}

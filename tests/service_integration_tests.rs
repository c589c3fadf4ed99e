//! Integration tests for the scanner, reconciler and enrichment pool
//!
//! These tests verify:
//! - Scanning and reconciliation over real directories
//! - Enrichment of real mod archives through the bounded pool
//! - Failure isolation for corrupt archives
//! - The worker bound under many submissions

use camino::{Utf8Path, Utf8PathBuf};
use modinv::Metrics;
use modinv::models::ModRecord;
use modinv::services::{
    EnrichmentPool, MetadataReader, ModReconciler, RowUpdate, scan_mod_paths,
};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tempfile::TempDir;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn create_instance_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    fs::create_dir_all(root.join("mods")).unwrap();
    (temp_dir, root)
}

fn write_jar(path: &Utf8Path, entries: &[(&str, &str)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn fabric_jar(path: &Utf8Path, name: &str, version: &str) {
    let descriptor = format!(r#"{{"id":"x","name":"{}","version":"{}"}}"#, name, version);
    write_jar(path, &[("fabric.mod.json", descriptor.as_str())]);
}

/// Submit every reconciled pair and collect all published updates
async fn enrich_all(
    root: &Utf8Path,
    workers: usize,
    records: &[ModRecord],
    metrics: Arc<Metrics>,
) -> (Vec<RowUpdate>, modinv::services::EnrichmentSummary) {
    let paths = scan_mod_paths(&[root.join("mods")]);
    let pairs = ModReconciler::default().reconcile(&paths, records);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut pool = EnrichmentPool::new(
        Handle::current(),
        workers,
        Arc::new(MetadataReader::default()),
        tx,
        metrics,
    );

    for pair in pairs {
        let key = pair.entry.relative_to(root);
        pool.submit(key, pair).unwrap();
    }

    let summary = pool.shutdown().wait().await;

    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }

    (updates, summary)
}

#[test]
fn test_reconcile_real_directory() {
    let (_temp_dir, root) = create_instance_dir();
    fs::write(root.join("mods").join("known.jar"), b"").unwrap();
    fs::write(root.join("mods").join("other.jar.disabled"), b"").unwrap();

    let paths = scan_mod_paths(&[root.join("mods")]);
    let pairs = ModReconciler::default().reconcile(&paths, &[ModRecord::new("known.jar", "Known", "1.0")]);

    assert_eq!(pairs.len(), 2);
    for pair in &pairs {
        assert_eq!(pair.record.file, pair.entry.file_name());
    }

    let other = pairs.iter().find(|p| p.record.file == "other.jar.disabled").unwrap();
    assert!(other.record.disabled);
    assert!(other.record.user_added);

    let known = pairs.iter().find(|p| p.record.file == "known.jar").unwrap();
    assert_eq!(known.record.name, "Known");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_enrichment_reads_archives() {
    let (_temp_dir, root) = create_instance_dir();
    fabric_jar(&root.join("mods").join("sodium.jar"), "Sodium", "0.5.8");
    write_jar(
        &root.join("mods").join("jei.jar"),
        &[(
            "META-INF/mods.toml",
            "[[mods]]\nmodId=\"jei\"\ndisplayName=\"Just Enough Items\"\nversion=\"15.2\"\n",
        )],
    );

    let (updates, summary) = enrich_all(&root, 2, &[], Arc::new(Metrics::new())).await;

    assert_eq!(summary.enriched, 2);
    assert_eq!(summary.failed, 0);

    let by_key: HashMap<_, _> = updates.iter().map(|u| (u.row_key.as_str(), u)).collect();
    assert_eq!(by_key["mods/sodium.jar"].name, "Sodium");
    assert_eq!(by_key["mods/sodium.jar"].version, "0.5.8");
    assert_eq!(by_key["mods/jei.jar"].name, "Just Enough Items");
    assert!(!by_key["mods/jei.jar"].internal_metadata.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_corrupt_archive_does_not_stop_siblings() {
    let (_temp_dir, root) = create_instance_dir();
    fs::write(root.join("mods").join("broken-1.4.jar"), b"this is not a zip file").unwrap();
    for i in 0..5 {
        fabric_jar(&root.join("mods").join(format!("good{}.jar", i)), &format!("Good {}", i), "1.0");
    }

    let (updates, summary) = enrich_all(&root, 2, &[], Arc::new(Metrics::new())).await;

    assert_eq!(updates.len(), 6);
    assert_eq!(summary.enriched, 5);
    assert_eq!(summary.failed, 1);

    let broken = updates.iter().find(|u| u.row_key == "mods/broken-1.4.jar").unwrap();
    assert!(broken.failed);
    assert_eq!(broken.name, "broken");
    assert_eq!(broken.version, "1.4");
}

#[tokio::test]
async fn test_zero_files_completes_immediately() {
    let (_temp_dir, root) = create_instance_dir();

    let (updates, summary) = enrich_all(&root, 4, &[], Arc::new(Metrics::new())).await;

    assert!(updates.is_empty());
    assert_eq!(summary.enriched + summary.failed, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_hundred_unknown_files_all_enriched() {
    let (_temp_dir, root) = create_instance_dir();
    for i in 0..100 {
        fabric_jar(&root.join("mods").join(format!("mod{:03}.jar", i)), &format!("Mod {}", i), "2.0");
    }

    let metrics = Arc::new(Metrics::new());
    let (updates, summary) = enrich_all(&root, 3, &[], Arc::clone(&metrics)).await;

    assert_eq!(updates.len(), 100);
    assert_eq!(summary.enriched, 100);
    assert!(updates.iter().all(|u| !u.failed && u.version == "2.0"));

    // Exactly one update per row
    let mut keys: Vec<_> = updates.iter().map(|u| u.row_key.clone()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 100);

    // Never more concurrent tasks than workers
    assert!(metrics.peak_in_flight.load(Ordering::SeqCst) <= 3);
    assert_eq!(metrics.tasks_in_flight.load(Ordering::SeqCst), 0);
    assert_eq!(metrics.tasks_submitted.load(Ordering::SeqCst), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_known_records_keep_stored_values_without_descriptor() {
    let (_temp_dir, root) = create_instance_dir();
    write_jar(&root.join("mods").join("plain.jar"), &[("assets/readme.txt", "hi")]);

    let records = vec![ModRecord::new("plain.jar", "Plain Mod", "7.1")];
    let (updates, summary) = enrich_all(&root, 1, &records, Arc::new(Metrics::new())).await;

    assert_eq!(summary.enriched, 1);
    assert_eq!(updates[0].name, "Plain Mod");
    assert_eq!(updates[0].version, "7.1");
}

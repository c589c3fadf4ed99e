//! modinv - Mod inventory for a launcher instance
//!
//! Main entry point. Usage: `modinv <instance-dir> [config-dir]`
//!
//! # Overview
//!
//! The binary runs one reconciliation pass over an instance and prints the
//! mods table once every row has been enriched. It initializes:
//! - Settings ([`ConfigManager`], `modinv.yaml` + `MODINV_*` variables)
//! - Logging infrastructure (file rotation + console output)
//! - Tokio runtime for the enrichment pool
//! - The presentation thread ([`PresentationBridge`]) owning the [`ModsView`]
//!
//! # Threading
//!
//! - **Main thread**: drives the pass and prints the result
//! - **Tokio workers**: blocking archive reads, bounded by `enrichment_workers`
//! - **Presentation thread**: applies initial rows and updates serially

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use modinv::presentation::ModsView;
use modinv::{
    APP_NAME, ConfigManager, FsInstance, InventoryManager, Metrics,
    ModsController, PresentationBridge, VERSION,
};
use std::sync::Arc;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(instance_dir) = args.next() else {
        bail!("Usage: {} <instance-dir> [config-dir]", APP_NAME);
    };
    let config_dir = args.next().unwrap_or_else(|| "config".to_string());

    let config_manager = ConfigManager::new(&config_dir)?;
    let settings = config_manager.load_settings()?;

    let _log_guard = modinv::logging::setup_logging(
        &Utf8PathBuf::from(&settings.log_dir),
        APP_NAME,
        settings.debug_mode,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("modinv-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    let instance = FsInstance::load(&instance_dir)
        .with_context(|| format!("Failed to load instance {}", instance_dir))?;

    let metrics = Arc::new(Metrics::new());
    let inventory = InventoryManager::new();
    let bridge = PresentationBridge::spawn(ModsView::new(inventory))?;

    let controller = ModsController::new(
        settings,
        bridge.handle(),
        runtime.handle().clone(),
        Arc::clone(&metrics),
    );

    let summary = runtime.block_on(controller.run_pass(&instance))?;

    let view = bridge.shutdown()?;
    print_table(&view);

    println!(
        "\n{} mods ({} without a record), {} enriched, {} using file name fallbacks",
        summary.files, summary.synthesized, summary.enriched, summary.failed
    );

    metrics.log_summary();

    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_table(view: &ModsView) {
    let rows: Vec<_> = view.table().rows().collect();
    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);
    let version_width = rows.iter().map(|r| r.version.len()).max().unwrap_or(0).max(7);

    println!(
        "{:<8} {:<name_width$} {:<version_width$} {}",
        "Enabled", "Name", "Version", "File"
    );

    for row in rows {
        println!(
            "{:<8} {:<name_width$} {:<version_width$} {}",
            if row.enabled { "yes" } else { "no" },
            row.name,
            row.version,
            row.key
        );
    }
}

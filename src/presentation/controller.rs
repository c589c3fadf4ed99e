// ModsController - runs one reconciliation pass for the mods view
//
// Flow of a pass:
// 1. Scan the instance's mod directories
// 2. Reconcile files against the instance's records
// 3. Dispatch the initial rows to the presentation thread
// 4. Submit every pair to the enrichment pool, then shut the pool down
// 5. Forward each RowUpdate from the update channel to the presentation thread
// 6. Mark the pass finished once every task has completed

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::bridge::PresentationHandle;
use super::table::ModRow;
use super::view::ModsView;
use crate::metrics::Metrics;
use crate::models::{Instance, Settings};
use crate::services::{EnrichmentPool, MetadataReader, ModReconciler, RowUpdate};

/// Outcome of one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Files found on disk
    pub files: usize,

    /// Files with no record that got a placeholder
    pub synthesized: usize,

    pub enriched: usize,
    pub failed: usize,
}

/// Wires the scanner, reconciler and enrichment pool to the presentation thread.
pub struct ModsController {
    settings: Settings,
    view: PresentationHandle<ModsView>,
    runtime: Handle,
    reconciler: ModReconciler,
    reader: Arc<MetadataReader>,
    metrics: Arc<Metrics>,
}

impl ModsController {
    pub fn new(
        settings: Settings,
        view: PresentationHandle<ModsView>,
        runtime: Handle,
        metrics: Arc<Metrics>,
    ) -> Self {
        let reconciler = ModReconciler::new(settings.disabled_suffix.clone());
        let reader = Arc::new(MetadataReader::new(settings.disabled_suffix.clone()));

        Self {
            settings,
            view,
            runtime,
            reconciler,
            reader,
            metrics,
        }
    }

    /// Directories of `instance` that hold regular mods
    pub fn mod_directories(&self, instance: &dyn Instance) -> Vec<Utf8PathBuf> {
        let root = instance.root();
        self.settings
            .mod_directories
            .iter()
            .map(|dir| root.join(dir))
            .collect()
    }

    /// Run a full pass for `instance`.
    ///
    /// Resolves after every enrichment result has been queued to the
    /// presentation thread, followed by the end-of-pass marker.
    pub async fn run_pass(&self, instance: &dyn Instance) -> Result<PassSummary> {
        let root = instance.root();
        let dirs = self.mod_directories(instance);

        tracing::info!("Starting mod reconciliation for {}", root);

        let paths = instance.mod_paths_from_filesystem(&dirs);
        self.metrics.record_files_scanned(paths.len());

        let records = instance.mods();
        let (pairs, synthesized) = self.reconciler.reconcile_counted(&paths, &records);
        self.metrics.record_synthesized(synthesized);

        tracing::info!(
            "Reconciled {} files against {} records ({} synthesized)",
            pairs.len(),
            records.len(),
            synthesized
        );

        let rows: Vec<ModRow> = pairs.iter().map(|pair| ModRow::from_pair(pair, &root)).collect();
        let pass_records = rows
            .iter()
            .zip(&pairs)
            .map(|(row, pair)| (row.key.clone(), pair.record.clone()))
            .collect();
        self.view.dispatch(move |view| view.begin_pass(rows, pass_records));
        self.metrics.record_update_dispatched();

        let (update_tx, update_rx) = mpsc::unbounded_channel::<RowUpdate>();
        let forwarder = self.runtime.spawn(Self::forward_updates(
            update_rx,
            self.view.clone(),
            Arc::clone(&self.metrics),
        ));

        let mut pool = EnrichmentPool::new(
            self.runtime.clone(),
            self.settings.enrichment_workers,
            Arc::clone(&self.reader),
            update_tx,
            Arc::clone(&self.metrics),
        );

        let files = pairs.len();
        for pair in pairs {
            let row_key = pair.entry.relative_to(&root);
            pool.submit(row_key, pair)
                .context("Failed to submit enrichment task")?;
        }

        let run = pool.shutdown();
        tracing::debug!("Submitted {} enrichment tasks", run.len());

        let outcome = run.wait().await;

        // Every sender is gone once the tasks are done, so this ends promptly
        let forwarded = forwarder.await.context("Update forwarder failed")?;
        tracing::debug!("Forwarded {} updates to the presentation thread", forwarded);

        self.view.dispatch(ModsView::finish_pass);
        self.metrics.record_update_dispatched();

        let summary = PassSummary {
            files,
            synthesized,
            enriched: outcome.enriched,
            failed: outcome.failed,
        };

        tracing::info!(
            "Mod reconciliation completed: {} files, {} enriched, {} fell back",
            summary.files,
            summary.enriched,
            summary.failed
        );

        Ok(summary)
    }

    /// Single consumer of the update channel; marshals each result onto the
    /// presentation thread's queue.
    async fn forward_updates(
        mut updates: mpsc::UnboundedReceiver<RowUpdate>,
        view: PresentationHandle<ModsView>,
        metrics: Arc<Metrics>,
    ) -> usize {
        let mut forwarded = 0;

        while let Some(update) = updates.recv().await {
            view.dispatch(move |view| view.apply_update(update));
            metrics.record_update_dispatched();
            forwarded += 1;
        }

        forwarded
    }
}

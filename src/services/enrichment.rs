use camino::Utf8PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;

use crate::metrics::Metrics;
use crate::models::{InternalModMetadata, ReconciledPair};
use crate::services::metadata::MetadataReader;

/// Result of enriching one row, published to the presentation layer.
///
/// Workers only ever produce these; applying them to display state and to the
/// mod collection is the presentation thread's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpdate {
    /// Path relative to the instance root; identifies the row
    pub row_key: String,

    /// File name of the record the row shows
    pub file: String,

    pub name: String,
    pub version: String,

    /// Descriptors read for this file, or the record's existing ones
    pub internal_metadata: Vec<InternalModMetadata>,

    /// True when the archive could not be read and file name values were used
    pub failed: bool,
}

/// Errors that can occur when submitting enrichment work
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("Enrichment pool has been shut down")]
    PoolShutDown,
}

/// Totals for one finished pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub enriched: usize,
    pub failed: usize,
}

/// Bounded pool that reads archive metadata off the presentation thread.
///
/// Each submitted pair becomes one task. Tasks wait on a semaphore with
/// `workers` permits before touching the filesystem, so the number of open
/// files is bounded no matter how many pairs are submitted. Results go out on
/// the update channel given at construction; there is no ordering between
/// tasks.
pub struct EnrichmentPool {
    handle: Handle,
    reader: Arc<MetadataReader>,
    permits: Arc<Semaphore>,
    updates: Option<mpsc::UnboundedSender<RowUpdate>>,
    tasks: Vec<JoinHandle<bool>>,
    metrics: Arc<Metrics>,
}

impl EnrichmentPool {
    /// Create a pool with `workers` concurrent tasks (at least one).
    pub fn new(
        handle: Handle,
        workers: usize,
        reader: Arc<MetadataReader>,
        updates: mpsc::UnboundedSender<RowUpdate>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let workers = workers.max(1);
        tracing::debug!("Enrichment pool created with {} workers", workers);

        Self {
            handle,
            reader,
            permits: Arc::new(Semaphore::new(workers)),
            updates: Some(updates),
            tasks: Vec::new(),
            metrics,
        }
    }

    /// Schedule enrichment of one reconciled pair shown under `row_key`.
    pub fn submit(&mut self, row_key: String, pair: ReconciledPair) -> Result<(), EnrichmentError> {
        let updates = self.updates.clone().ok_or(EnrichmentError::PoolShutDown)?;
        let reader = Arc::clone(&self.reader);
        let permits = Arc::clone(&self.permits);
        let metrics = Arc::clone(&self.metrics);

        self.metrics.record_task_submitted();

        let task = self.handle.spawn(async move {
            // The semaphore is never closed, so acquiring only fails if that changes
            let Ok(_permit) = permits.acquire_owned().await else {
                tracing::error!("Worker permits closed before {} was enriched", row_key);
                return false;
            };

            let pair = Arc::new(pair);
            let work = {
                let reader = Arc::clone(&reader);
                let pair = Arc::clone(&pair);
                let row_key = row_key.clone();
                move || enrich_pair(&reader, row_key, &pair)
            };
            let fallback = move || fallback_update(&reader, row_key, &pair);

            publish_result(work, fallback, &updates, &metrics).await
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Stop accepting work.
    ///
    /// Tasks already submitted keep running; the returned [`EnrichmentRun`]
    /// resolves once they have all finished. The pool drops its handle on the
    /// update channel so the receiver closes after the last task publishes.
    pub fn shutdown(&mut self) -> EnrichmentRun {
        self.updates = None;
        let tasks = std::mem::take(&mut self.tasks);
        tracing::debug!("Enrichment pool shut down with {} tasks in flight", tasks.len());
        EnrichmentRun { tasks }
    }

    pub fn is_shut_down(&self) -> bool {
        self.updates.is_none()
    }
}

/// Tasks of one pass that were submitted before shutdown.
#[must_use = "an EnrichmentRun does nothing unless waited on"]
pub struct EnrichmentRun {
    tasks: Vec<JoinHandle<bool>>,
}

impl EnrichmentRun {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task to finish.
    pub async fn wait(self) -> EnrichmentSummary {
        let mut summary = EnrichmentSummary::default();

        for task in self.tasks {
            match task.await {
                Ok(true) => summary.enriched += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

/// Run `work` on the blocking pool and send exactly one update for it.
///
/// If `work` panics, the update built by `fallback` is sent instead. Returns
/// whether the row was enriched.
async fn publish_result<W, F>(
    work: W,
    fallback: F,
    updates: &mpsc::UnboundedSender<RowUpdate>,
    metrics: &Metrics,
) -> bool
where
    W: FnOnce() -> RowUpdate + Send + 'static,
    F: FnOnce() -> RowUpdate,
{
    metrics.record_task_started();
    let started = Instant::now();

    let update = match tokio::task::spawn_blocking(work).await {
        Ok(update) => update,
        Err(e) => {
            let update = fallback();
            tracing::error!("Enrichment task for {} panicked: {}", update.row_key, e);
            update
        }
    };

    let enriched = !update.failed;
    metrics.record_task_finished(enriched, started.elapsed());

    let key = update.row_key.clone();
    if updates.send(update).is_err() {
        tracing::warn!("Update channel closed - dropping enrichment result for {}", key);
    }

    enriched
}

/// File name derived values for a row whose enrichment did not complete
pub fn fallback_update(reader: &MetadataReader, row_key: String, pair: &ReconciledPair) -> RowUpdate {
    let path = pair.entry.path();

    RowUpdate {
        row_key,
        file: pair.record.file.clone(),
        name: reader.name_from_file(&pair.record, &[], path),
        version: reader.version_from_file(&pair.record, &[], path),
        internal_metadata: Vec::new(),
        failed: true,
    }
}

/// Read metadata for one pair and derive its display values.
///
/// Records that already carry metadata are not reopened. Read failures are
/// logged and produce the file name fallbacks with `failed` set.
pub fn enrich_pair(reader: &MetadataReader, row_key: String, pair: &ReconciledPair) -> RowUpdate {
    let path: Utf8PathBuf = pair.entry.path().to_path_buf();

    let (internal_metadata, failed) = if pair.record.has_internal_metadata() {
        (pair.record.internal_metadata.clone(), false)
    } else {
        match reader.scan_internal_metadata(&path) {
            Ok(metadata) => (metadata, false),
            Err(e) => {
                tracing::warn!("Failed to scan internal mod metadata for {}: {}", path, e);
                (Vec::new(), true)
            }
        }
    };

    let name = reader.name_from_file(&pair.record, &internal_metadata, &path);
    let version = reader.version_from_file(&pair.record, &internal_metadata, &path);

    tracing::trace!("Enriched {} -> {} {}", row_key, name, version);

    RowUpdate {
        row_key,
        file: pair.record.file.clone(),
        name,
        version,
        internal_metadata,
        failed,
    }
}

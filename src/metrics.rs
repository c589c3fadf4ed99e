// Performance metrics module
//
// Lightweight counters for one or more reconciliation passes

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for scanning, reconciliation and enrichment.
///
/// Uses atomic operations so worker tasks can record without locks. Shared as
/// `Arc<Metrics>` between the controller, the enrichment pool and the
/// presentation thread.
#[derive(Debug)]
pub struct Metrics {
    /// Files returned by the directory scanner
    pub files_scanned: AtomicUsize,

    /// Placeholder records created for files with no known record
    pub records_synthesized: AtomicUsize,

    /// Enrichment tasks accepted by the pool
    pub tasks_submitted: AtomicUsize,

    /// Tasks that read metadata (or reused existing metadata) successfully
    pub rows_enriched: AtomicUsize,

    /// Tasks that fell back to file name values
    pub rows_failed: AtomicUsize,

    /// Tasks currently holding a worker permit
    pub tasks_in_flight: AtomicUsize,

    /// Highest observed value of `tasks_in_flight`
    pub peak_in_flight: AtomicUsize,

    /// Total time spent inside enrichment tasks in milliseconds
    pub total_enrichment_time_ms: AtomicU64,

    /// Closures dispatched to the presentation thread
    pub updates_dispatched: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            files_scanned: AtomicUsize::new(0),
            records_synthesized: AtomicUsize::new(0),
            tasks_submitted: AtomicUsize::new(0),
            rows_enriched: AtomicUsize::new(0),
            rows_failed: AtomicUsize::new(0),
            tasks_in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            total_enrichment_time_ms: AtomicU64::new(0),
            updates_dispatched: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_files_scanned(&self, count: usize) {
        self.files_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_synthesized(&self, count: usize) {
        self.records_synthesized.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_task_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark a task as holding a worker permit
    pub fn record_task_started(&self) {
        let now = self.tasks_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    /// Mark a task as done, successful or not
    pub fn record_task_finished(&self, enriched: bool, duration: Duration) {
        self.tasks_in_flight.fetch_sub(1, Ordering::SeqCst);
        if enriched {
            self.rows_enriched.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rows_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.total_enrichment_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_update_dispatched(&self) {
        self.updates_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average time per finished enrichment task in milliseconds
    pub fn avg_enrichment_time_ms(&self) -> f64 {
        let total = self.total_enrichment_time_ms.load(Ordering::Relaxed);
        let count = self.rows_enriched.load(Ordering::Relaxed) + self.rows_failed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Mod Inventory Metrics ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Files: {} scanned, {} synthesized records",
            self.files_scanned.load(Ordering::Relaxed),
            self.records_synthesized.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Enrichment: {} submitted, {} enriched, {} fell back (peak workers: {}, avg: {:.2}ms)",
            self.tasks_submitted.load(Ordering::Relaxed),
            self.rows_enriched.load(Ordering::Relaxed),
            self.rows_failed.load(Ordering::Relaxed),
            self.peak_in_flight.load(Ordering::Relaxed),
            self.avg_enrichment_time_ms()
        );
        tracing::info!(
            "Presentation updates dispatched: {}",
            self.updates_dispatched.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.files_scanned.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.peak_in_flight.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_in_flight_tracking() {
        let metrics = Metrics::new();

        metrics.record_task_started();
        metrics.record_task_started();
        metrics.record_task_finished(true, Duration::from_millis(100));
        metrics.record_task_started();
        metrics.record_task_finished(false, Duration::from_millis(200));
        metrics.record_task_finished(true, Duration::from_millis(0));

        assert_eq!(metrics.tasks_in_flight.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.peak_in_flight.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.rows_enriched.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.rows_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.avg_enrichment_time_ms(), 100.0);
    }

    #[test]
    fn test_avg_time_without_tasks() {
        let metrics = Metrics::new();
        assert_eq!(metrics.avg_enrichment_time_ms(), 0.0);
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}

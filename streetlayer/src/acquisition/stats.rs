//! Run-wide acquisition statistics.
//!
//! Workers update these counters concurrently; the orchestrator reads a
//! snapshot for progress logging and the final summary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Thread-safe acquisition counters.
///
/// # Example
///
/// ```
/// use streetlayer::acquisition::AcquisitionStats;
///
/// let stats = AcquisitionStats::new();
/// stats.record_metadata_lookup();
/// stats.record_download(48_213);
///
/// let snapshot = stats.snapshot();
/// assert_eq!(snapshot.images_downloaded, 1);
/// ```
pub struct AcquisitionStats {
    metadata_lookups: AtomicU64,
    images_downloaded: AtomicU64,
    bytes_downloaded: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
    duplicates_skipped: AtomicU64,
    budget_skipped: AtomicU64,
    already_acquired: AtomicU64,
    started: Instant,
}

/// Snapshot of acquisition statistics at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionStatsSnapshot {
    /// Metadata requests issued (including retries)
    pub metadata_lookups: u64,
    /// Images written to disk
    pub images_downloaded: u64,
    /// Total bytes of written images
    pub bytes_downloaded: u64,
    /// Retry attempts after transient errors
    pub retries: u64,
    /// Candidates that ended in a failure
    pub failures: u64,
    /// Candidates skipped because their coordinates were already on disk
    pub duplicates_skipped: u64,
    /// Candidates skipped for lack of budget
    pub budget_skipped: u64,
    /// Candidates whose resolved image was already acquired in this run
    pub already_acquired: u64,
    /// Seconds since the stats were created
    pub elapsed_secs: f64,
}

impl AcquisitionStatsSnapshot {
    /// Average download rate in bytes per second over the whole run.
    pub fn avg_bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.bytes_downloaded as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

impl AcquisitionStats {
    pub fn new() -> Self {
        Self {
            metadata_lookups: AtomicU64::new(0),
            images_downloaded: AtomicU64::new(0),
            bytes_downloaded: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            duplicates_skipped: AtomicU64::new(0),
            budget_skipped: AtomicU64::new(0),
            already_acquired: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn record_metadata_lookup(&self) {
        self.metadata_lookups.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an image written to disk.
    pub fn record_download(&self, bytes: usize) {
        self.bytes_downloaded
            .fetch_add(bytes as u64, Ordering::Relaxed);
        self.images_downloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_budget_skip(&self) {
        self.budget_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_already_acquired(&self) {
        self.already_acquired.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> AcquisitionStatsSnapshot {
        AcquisitionStatsSnapshot {
            metadata_lookups: self.metadata_lookups.load(Ordering::Relaxed),
            images_downloaded: self.images_downloaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            budget_skipped: self.budget_skipped.load(Ordering::Relaxed),
            already_acquired: self.already_acquired.load(Ordering::Relaxed),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl Default for AcquisitionStats {
    fn default() -> Self {
        Self::new()
    }
}

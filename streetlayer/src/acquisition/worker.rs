//! Single-candidate acquisition.

use super::result::{AcquiredImage, AcquisitionResult, FailureReason, SkipReason};
use super::stats::AcquisitionStats;
use crate::budget::BudgetTracker;
use crate::coord::{image_filename, CandidatePoint};
use crate::dedup::ExistingCoordinateSet;
use crate::provider::{ImageryProvider, PanoramaLookup, ProviderError};
use dashmap::DashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default number of attempts per candidate.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default wait between attempts after a transient error.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Prefix for images being written. Never parses as a coordinate.
const PARTIAL_PREFIX: &str = "partial-";

/// How a worker retries transient provider errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts in total, including the first
    pub max_attempts: u32,
    /// Fixed wait before each retry
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Retries without waiting.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BACKOFF)
    }
}

enum Attempt {
    Downloaded(AcquiredImage),
    NoPanorama(String),
    AlreadyAcquired(String),
}

enum AttemptError {
    Provider(ProviderError),
    Io(io::Error),
}

impl From<ProviderError> for AttemptError {
    fn from(e: ProviderError) -> Self {
        AttemptError::Provider(e)
    }
}

/// Acquires the image for one candidate point.
///
/// Shared by all tasks of a run. Filenames claimed during the run are
/// tracked so two candidates resolving to the same panorama and heading
/// download it once.
pub struct AcquisitionWorker<P: ImageryProvider> {
    provider: Arc<P>,
    budget: Arc<BudgetTracker>,
    existing: Arc<ExistingCoordinateSet>,
    claimed: DashSet<String>,
    save_dir: PathBuf,
    retry: RetryPolicy,
    stats: Arc<AcquisitionStats>,
}

impl<P: ImageryProvider> AcquisitionWorker<P> {
    pub fn new(
        provider: Arc<P>,
        budget: Arc<BudgetTracker>,
        existing: Arc<ExistingCoordinateSet>,
        save_dir: impl Into<PathBuf>,
        retry: RetryPolicy,
        stats: Arc<AcquisitionStats>,
    ) -> Self {
        Self {
            provider,
            budget,
            existing,
            claimed: DashSet::new(),
            save_dir: save_dir.into(),
            retry,
            stats,
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Processes one candidate.
    ///
    /// Never returns an error: every outcome is an [`AcquisitionResult`].
    /// Budget is spent only on `Success`.
    pub async fn acquire(&self, point: CandidatePoint) -> AcquisitionResult {
        if self.existing.contains(point.lat, point.lon) {
            trace!(lat = point.lat, lon = point.lon, "Coordinates already on disk");
            self.stats.record_duplicate();
            return AcquisitionResult::Skipped(SkipReason::Duplicate);
        }

        let Some(reservation) = self.budget.try_reserve() else {
            self.stats.record_budget_skip();
            return AcquisitionResult::Skipped(SkipReason::BudgetExhausted);
        };

        let mut attempt = 1;
        loop {
            match self.attempt(&point).await {
                Ok(Attempt::Downloaded(image)) => {
                    reservation.commit();
                    self.stats.record_download(image.bytes);
                    debug!(
                        file = %image.filename,
                        panorama = %image.panorama_id,
                        bytes = image.bytes,
                        "Image acquired"
                    );
                    return AcquisitionResult::Success(image);
                }
                Ok(Attempt::NoPanorama(status)) => {
                    self.stats.record_failure();
                    return AcquisitionResult::Failure(FailureReason::NoPanorama { status });
                }
                Ok(Attempt::AlreadyAcquired(filename)) => {
                    trace!(file = %filename, "Resolved image already acquired");
                    self.stats.record_already_acquired();
                    return AcquisitionResult::Skipped(SkipReason::AlreadyAcquired);
                }
                Err(AttemptError::Provider(e)) if e.is_transient() => {
                    if attempt >= self.retry.max_attempts {
                        warn!(
                            lat = point.lat,
                            lon = point.lon,
                            attempts = attempt,
                            error = %e,
                            "Giving up on candidate"
                        );
                        self.stats.record_failure();
                        return AcquisitionResult::Failure(FailureReason::RetriesExhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                    debug!(
                        lat = point.lat,
                        lon = point.lon,
                        attempt,
                        error = %e,
                        backoff_ms = self.retry.backoff.as_millis() as u64,
                        "Transient provider error, retrying"
                    );
                    self.stats.record_retry();
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Err(AttemptError::Provider(e)) => {
                    warn!(lat = point.lat, lon = point.lon, error = %e, "Provider rejected request");
                    self.stats.record_failure();
                    return AcquisitionResult::Failure(FailureReason::Provider(e));
                }
                Err(AttemptError::Io(e)) => {
                    warn!(lat = point.lat, lon = point.lon, error = %e, "Failed to write image");
                    self.stats.record_failure();
                    return AcquisitionResult::Failure(FailureReason::Io(e.to_string()));
                }
            }
        }
    }

    async fn attempt(&self, point: &CandidatePoint) -> Result<Attempt, AttemptError> {
        self.stats.record_metadata_lookup();
        let metadata = match self.provider.lookup_metadata(point).await? {
            PanoramaLookup::Available(metadata) => metadata,
            PanoramaLookup::Unavailable { status } => return Ok(Attempt::NoPanorama(status)),
        };

        let filename = image_filename(metadata.lat, metadata.lon, point.heading);
        let path = self.save_dir.join(&filename);
        if !self.claimed.insert(filename.clone()) || path.exists() {
            return Ok(Attempt::AlreadyAcquired(filename));
        }

        let written = match self.provider.fetch_image(point).await {
            Ok(bytes) => write_image(&self.save_dir, &filename, &bytes)
                .await
                .map(|()| bytes.len())
                .map_err(AttemptError::Io),
            Err(e) => Err(AttemptError::Provider(e)),
        };

        match written {
            Ok(bytes) => Ok(Attempt::Downloaded(AcquiredImage {
                date: metadata.date,
                panorama_id: metadata.panorama_id,
                lat: metadata.lat,
                lon: metadata.lon,
                heading: point.heading,
                filename,
                bytes,
            })),
            Err(e) => {
                self.claimed.remove(&filename);
                Err(e)
            }
        }
    }
}

/// Writes the image under a temporary name and renames it into place, so a
/// partially written file is never mistaken for an acquired image.
async fn write_image(dir: &Path, filename: &str, bytes: &[u8]) -> io::Result<()> {
    let partial = dir.join(format!("{}{}", PARTIAL_PREFIX, filename));
    tokio::fs::write(&partial, bytes).await?;
    if let Err(e) = tokio::fs::rename(&partial, dir.join(filename)).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    Ok(())
}

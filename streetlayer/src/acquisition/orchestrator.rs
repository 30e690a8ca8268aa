//! Convergence loop driving sampling and acquisition.

use super::result::AcquisitionResult;
use super::stats::{AcquisitionStats, AcquisitionStatsSnapshot};
use super::worker::AcquisitionWorker;
use crate::budget::BudgetTracker;
use crate::config::AcquisitionConfig;
use crate::coord::{CandidatePoint, HEADINGS_PER_GROUP};
use crate::dedup::ExistingCoordinateSet;
use crate::metadata::MetadataRecorder;
use crate::provider::ImageryProvider;
use crate::sampler::CandidateSource;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 8;

/// Default number of consecutive batches without a success before stopping.
pub const DEFAULT_STAGNATION_LIMIT: usize = 3;

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a run stopped. Every variant is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// All requested images were acquired
    TargetReached,
    /// The budget cannot cover another request
    BudgetExhausted,
    /// The sampler returned no candidates
    SamplerExhausted,
    /// Several consecutive batches acquired nothing
    Stagnated,
    /// The run was cancelled
    Interrupted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TerminationReason::TargetReached => "target reached",
            TerminationReason::BudgetExhausted => "budget exhausted",
            TerminationReason::SamplerExhausted => "sampler exhausted",
            TerminationReason::Stagnated => "no progress",
            TerminationReason::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

/// Outcome of one orchestrator run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Images written during this run
    pub images_acquired: usize,
    /// Sampling iterations performed
    pub batches: usize,
    /// Candidates handed to workers
    pub candidates_attempted: usize,
    /// Candidates skipped (dedup, budget, already acquired)
    pub skipped: usize,
    /// Candidates that failed
    pub failed: usize,
    pub termination: TerminationReason,
    /// Budget left after the run
    pub budget_remaining: f64,
    pub stats: AcquisitionStatsSnapshot,
}

#[derive(Debug, Default)]
struct BatchOutcome {
    attempted: usize,
    succeeded: usize,
    skipped: usize,
    failed: usize,
}

/// Repeatedly samples candidates and acquires them until a terminal
/// condition holds.
///
/// Batches run one at a time; within a batch at most `workers` candidates are
/// in flight.
///
/// # Example
///
/// ```ignore
/// let orchestrator = AcquisitionOrchestrator::new(provider, budget, AcquisitionConfig::default());
/// let summary = orchestrator.run(&sampler, 5, &save_dir, &mut recorder).await?;
/// println!("{} images ({})", summary.images_acquired, summary.termination);
/// ```
pub struct AcquisitionOrchestrator<P: ImageryProvider> {
    provider: Arc<P>,
    budget: Arc<BudgetTracker>,
    config: AcquisitionConfig,
    cancel: CancellationToken,
}

impl<P: ImageryProvider + 'static> AcquisitionOrchestrator<P> {
    pub fn new(provider: Arc<P>, budget: Arc<BudgetTracker>, config: AcquisitionConfig) -> Self {
        Self {
            provider,
            budget,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to stop the run early.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Acquires up to `target_count` point-groups (`target_count * 4` images)
    /// into `save_dir`, appending every success to `recorder`.
    pub async fn run(
        &self,
        source: &dyn CandidateSource,
        target_count: usize,
        save_dir: &Path,
        recorder: &mut MetadataRecorder,
    ) -> Result<RunSummary, AcquisitionError> {
        tokio::fs::create_dir_all(save_dir)
            .await
            .map_err(|source| AcquisitionError::OutputDirectory {
                path: save_dir.to_path_buf(),
                source,
            })?;

        let existing = Arc::new(ExistingCoordinateSet::build(save_dir));
        let stats = Arc::new(AcquisitionStats::new());
        let image_target = target_count * HEADINGS_PER_GROUP;
        let budget_cap = self.budget.max_affordable(image_target);
        let ceiling = image_target.min(budget_cap);

        info!(
            dir = %save_dir.display(),
            existing = existing.len(),
            target_images = image_target,
            affordable = budget_cap,
            remaining_budget = self.budget.remaining_budget(),
            "Starting acquisition"
        );

        let mut summary = RunSummary {
            images_acquired: 0,
            batches: 0,
            candidates_attempted: 0,
            skipped: 0,
            failed: 0,
            termination: TerminationReason::TargetReached,
            budget_remaining: 0.0,
            stats: stats.snapshot(),
        };

        if image_target > 0 && budget_cap == 0 {
            warn!(
                remaining_budget = self.budget.remaining_budget(),
                cost_per_request = self.budget.cost_per_request(),
                "Insufficient budget for a single image"
            );
            summary.termination = TerminationReason::BudgetExhausted;
            summary.budget_remaining = self.budget.remaining_budget();
            return Ok(summary);
        }

        let worker = Arc::new(AcquisitionWorker::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.budget),
            existing,
            save_dir,
            self.config.retry_policy(),
            Arc::clone(&stats),
        ));

        let mut stagnant_batches = 0;
        let termination = loop {
            if summary.images_acquired >= ceiling {
                break if summary.images_acquired >= image_target {
                    TerminationReason::TargetReached
                } else {
                    TerminationReason::BudgetExhausted
                };
            }
            if !self.budget.can_afford_one() {
                break TerminationReason::BudgetExhausted;
            }
            if self.cancel.is_cancelled() {
                break TerminationReason::Interrupted;
            }

            let groups = target_count - summary.images_acquired / HEADINGS_PER_GROUP;
            let candidates = source.sample(groups);
            if candidates.is_empty() {
                info!(requested_groups = groups, "Sampler returned no candidates");
                break TerminationReason::SamplerExhausted;
            }

            summary.batches += 1;
            let need = ceiling - summary.images_acquired;
            let batch = self.run_batch(&worker, candidates, need, recorder).await;

            summary.images_acquired += batch.succeeded;
            summary.candidates_attempted += batch.attempted;
            summary.skipped += batch.skipped;
            summary.failed += batch.failed;

            info!(
                batch = summary.batches,
                attempted = batch.attempted,
                succeeded = batch.succeeded,
                skipped = batch.skipped,
                failed = batch.failed,
                total = summary.images_acquired,
                target = ceiling,
                "Batch complete"
            );

            if self.cancel.is_cancelled() {
                break TerminationReason::Interrupted;
            }

            if batch.succeeded == 0 {
                stagnant_batches += 1;
                if stagnant_batches >= self.config.stagnation_limit() {
                    warn!(
                        batches = stagnant_batches,
                        "No new images in consecutive batches, stopping"
                    );
                    break TerminationReason::Stagnated;
                }
            } else {
                stagnant_batches = 0;
            }
        };

        summary.termination = termination;
        summary.budget_remaining = self.budget.remaining_budget();
        summary.stats = stats.snapshot();

        info!(
            images = summary.images_acquired,
            batches = summary.batches,
            reason = %termination,
            budget_remaining = summary.budget_remaining,
            "Acquisition finished"
        );

        Ok(summary)
    }

    /// Runs one batch through a bounded set of worker tasks.
    ///
    /// Stops submitting once `need` successes are in or the run is
    /// cancelled. Tasks already in flight still complete and their successes
    /// are recorded.
    async fn run_batch(
        &self,
        worker: &Arc<AcquisitionWorker<P>>,
        candidates: Vec<CandidatePoint>,
        need: usize,
        recorder: &mut MetadataRecorder,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut pending = candidates.into_iter();
        let mut tasks = JoinSet::new();

        loop {
            // In-flight tasks may all succeed, so they count against `need`.
            while tasks.len() < self.config.workers()
                && outcome.succeeded + tasks.len() < need
                && !self.cancel.is_cancelled()
            {
                let Some(point) = pending.next() else {
                    break;
                };
                let worker = Arc::clone(worker);
                tasks.spawn(async move { worker.acquire(point).await });
                outcome.attempted += 1;
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            match joined {
                Ok(AcquisitionResult::Success(image)) if outcome.succeeded < need => {
                    outcome.succeeded += 1;
                    recorder.record(&image);
                }
                Ok(AcquisitionResult::Success(image)) => {
                    warn!(file = %image.filename, "Acquired past the batch ceiling");
                }
                Ok(AcquisitionResult::Skipped(reason)) => {
                    trace!(?reason, "Candidate skipped");
                    outcome.skipped += 1;
                }
                Ok(AcquisitionResult::Failure(reason)) => {
                    debug!(%reason, "Candidate failed");
                    outcome.failed += 1;
                }
                Err(join_err) => {
                    warn!(error = %join_err, "Acquisition task panicked");
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::mock::MockProvider;
    use crate::acquisition::RetryPolicy;
    use crate::budget::BudgetState;
    use crate::coord::{image_filename, Heading};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Yields fresh, distinct point-groups on every call.
    struct FreshPoints {
        next: AtomicUsize,
        requests: Mutex<Vec<usize>>,
    }

    impl FreshPoints {
        fn new() -> Self {
            Self {
                next: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl CandidateSource for FreshPoints {
        fn sample(&self, groups: usize) -> Vec<CandidatePoint> {
            self.requests.lock().push(groups);
            (0..groups)
                .flat_map(|_| {
                    let i = self.next.fetch_add(1, Ordering::SeqCst) as f64;
                    Heading::ALL.map(|heading| CandidatePoint {
                        lat: 10.0 + i * 0.001,
                        lon: 20.0,
                        heading,
                    })
                })
                .collect()
        }
    }

    /// Always yields the same candidates.
    struct FixedPoints(Vec<CandidatePoint>);

    impl CandidateSource for FixedPoints {
        fn sample(&self, _groups: usize) -> Vec<CandidatePoint> {
            self.0.clone()
        }
    }

    fn orchestrator(provider: MockProvider, cap: f64) -> AcquisitionOrchestrator<MockProvider> {
        let budget = Arc::new(BudgetTracker::new(cap, 1.0, BudgetState::default()));
        let config = AcquisitionConfig::new()
            .with_workers(4)
            .with_retry_policy(RetryPolicy::immediate(2))
            .with_stagnation_limit(3);
        AcquisitionOrchestrator::new(Arc::new(provider), budget, config)
    }

    fn files_in(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_reaches_target() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 100.0);
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&FreshPoints::new(), 3, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.termination, TerminationReason::TargetReached);
        assert_eq!(summary.images_acquired, 12);
        assert_eq!(recorder.len(), summary.images_acquired);
        assert_eq!(files_in(temp_dir.path()), summary.images_acquired);
        assert_eq!(
            orchestrator.budget.snapshot().request_count,
            summary.images_acquired as u64
        );
    }

    #[tokio::test]
    async fn test_wide_pool_stops_at_target() {
        let temp_dir = TempDir::new().unwrap();
        let budget = Arc::new(BudgetTracker::new(100.0, 1.0, BudgetState::default()));
        let config = AcquisitionConfig::new()
            .with_workers(8)
            .with_retry_policy(RetryPolicy::immediate(2));
        let orchestrator = AcquisitionOrchestrator::new(
            Arc::new(MockProvider::resolving_to_self()),
            Arc::clone(&budget),
            config,
        );
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&FreshPoints::new(), 1, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.termination, TerminationReason::TargetReached);
        assert_eq!(summary.images_acquired, 4);
        assert_eq!(summary.candidates_attempted, 4);
        assert_eq!(recorder.len(), 4);
        assert_eq!(files_in(temp_dir.path()), 4);
        assert_eq!(budget.snapshot(), BudgetState::new(4.0, 4));
    }

    #[tokio::test]
    async fn test_budget_caps_acquisition() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 3.0);
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&FreshPoints::new(), 5, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.termination, TerminationReason::BudgetExhausted);
        assert_eq!(summary.images_acquired, 3);
        assert_eq!(orchestrator.budget.snapshot(), BudgetState::new(3.0, 3));
        assert_eq!(files_in(temp_dir.path()), 3);
    }

    #[tokio::test]
    async fn test_zero_budget_returns_immediately() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 0.5);
        let source = FreshPoints::new();
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&source, 5, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.termination, TerminationReason::BudgetExhausted);
        assert_eq!(summary.images_acquired, 0);
        assert_eq!(summary.batches, 0);
        assert!(source.requests.lock().is_empty(), "sampler never invoked");
    }

    #[tokio::test]
    async fn test_zero_target_is_reached() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 10.0);
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&FreshPoints::new(), 0, temp_dir.path(), &mut recorder)
            .await
            .unwrap();
        assert_eq!(summary.termination, TerminationReason::TargetReached);
        assert_eq!(summary.batches, 0);
    }

    #[tokio::test]
    async fn test_empty_sampler_terminates() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 10.0);
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&FixedPoints(Vec::new()), 5, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.termination, TerminationReason::SamplerExhausted);
        assert_eq!(summary.images_acquired, 0);
    }

    #[tokio::test]
    async fn test_no_panoramas_stagnates() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(MockProvider::unavailable(), 10.0);
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&FreshPoints::new(), 2, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.termination, TerminationReason::Stagnated);
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.images_acquired, 0);
        assert_eq!(summary.failed, summary.candidates_attempted);
        assert!(recorder.is_empty());
        assert_eq!(orchestrator.budget.snapshot(), BudgetState::default());
    }

    #[tokio::test]
    async fn test_repeated_candidates_stagnate_after_first_batch() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 100.0);
        let points: Vec<_> = Heading::ALL
            .iter()
            .map(|&heading| CandidatePoint::new(1.0, 2.0, heading).unwrap())
            .collect();
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&FixedPoints(points), 5, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.images_acquired, 4);
        assert_eq!(summary.termination, TerminationReason::Stagnated);
        assert_eq!(summary.batches, 4);
    }

    #[tokio::test]
    async fn test_request_size_shrinks_with_progress() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 100.0);
        let source = FreshPoints::new();
        let mut recorder = MetadataRecorder::new();

        orchestrator
            .run(&source, 4, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        let requests = source.requests.lock().clone();
        assert_eq!(requests[0], 4);
        assert!(requests.windows(2).all(|w| w[1] <= w[0]));
    }

    #[tokio::test]
    async fn test_existing_coordinates_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(image_filename(1.0, 2.0, Heading::North)),
            b"",
        )
        .unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 100.0);
        let points: Vec<_> = Heading::ALL
            .iter()
            .map(|&heading| CandidatePoint::new(1.0, 2.0, heading).unwrap())
            .collect();
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&FixedPoints(points), 1, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.images_acquired, 0);
        assert_eq!(summary.skipped, summary.candidates_attempted);
        assert_eq!(summary.stats.duplicates_skipped as usize, summary.skipped);
        assert_eq!(summary.stats.metadata_lookups, 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 100.0);
        orchestrator.cancellation_token().cancel();
        let mut recorder = MetadataRecorder::new();

        let summary = orchestrator
            .run(&FreshPoints::new(), 5, temp_dir.path(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.termination, TerminationReason::Interrupted);
        assert_eq!(summary.images_acquired, 0);
    }

    #[tokio::test]
    async fn test_output_directory_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let orchestrator = orchestrator(MockProvider::resolving_to_self(), 100.0);
        let mut recorder = MetadataRecorder::new();

        let result = orchestrator
            .run(&FreshPoints::new(), 1, &blocker.join("sub"), &mut recorder)
            .await;
        assert!(matches!(result, Err(AcquisitionError::OutputDirectory { .. })));
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(TerminationReason::BudgetExhausted.to_string(), "budget exhausted");
        assert_eq!(TerminationReason::TargetReached.to_string(), "target reached");
    }
}

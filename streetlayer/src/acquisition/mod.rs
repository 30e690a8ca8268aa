//! Concurrent, budget-aware image acquisition.
//!
//! [`AcquisitionWorker`] processes a single candidate: dedup check, budget
//! reservation, metadata lookup, download and write, with retries for
//! transient provider errors. [`AcquisitionOrchestrator`] repeatedly samples
//! candidates and fans them out to workers until the target is met, the
//! budget runs out, or sampling stops producing new images.

mod orchestrator;
mod result;
mod stats;
mod worker;

#[cfg(test)]
pub(crate) mod mock;

pub use orchestrator::{
    AcquisitionError, AcquisitionOrchestrator, RunSummary, TerminationReason,
    DEFAULT_STAGNATION_LIMIT, DEFAULT_WORKERS,
};
pub use result::{AcquiredImage, AcquisitionResult, FailureReason, SkipReason};
pub use stats::{AcquisitionStats, AcquisitionStatsSnapshot};
pub use worker::{AcquisitionWorker, RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BACKOFF};

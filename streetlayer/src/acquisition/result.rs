//! Per-candidate acquisition outcomes.

use crate::coord::Heading;
use crate::provider::ProviderError;
use std::fmt;

/// An image written to disk by a worker.
///
/// Coordinates are the panorama's resolved position, which is also what the
/// filename encodes.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredImage {
    pub date: Option<String>,
    pub panorama_id: String,
    pub lat: f64,
    pub lon: f64,
    pub heading: Heading,
    pub filename: String,
    /// Size of the written image in bytes
    pub bytes: usize,
}

/// Why a candidate was skipped without spending budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The requested coordinates already have imagery on disk
    Duplicate,
    /// No budget left for another request
    BudgetExhausted,
    /// Another candidate in this run resolved to the same image
    AlreadyAcquired,
}

/// Why a candidate failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// No panorama near the point
    NoPanorama { status: String },
    /// Transient errors persisted through every attempt
    RetriesExhausted { attempts: u32, last_error: ProviderError },
    /// Permanent provider error
    Provider(ProviderError),
    /// The image could not be written
    Io(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoPanorama { status } => write!(f, "no panorama ({})", status),
            FailureReason::RetriesExhausted {
                attempts,
                last_error,
            } => write!(f, "gave up after {} attempts: {}", attempts, last_error),
            FailureReason::Provider(e) => write!(f, "{}", e),
            FailureReason::Io(msg) => write!(f, "write failed: {}", msg),
        }
    }
}

/// Outcome of processing one candidate point.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionResult {
    Success(AcquiredImage),
    Skipped(SkipReason),
    Failure(FailureReason),
}

impl AcquisitionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AcquisitionResult::Success(_))
    }
}

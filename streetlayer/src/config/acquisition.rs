//! Acquisition/orchestrator configuration.

use super::defaults::{DEFAULT_SPACING_METERS, DEFAULT_STAGNATION_LIMIT, DEFAULT_WORKERS};
use crate::acquisition::RetryPolicy;

/// Configuration for the acquisition orchestrator.
///
/// Groups all parameters needed to configure a run, providing sensible
/// defaults while allowing customization.
///
/// # Example
///
/// ```
/// use streetlayer::acquisition::RetryPolicy;
/// use streetlayer::config::AcquisitionConfig;
///
/// // Using defaults
/// let config = AcquisitionConfig::default();
/// assert_eq!(config.workers(), 8);
/// assert_eq!(config.stagnation_limit(), 3);
///
/// // Custom configuration
/// let config = AcquisitionConfig::new()
///     .with_workers(4)
///     .with_retry_policy(RetryPolicy::immediate(2))
///     .with_spacing_meters(25.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionConfig {
    /// Maximum number of concurrent workers
    workers: usize,
    /// Retry behaviour for transient provider errors
    retry: RetryPolicy,
    /// Distance between sampled positions along a road
    spacing_meters: f64,
    /// Consecutive zero-success batches before stopping
    stagnation_limit: usize,
}

impl AcquisitionConfig {
    /// Create a new acquisition configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of concurrent workers (minimum 1). Default: 8.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the retry policy. Default: 3 attempts, 5 seconds apart.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the sampling distance along roads. Default: 50 metres.
    pub fn with_spacing_meters(mut self, spacing: f64) -> Self {
        self.spacing_meters = spacing;
        self
    }

    /// Set how many consecutive batches may yield nothing before the run
    /// stops (minimum 1). Default: 3.
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn spacing_meters(&self) -> f64 {
        self.spacing_meters
    }

    pub fn stagnation_limit(&self) -> usize {
        self.stagnation_limit
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            retry: RetryPolicy::default(),
            spacing_meters: DEFAULT_SPACING_METERS,
            stagnation_limit: DEFAULT_STAGNATION_LIMIT,
        }
    }
}

//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Imagery provider settings
    pub provider: ProviderSettings,
    /// Acquisition loop settings
    pub acquisition: AcquisitionSettings,
    /// Budget cap and persistence
    pub budget: BudgetSettings,
    /// Output location
    pub output: OutputSettings,
    /// Region name to GeoJSON road network path
    pub regions: BTreeMap<String, PathBuf>,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Maps API key; falls back to the `MAPS_API_KEY` environment variable
    pub api_key: Option<String>,
    /// Image size as `<width>x<height>`
    pub image_size: String,
    /// Horizontal field of view in degrees
    pub fov: u16,
    /// Camera pitch in degrees
    pub pitch: i16,
    /// HTTP request timeout in seconds
    pub timeout: u64,
}

/// Acquisition configuration.
#[derive(Debug, Clone)]
pub struct AcquisitionSettings {
    /// Concurrent workers per batch
    pub workers: usize,
    /// Attempts per candidate, including the first
    pub max_retries: u32,
    /// Seconds to wait after a transient provider error
    pub retry_delay_secs: u64,
    /// Distance between sampled positions along a road
    pub spacing_meters: f64,
    /// Consecutive batches without a success before giving up
    pub stagnation_limit: usize,
    /// Default number of point-groups to acquire
    pub target_count: usize,
}

/// Budget configuration.
#[derive(Debug, Clone)]
pub struct BudgetSettings {
    /// Monetary cap across all runs
    pub cap: f64,
    /// Cost of one billable image request
    pub cost_per_request: f64,
    /// Persisted spend ledger
    pub state_file: PathBuf,
}

/// Output configuration.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    /// Root directory; images go to `<directory>/<region>/`
    pub directory: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

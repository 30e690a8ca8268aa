//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::settings::*;

pub use crate::acquisition::{DEFAULT_MAX_ATTEMPTS, DEFAULT_STAGNATION_LIMIT, DEFAULT_WORKERS};
pub use crate::budget::{DEFAULT_BUDGET_CAP, DEFAULT_COST_PER_REQUEST};
pub use crate::provider::DEFAULT_TIMEOUT_SECS;
pub use crate::sampler::DEFAULT_SPACING_METERS;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV_VAR: &str = "MAPS_API_KEY";

/// Default seconds to wait after a transient provider error.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Default number of point-groups per run.
pub const DEFAULT_TARGET_COUNT: usize = 5;

/// Default image size.
pub const DEFAULT_IMAGE_SIZE: &str = "640x640";

/// Default horizontal field of view.
pub const DEFAULT_FOV: u16 = 90;

/// Default camera pitch.
pub const DEFAULT_PITCH: i16 = 0;

/// Largest image edge the Street View Static API serves.
pub const MAX_IMAGE_EDGE: u32 = 640;

/// Largest field of view the Street View Static API accepts.
pub const MAX_FOV: u16 = 120;

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "Downloads";

/// Default budget state file name inside the config directory.
pub const DEFAULT_BUDGET_FILE: &str = "budget.csv";

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "streetlayer.log";

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            provider: ProviderSettings {
                api_key: None,
                image_size: DEFAULT_IMAGE_SIZE.to_string(),
                fov: DEFAULT_FOV,
                pitch: DEFAULT_PITCH,
                timeout: DEFAULT_TIMEOUT_SECS,
            },
            acquisition: AcquisitionSettings {
                workers: DEFAULT_WORKERS,
                max_retries: DEFAULT_MAX_ATTEMPTS,
                retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
                spacing_meters: DEFAULT_SPACING_METERS,
                stagnation_limit: DEFAULT_STAGNATION_LIMIT,
                target_count: DEFAULT_TARGET_COUNT,
            },
            budget: BudgetSettings {
                cap: DEFAULT_BUDGET_CAP,
                cost_per_request: DEFAULT_COST_PER_REQUEST,
                state_file: config_dir.join(DEFAULT_BUDGET_FILE),
            },
            output: OutputSettings {
                directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            },
            regions: BTreeMap::new(),
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE),
            },
        }
    }
}

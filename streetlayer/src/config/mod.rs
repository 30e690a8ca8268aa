//! Configuration for streetlayer.
//!
//! Two layers:
//!
//! - [`ConfigFile`]: the user's `~/.streetlayer/config.ini`, one settings
//!   struct per INI section.
//! - [`AcquisitionConfig`]: the orchestrator parameters built from it.
//!
//! # Example
//!
//! ```no_run
//! use streetlayer::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let acquisition = config.acquisition_config();
//! let api_key = config.resolve_api_key(None);
//! # Ok::<(), streetlayer::config::ConfigFileError>(())
//! ```

mod acquisition;
mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use acquisition::AcquisitionConfig;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    AcquisitionSettings, BudgetSettings, ConfigFile, LoggingSettings, OutputSettings,
    ProviderSettings,
};

pub use defaults::{
    API_KEY_ENV_VAR, DEFAULT_FOV, DEFAULT_IMAGE_SIZE, DEFAULT_OUTPUT_DIR, DEFAULT_PITCH,
    DEFAULT_RETRY_DELAY_SECS, DEFAULT_TARGET_COUNT,
};

//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;
use streetlayer::acquisition::AcquisitionError;
use streetlayer::config::{ConfigFileError, API_KEY_ENV_VAR};
use streetlayer::geometry::GeometryError;
use streetlayer::provider::ProviderError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// No API key from flag, config or environment
    MissingApiKey,
    /// Region not listed in the config file
    UnknownRegion { region: String, known: Vec<String> },
    /// Region road network could not be loaded
    Geometry { region: String, error: GeometryError },
    /// HTTP client could not be created
    Provider(ProviderError),
    /// Async runtime could not be started
    Runtime(std::io::Error),
    /// Acquisition could not start
    Acquisition(AcquisitionError),
    /// Metadata or budget state could not be saved
    Persist { path: PathBuf, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::MissingApiKey => {
                eprintln!();
                eprintln!("Provide an API key in one of these ways:");
                eprintln!("  1. --api-key <KEY>");
                eprintln!("  2. api_key in the [provider] section of config.ini");
                eprintln!("  3. the {} environment variable", API_KEY_ENV_VAR);
            }
            CliError::UnknownRegion { known, .. } => {
                eprintln!();
                if known.is_empty() {
                    eprintln!("No regions configured. Add one to the [regions] section:");
                    eprintln!("  My Region = /path/to/roads.geojson");
                } else {
                    eprintln!("Configured regions:");
                    for name in known {
                        eprintln!("  {}", name);
                    }
                }
            }
            CliError::Geometry { .. } => {
                eprintln!();
                eprintln!("Region files must be GeoJSON FeatureCollections of road LineStrings.");
                eprintln!("Convert shapefiles with: ogr2ogr -f GeoJSON roads.geojson roads.shp");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::MissingApiKey => write!(f, "No API key configured"),
            CliError::UnknownRegion { region, .. } => write!(f, "Unknown region '{}'", region),
            CliError::Geometry { region, error } => {
                write!(f, "Failed to load region '{}': {}", region, error)
            }
            CliError::Provider(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Acquisition(e) => write!(f, "Acquisition failed: {}", e),
            CliError::Persist { path, error } => {
                write!(f, "Failed to save '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Geometry { error, .. } => Some(error),
            CliError::Provider(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Acquisition(e) => Some(e),
            CliError::Persist { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<AcquisitionError> for CliError {
    fn from(e: AcquisitionError) -> Self {
        CliError::Acquisition(e)
    }
}

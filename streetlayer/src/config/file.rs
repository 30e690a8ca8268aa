//! Configuration file handling for ~/.streetlayer/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use super::defaults::*;
pub use super::settings::*;

use super::AcquisitionConfig;
use crate::acquisition::RetryPolicy;
use crate::provider::ImageParams;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.streetlayer/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create a default config file at `path` if none exists.
    ///
    /// Returns `true` when a file was written.
    pub fn ensure_exists_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// GeoJSON path configured for `region`.
    pub fn region_path(&self, region: &str) -> Option<&Path> {
        self.regions.get(region).map(PathBuf::as_path)
    }

    /// Resolves the API key: explicit value, then config, then environment.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Option<String> {
        resolve_api_key_with(explicit, self.provider.api_key.as_deref(), |name| {
            std::env::var(name).ok()
        })
    }

    /// Provider image parameters.
    pub fn image_params(&self) -> ImageParams {
        ImageParams {
            size: self.provider.image_size.clone(),
            fov: self.provider.fov,
            pitch: self.provider.pitch,
        }
    }

    /// Orchestrator parameters from the `[acquisition]` section.
    pub fn acquisition_config(&self) -> AcquisitionConfig {
        let settings = &self.acquisition;
        AcquisitionConfig::new()
            .with_workers(settings.workers)
            .with_retry_policy(RetryPolicy::new(
                settings.max_retries,
                Duration::from_secs(settings.retry_delay_secs),
            ))
            .with_spacing_meters(settings.spacing_meters)
            .with_stagnation_limit(settings.stagnation_limit)
    }
}

fn resolve_api_key_with(
    explicit: Option<&str>,
    configured: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let non_empty = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    explicit
        .and_then(non_empty)
        .or_else(|| configured.and_then(non_empty))
        .or_else(|| env(API_KEY_ENV_VAR).as_deref().and_then(non_empty))
}

/// Get the path to the config directory (~/.streetlayer).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".streetlayer")
}

/// Get the path to the config file (~/.streetlayer/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert!(config.provider.api_key.is_none());
        assert_eq!(config.provider.image_size, "640x640");
        assert_eq!(config.provider.fov, 90);
        assert_eq!(config.provider.pitch, 0);
        assert_eq!(config.acquisition.workers, 8);
        assert_eq!(config.acquisition.max_retries, 3);
        assert_eq!(config.acquisition.retry_delay_secs, 5);
        assert_eq!(config.acquisition.spacing_meters, 50.0);
        assert_eq!(config.budget.cap, 200.0);
        assert_eq!(config.budget.cost_per_request, 0.007);
        assert!(config.budget.state_file.ends_with(".streetlayer/budget.csv"));
        assert!(config.regions.is_empty());
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config.acquisition.workers, DEFAULT_WORKERS);
        assert_eq!(config.provider.timeout, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.provider.api_key = Some("key-123".to_string());
        config.acquisition.workers = 3;
        config.budget.cap = 12.5;
        config
            .regions
            .insert("Region 1".to_string(), PathBuf::from("/data/r1.geojson"));
        config.save_to(&config_path).unwrap();

        let reloaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(reloaded.provider.api_key.as_deref(), Some("key-123"));
        assert_eq!(reloaded.acquisition.workers, 3);
        assert_eq!(reloaded.budget.cap, 12.5);
        assert_eq!(
            reloaded.region_path("Region 1"),
            Some(Path::new("/data/r1.geojson"))
        );
    }

    #[test]
    fn test_ensure_exists_at_does_not_overwrite() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        assert!(ConfigFile::ensure_exists_at(&config_path).unwrap());
        std::fs::write(&config_path, "[acquisition]\nworkers = 2\n").unwrap();
        assert!(!ConfigFile::ensure_exists_at(&config_path).unwrap());
        assert_eq!(
            ConfigFile::load_from(&config_path).unwrap().acquisition.workers,
            2
        );
    }

    #[test]
    fn test_api_key_precedence() {
        let env = |_: &str| Some("from-env".to_string());
        let no_env = |_: &str| None;

        assert_eq!(
            resolve_api_key_with(Some("flag"), Some("config"), env).as_deref(),
            Some("flag")
        );
        assert_eq!(
            resolve_api_key_with(None, Some("config"), env).as_deref(),
            Some("config")
        );
        assert_eq!(
            resolve_api_key_with(Some("  "), None, env).as_deref(),
            Some("from-env")
        );
        assert_eq!(resolve_api_key_with(None, None, no_env), None);
    }

    #[test]
    fn test_acquisition_config_from_settings() {
        let mut config = ConfigFile::default();
        config.acquisition.workers = 2;
        config.acquisition.max_retries = 4;
        config.acquisition.retry_delay_secs = 0;

        let acquisition = config.acquisition_config();
        assert_eq!(acquisition.workers(), 2);
        assert_eq!(acquisition.retry_policy(), RetryPolicy::immediate(4));
        assert_eq!(acquisition.spacing_meters(), DEFAULT_SPACING_METERS);
    }
}

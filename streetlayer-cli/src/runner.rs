//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and the shared
//! acquisition context to reduce duplication across command handlers.

use crate::error::CliError;
use std::sync::Arc;
use streetlayer::budget::{BudgetStore, BudgetTracker};
use streetlayer::config::ConfigFile;
use streetlayer::context::AcquisitionContext;
use streetlayer::geometry::{GeometryCache, RoadNetwork};
use streetlayer::logging::{init_logging, LoggingGuard, LoggingOptions};
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let options = LoggingOptions {
            stdout: debug_mode,
            debug: debug_mode,
        };
        let logging_guard = init_logging(&config.logging.file, options)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("streetlayer v{}", streetlayer::VERSION);
        info!("streetlayer CLI: {} command", command);
    }

    /// Budget store at the configured state file.
    pub fn budget_store(&self) -> BudgetStore {
        BudgetStore::new(self.config.budget.state_file.clone())
    }

    /// Builds the process-wide context, loading persisted budget state once.
    pub fn create_context(&self) -> AcquisitionContext {
        let state = self.budget_store().load();
        let budget = BudgetTracker::new(
            self.config.budget.cap,
            self.config.budget.cost_per_request,
            state,
        );
        AcquisitionContext::new(Arc::new(budget), Arc::new(GeometryCache::new()))
    }

    /// Loads a configured region's road network through the context cache.
    pub fn load_region(
        &self,
        context: &AcquisitionContext,
        region: &str,
    ) -> Result<Arc<RoadNetwork>, CliError> {
        let path = self
            .config
            .region_path(region)
            .ok_or_else(|| CliError::UnknownRegion {
                region: region.to_string(),
                known: self.config.regions.keys().cloned().collect(),
            })?;

        let network = context
            .geometry
            .get_or_load(region, path)
            .map_err(|error| CliError::Geometry {
                region: region.to_string(),
                error,
            })?;

        info!(
            region,
            roads = network.len(),
            total_km = network.total_length_m() / 1000.0,
            "Region loaded"
        );
        Ok(network)
    }
}

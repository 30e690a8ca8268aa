//! streetlayer - Road-network sampling and street-level imagery acquisition
//!
//! This library samples candidate positions along a region's road network and
//! acquires street-level imagery for them under a monetary budget, skipping
//! coordinates that already have imagery on disk.
//!
//! # High-Level API
//!
//! ```ignore
//! use streetlayer::acquisition::AcquisitionOrchestrator;
//! use streetlayer::provider::{AsyncReqwestClient, StreetViewProvider};
//! use streetlayer::sampler::{RegionSampler, RoadSampler};
//!
//! let network = context.geometry.get_or_load("Region 1", &path)?;
//! let sampler = RegionSampler::new(network, RoadSampler::new(), 50.0);
//! let provider = StreetViewProvider::new(AsyncReqwestClient::new()?, api_key);
//! let orchestrator = AcquisitionOrchestrator::new(Arc::new(provider), context.budget.clone(), config);
//!
//! let summary = orchestrator.run(&sampler, 5, &save_dir, session.recorder_mut()).await?;
//! session.finish()?;
//! ```

pub mod acquisition;
pub mod budget;
pub mod config;
pub mod context;
pub mod coord;
pub mod dedup;
pub mod geometry;
pub mod logging;
pub mod metadata;
pub mod provider;
pub mod sampler;

/// Version of the streetlayer library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

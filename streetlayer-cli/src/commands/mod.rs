//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`budget`] - Persisted spend and remaining funds
//! - [`download`] - Acquire imagery for a region
//! - [`init`] - Configuration initialization
//! - [`regions`] - List configured regions

pub mod budget;
pub mod common;
pub mod download;
pub mod init;
pub mod regions;

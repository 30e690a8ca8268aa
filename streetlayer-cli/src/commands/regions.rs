//! Regions command - list configured regions.

use streetlayer::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the regions command.
pub fn run() -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    if config.regions.is_empty() {
        println!("No regions configured.");
        println!("Add them to the [regions] section of {}", config_file_path().display());
        return Ok(());
    }

    for (name, path) in &config.regions {
        let status = if path.is_file() { "ok" } else { "missing" };
        println!("{:<24} {:<8} {}", name, status, path.display());
    }

    Ok(())
}

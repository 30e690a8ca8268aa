//! Init command - write a default configuration file.

use streetlayer::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();

    if ConfigFile::ensure_exists_at(&path)? {
        println!("Created configuration file: {}", path.display());
        println!();
        println!("Next steps:");
        println!("  1. Set api_key in the [provider] section (or export MAPS_API_KEY)");
        println!("  2. Add your regions to the [regions] section");
        println!("  3. Run: streetlayer download --region <name>");
    } else {
        println!("Configuration file already exists: {}", path.display());
    }

    Ok(())
}

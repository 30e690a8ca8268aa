//! Common utilities shared across CLI commands.

use std::path::{Path, PathBuf};

/// Directory holding a region's images and metadata files.
pub fn region_output_dir(output_root: &Path, region: &str) -> PathBuf {
    output_root.join(region)
}

/// Formats an amount of money with two decimals.
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

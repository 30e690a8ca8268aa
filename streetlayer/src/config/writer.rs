//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::fmt::Write;
use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let api_key = config.provider.api_key.as_deref().unwrap_or("");

    let mut regions = String::new();
    for (name, path) in &config.regions {
        let _ = writeln!(regions, "{} = {}", name, path_to_string(path));
    }

    format!(
        r#"[provider]
; Google Maps Platform API key with the Street View Static API enabled.
; If empty, the MAPS_API_KEY environment variable is used.
api_key = {}
; Image size as <width>x<height>, each edge at most 640 (default: 640x640)
image_size = {}
; Horizontal field of view in degrees, 1-120 (default: 90)
fov = {}
; Camera pitch in degrees, -90 to 90 (default: 0)
pitch = {}
; Timeout in seconds for HTTP requests (default: 30)
timeout = {}

[acquisition]
; Concurrent workers per batch (default: 8)
workers = {}
; Attempts per candidate including the first (default: 3)
max_retries = {}
; Seconds to wait after a transient provider error (default: 5)
retry_delay_secs = {}
; Distance between sampled positions along a road in metres (default: 50)
spacing_meters = {}
; Consecutive batches without a new image before stopping (default: 3)
stagnation_limit = {}
; Point-groups (4 headings each) to acquire per run (default: 5)
target_count = {}

[budget]
; Spend cap across all runs (default: 200)
cap = {}
; Cost of one billed image request (default: 0.007)
cost_per_request = {}
; File holding cumulative spend, shared by every region
state_file = {}

[output]
; Images are written to <directory>/<region>/
directory = {}

[regions]
; Region name = path to a GeoJSON FeatureCollection of road LineStrings.
; Shapefiles can be converted with: ogr2ogr -f GeoJSON roads.geojson roads.shp
{}
[logging]
; Log file path, cleared at the start of each session
file = {}
"#,
        api_key,
        config.provider.image_size,
        config.provider.fov,
        config.provider.pitch,
        config.provider.timeout,
        config.acquisition.workers,
        config.acquisition.max_retries,
        config.acquisition.retry_delay_secs,
        config.acquisition.spacing_meters,
        config.acquisition.stagnation_limit,
        config.acquisition.target_count,
        config.budget.cap,
        config.budget.cost_per_request,
        path_to_string(&config.budget.state_file),
        path_to_string(&config.output.directory),
        regions,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

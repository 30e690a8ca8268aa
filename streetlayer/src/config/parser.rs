//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::{MAX_FOV, MAX_IMAGE_EDGE};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses `key` from `section` if present, rejecting values `accept` refuses.
fn parse_value<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
    reason: &str,
    accept: impl Fn(&T) -> bool,
) -> Result<Option<T>, ConfigFileError> {
    let Some(raw) = section.get(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(v) if accept(&v) => Ok(Some(v)),
        _ => Err(invalid(section_name, key, raw, reason)),
    }
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("api_key") {
            let v = v.trim();
            if !v.is_empty() {
                config.provider.api_key = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("image_size") {
            let v = v.trim();
            if !is_valid_image_size(v) {
                return Err(invalid(
                    "provider",
                    "image_size",
                    v,
                    "expected '<width>x<height>' with each edge between 1 and 640",
                ));
            }
            config.provider.image_size = v.to_string();
        }
        if let Some(v) = parse_value(section, "provider", "fov", "must be between 1 and 120", |v: &u16| {
            (1..=MAX_FOV).contains(v)
        })? {
            config.provider.fov = v;
        }
        if let Some(v) = parse_value(
            section,
            "provider",
            "pitch",
            "must be between -90 and 90",
            |v: &i16| (-90..=90).contains(v),
        )? {
            config.provider.pitch = v;
        }
        if let Some(v) = parse_value(
            section,
            "provider",
            "timeout",
            "must be a positive integer (seconds)",
            |v: &u64| *v > 0,
        )? {
            config.provider.timeout = v;
        }
    }

    // [acquisition] section
    if let Some(section) = ini.section(Some("acquisition")) {
        let positive = "must be a positive integer";
        if let Some(v) = parse_value(section, "acquisition", "workers", positive, |v: &usize| *v > 0)? {
            config.acquisition.workers = v;
        }
        if let Some(v) =
            parse_value(section, "acquisition", "max_retries", positive, |v: &u32| *v > 0)?
        {
            config.acquisition.max_retries = v;
        }
        if let Some(v) = parse_value(
            section,
            "acquisition",
            "retry_delay_secs",
            "must be a non-negative integer (seconds)",
            |_: &u64| true,
        )? {
            config.acquisition.retry_delay_secs = v;
        }
        if let Some(v) = parse_value(
            section,
            "acquisition",
            "spacing_meters",
            "must be a positive number",
            |v: &f64| v.is_finite() && *v > 0.0,
        )? {
            config.acquisition.spacing_meters = v;
        }
        if let Some(v) = parse_value(
            section,
            "acquisition",
            "stagnation_limit",
            positive,
            |v: &usize| *v > 0,
        )? {
            config.acquisition.stagnation_limit = v;
        }
        if let Some(v) =
            parse_value(section, "acquisition", "target_count", positive, |v: &usize| *v > 0)?
        {
            config.acquisition.target_count = v;
        }
    }

    // [budget] section
    if let Some(section) = ini.section(Some("budget")) {
        if let Some(v) = parse_value(
            section,
            "budget",
            "cap",
            "must be a non-negative number",
            |v: &f64| v.is_finite() && *v >= 0.0,
        )? {
            config.budget.cap = v;
        }
        if let Some(v) = parse_value(
            section,
            "budget",
            "cost_per_request",
            "must be a positive number",
            |v: &f64| v.is_finite() && *v > 0.0,
        )? {
            config.budget.cost_per_request = v;
        }
        if let Some(v) = section.get("state_file") {
            let v = v.trim();
            if !v.is_empty() {
                config.budget.state_file = expand_tilde(v);
            }
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.output.directory = expand_tilde(v);
            }
        }
    }

    // [regions] section
    if let Some(section) = ini.section(Some("regions")) {
        for (name, path) in section.iter() {
            let path = path.trim();
            if path.is_empty() {
                return Err(invalid("regions", name, path, "expected a GeoJSON file path"));
            }
            config.regions.insert(name.trim().to_string(), expand_tilde(path));
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Checks a `<width>x<height>` image size.
fn is_valid_image_size(value: &str) -> bool {
    let Some((w, h)) = value.split_once('x') else {
        return false;
    };
    let edge = |s: &str| s.parse::<u32>().is_ok_and(|n| (1..=MAX_IMAGE_EDGE).contains(&n));
    edge(w) && edge(h)
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

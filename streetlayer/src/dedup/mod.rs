//! Dedup index built from already-acquired images.
//!
//! Acquired images are named `<lat>_<lon>_<heading>.<ext>` (see
//! [`crate::coord::image_filename`]). Scanning an output directory and parsing
//! those names reconstructs the set of coordinates that already have imagery,
//! so a resumed run does not pay for them again.
//!
//! Dedup is coordinate-level: a location counts as acquired as soon as any
//! heading exists on disk.

use crate::coord::CoordKey;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Reasons a filename is not a valid image name.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilenameParseError {
    /// Fewer than two underscore-separated tokens
    #[error("expected '<lat>_<lon>_...' but found {0} token(s)")]
    TooFewTokens(usize),

    /// A coordinate token is not a finite number
    #[error("'{0}' is not a valid coordinate")]
    InvalidCoordinate(String),
}

/// Parses the `(lat, lon)` pair out of an image filename.
///
/// The name is split on `_` and the first two tokens parsed as finite floats.
/// Further tokens (the heading and extension) are ignored. When the longitude
/// is the last token it may still carry the extension, which is stripped.
pub fn parse_image_filename(name: &str) -> Result<CoordKey, FilenameParseError> {
    let mut tokens = name.split('_');
    let (lat, lon) = match (tokens.next(), tokens.next()) {
        (Some(lat), Some(lon)) => (lat, lon),
        (Some(""), None) | (None, _) => return Err(FilenameParseError::TooFewTokens(0)),
        (Some(_), None) => return Err(FilenameParseError::TooFewTokens(1)),
    };

    Ok(CoordKey::new(parse_coordinate(lat)?, parse_coordinate(lon)?))
}

fn parse_coordinate(token: &str) -> Result<f64, FilenameParseError> {
    let parse = |s: &str| s.parse::<f64>().ok().filter(|v| v.is_finite());

    parse(token)
        .or_else(|| token.rsplit_once('.').and_then(|(stem, _)| parse(stem)))
        .ok_or_else(|| FilenameParseError::InvalidCoordinate(token.to_string()))
}

/// Coordinates already present in an output directory.
///
/// Built once at the start of a run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExistingCoordinateSet {
    coords: HashSet<CoordKey>,
}

impl ExistingCoordinateSet {
    /// Scans `directory` and collects every parseable coordinate pair.
    ///
    /// A missing directory yields an empty set. Malformed names are skipped.
    pub fn build(directory: &Path) -> Self {
        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %directory.display(), "Output directory does not exist yet");
                return Self::default();
            }
            Err(e) => {
                warn!(dir = %directory.display(), error = %e, "Cannot scan output directory");
                return Self::default();
            }
        };

        let mut coords = HashSet::new();
        let mut malformed = 0usize;

        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                malformed += 1;
                continue;
            };
            match parse_image_filename(name) {
                Ok(key) => {
                    coords.insert(key);
                }
                Err(e) => {
                    trace!(file = name, reason = %e, "Skipping non-image filename");
                    malformed += 1;
                }
            }
        }

        debug!(
            dir = %directory.display(),
            existing = coords.len(),
            skipped = malformed,
            "Dedup index built"
        );

        Self { coords }
    }

    /// Creates a set from known coordinates.
    pub fn from_coords<I: IntoIterator<Item = CoordKey>>(coords: I) -> Self {
        Self {
            coords: coords.into_iter().collect(),
        }
    }

    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.coords.contains(&CoordKey::new(lat, lon))
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoordKey> {
        self.coords.iter()
    }
}

//! Coordinate and naming module
//!
//! Provides the candidate point type produced by the road sampler and the
//! on-disk naming scheme shared by the acquisition worker and the dedup index.

mod types;

pub use types::{
    CandidatePoint, CoordError, CoordKey, Heading, HEADINGS_PER_GROUP, MAX_LAT, MAX_LON, MIN_LAT,
    MIN_LON,
};

/// Extension used for every acquired image.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Builds the output filename for an acquired image.
///
/// Format: `<lat>_<lon>_<heading>.jpg`, where `lat`/`lon` are the coordinates
/// the provider resolved (not the requested ones). Floats use the shortest
/// representation that parses back to the same value, so
/// [`crate::dedup::parse_image_filename`] recovers the exact pair.
#[inline]
pub fn image_filename(lat: f64, lon: f64, heading: Heading) -> String {
    format!("{}_{}_{}.{}", lat, lon, heading.degrees(), IMAGE_EXTENSION)
}

#[cfg(test)]
mod tests;

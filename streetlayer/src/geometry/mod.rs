//! Road network geometry.
//!
//! A region's roads are an ordered collection of polylines, each carrying its
//! length in metres. Roads are loaded from GeoJSON (see [`load_road_network`])
//! and shared through the process-wide [`GeometryCache`].

mod cache;
mod geojson;

pub use cache::GeometryCache;
pub use geojson::{load_road_network, parse_road_network};

use geo::{Coord, HaversineLength, LineString};
use thiserror::Error;

/// Errors raised while loading road geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The geometry file could not be read
    #[error("Failed to read road geometry from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The geometry file is not valid GeoJSON
    #[error("Invalid GeoJSON in {path}: {reason}")]
    Parse { path: String, reason: String },

    /// The top-level GeoJSON object is not supported
    #[error("Unsupported GeoJSON object '{0}' (expected FeatureCollection)")]
    Unsupported(String),
}

/// A single road: an ordered path of connected segments.
///
/// Coordinates follow GeoJSON order (`x` = longitude, `y` = latitude).
#[derive(Debug, Clone)]
pub struct RoadGeometry {
    line: LineString<f64>,
    length_m: f64,
}

impl RoadGeometry {
    /// Creates a road from a line string.
    ///
    /// Returns `None` for degenerate lines with fewer than two coordinates.
    pub fn new(line: LineString<f64>) -> Option<Self> {
        if line.0.len() < 2 {
            return None;
        }
        let length_m = line.haversine_length();
        Some(Self { line, length_m })
    }

    /// Creates a road from `(lon, lat)` pairs.
    pub fn from_lon_lat(coords: &[(f64, f64)]) -> Option<Self> {
        let line: LineString<f64> = coords
            .iter()
            .map(|&(x, y)| Coord { x, y })
            .collect::<Vec<_>>()
            .into();
        Self::new(line)
    }

    /// Road length in metres.
    #[inline]
    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    /// The underlying line string.
    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }

    /// Returns the `(lat, lon)` position `distance_m` metres along the road.
    ///
    /// Distances outside `0..=length` are clamped to the road's ends.
    pub fn interpolate(&self, distance_m: f64) -> (f64, f64) {
        let target = distance_m.clamp(0.0, self.length_m);
        let mut travelled = 0.0;

        for segment in self.line.lines() {
            let segment_len = segment.haversine_length();
            if segment_len > 0.0 && travelled + segment_len >= target {
                let fraction = (target - travelled) / segment_len;
                let x = segment.start.x + (segment.end.x - segment.start.x) * fraction;
                let y = segment.start.y + (segment.end.y - segment.start.y) * fraction;
                return (y, x);
            }
            travelled += segment_len;
        }

        // Only reachable for zero-length roads or float drift at the far end.
        let end = self.line.0[self.line.0.len() - 1];
        (end.y, end.x)
    }
}

/// All roads of one geographic region.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    roads: Vec<RoadGeometry>,
}

impl RoadNetwork {
    pub fn new(roads: Vec<RoadGeometry>) -> Self {
        Self { roads }
    }

    pub fn roads(&self) -> &[RoadGeometry] {
        &self.roads
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    /// Sum of all road lengths in metres.
    pub fn total_length_m(&self) -> f64 {
        self.roads.iter().map(RoadGeometry::length_m).sum()
    }
}

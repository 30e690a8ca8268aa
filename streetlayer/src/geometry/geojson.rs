//! GeoJSON road loading.
//!
//! Only the subset of GeoJSON needed for road networks is understood: a
//! `FeatureCollection` whose features carry `LineString` or `MultiLineString`
//! geometries. Everything else is skipped.

use super::{GeometryError, RoadGeometry, RoadNetwork};
use geo::{Coord, LineString};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct GeoJsonObject {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// Loads a region's road network from a GeoJSON file.
pub fn load_road_network(path: &Path) -> Result<RoadNetwork, GeometryError> {
    let bytes = std::fs::read(path).map_err(|source| GeometryError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let network = parse_road_network(&bytes).map_err(|e| match e {
        GeometryError::Parse { reason, .. } => GeometryError::Parse {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })?;

    info!(
        path = %path.display(),
        roads = network.len(),
        total_km = network.total_length_m() / 1000.0,
        "Road network loaded"
    );

    Ok(network)
}

/// Parses a road network from GeoJSON bytes.
pub fn parse_road_network(bytes: &[u8]) -> Result<RoadNetwork, GeometryError> {
    let object: GeoJsonObject =
        serde_json::from_slice(bytes).map_err(|e| GeometryError::Parse {
            path: "<memory>".to_string(),
            reason: e.to_string(),
        })?;

    if object.kind != "FeatureCollection" {
        return Err(GeometryError::Unsupported(object.kind));
    }

    let mut roads = Vec::new();
    let mut skipped = 0usize;

    for geometry in object.features.into_iter().filter_map(|f| f.geometry) {
        match geometry.kind.as_str() {
            "LineString" => match decode_line(&geometry.coordinates) {
                Some(road) => roads.push(road),
                None => skipped += 1,
            },
            "MultiLineString" => match geometry.coordinates.as_array() {
                Some(parts) => {
                    for part in parts {
                        match decode_line(part) {
                            Some(road) => roads.push(road),
                            None => skipped += 1,
                        }
                    }
                }
                None => skipped += 1,
            },
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(
            skipped,
            kept = roads.len(),
            "Skipped non-line or degenerate geometries"
        );
    }

    Ok(RoadNetwork::new(roads))
}

/// Decodes a GeoJSON position array into a road.
///
/// Positions may carry a third (elevation) value, which is ignored.
fn decode_line(value: &serde_json::Value) -> Option<RoadGeometry> {
    let positions: Vec<Vec<f64>> = serde_json::from_value(value.clone()).ok()?;
    let coords: Vec<Coord<f64>> = positions
        .iter()
        .filter(|p| p.len() >= 2 && p[0].is_finite() && p[1].is_finite())
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect();

    if coords.len() != positions.len() {
        return None;
    }

    RoadGeometry::new(LineString::from(coords))
}

//! Coordinate type definitions

use std::fmt;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Number of candidate points emitted per sampled road position.
pub const HEADINGS_PER_GROUP: usize = 4;

/// Camera heading for a street-level capture.
///
/// The four values are offset two degrees from true north/east/south/west,
/// matching how the imagery has always been collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    /// All headings in emission order.
    pub const ALL: [Heading; HEADINGS_PER_GROUP] =
        [Heading::North, Heading::East, Heading::South, Heading::West];

    /// Heading in whole degrees as sent to the provider.
    #[inline]
    pub fn degrees(self) -> u16 {
        match self {
            Heading::North => 2,
            Heading::East => 92,
            Heading::South => 182,
            Heading::West => 272,
        }
    }

    /// Looks up a heading from its degree value.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.degrees() == degrees)
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// A single (position, heading) acquisition request produced by the sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Capture heading
    pub heading: Heading,
}

impl CandidatePoint {
    /// Creates a candidate point, validating the coordinate range.
    pub fn new(lat: f64, lon: f64, heading: Heading) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon, heading })
    }

    /// Hashable key of this point's position.
    #[inline]
    pub fn key(&self) -> CoordKey {
        CoordKey::new(self.lat, self.lon)
    }
}

/// Hashable `(lat, lon)` pair.
///
/// Equality is exact on the bit pattern, which is what the dedup index needs:
/// a coordinate parsed back from a filename compares equal to the value it was
/// formatted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey {
    lat_bits: u64,
    lon_bits: u64,
}

impl CoordKey {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat_bits: normalize_zero(lat).to_bits(),
            lon_bits: normalize_zero(lon).to_bits(),
        }
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        f64::from_bits(self.lat_bits)
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        f64::from_bits(self.lon_bits)
    }
}

impl fmt::Display for CoordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat(), self.lon())
    }
}

// -0.0 and 0.0 must hash identically.
#[inline]
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Errors that can occur when constructing coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside valid range (-90.0 to 90.0)
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0)
    InvalidLongitude(f64),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}

//! In-memory provider for acquisition tests.

use crate::coord::CandidatePoint;
use crate::provider::{ImageryProvider, PanoramaLookup, PanoramaMetadata, ProviderError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fake JPEG payload.
pub(crate) const IMAGE_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9];

enum Resolve {
    Offset(f64, f64),
    Fixed(f64, f64),
    Unavailable,
}

struct Failures {
    remaining: usize,
    error: Option<ProviderError>,
}

impl Failures {
    fn none() -> Mutex<Self> {
        Mutex::new(Self {
            remaining: 0,
            error: None,
        })
    }

    fn take(lock: &Mutex<Self>) -> Option<ProviderError> {
        let mut failures = lock.lock();
        if failures.remaining == 0 {
            return None;
        }
        failures.remaining -= 1;
        failures.error.clone()
    }
}

pub(crate) struct MockProvider {
    resolve: Resolve,
    lookup_failures: Mutex<Failures>,
    fetch_failures: Mutex<Failures>,
    metadata_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl MockProvider {
    fn with_resolve(resolve: Resolve) -> Self {
        Self {
            resolve,
            lookup_failures: Failures::none(),
            fetch_failures: Failures::none(),
            metadata_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Every point has a panorama exactly at the requested coordinates.
    pub(crate) fn resolving_to_self() -> Self {
        Self::with_resolve(Resolve::Offset(0.0, 0.0))
    }

    /// Every point resolves to the same panorama.
    pub(crate) fn resolving_to(lat: f64, lon: f64) -> Self {
        Self::with_resolve(Resolve::Fixed(lat, lon))
    }

    /// No point has a panorama.
    pub(crate) fn unavailable() -> Self {
        Self::with_resolve(Resolve::Unavailable)
    }

    /// Shifts resolved coordinates away from the requested ones.
    pub(crate) fn with_offset(mut self, dlat: f64, dlon: f64) -> Self {
        self.resolve = Resolve::Offset(dlat, dlon);
        self
    }

    /// The first `count` metadata lookups fail with `error`.
    pub(crate) fn failing_lookups(self, count: usize, error: ProviderError) -> Self {
        *self.lookup_failures.lock() = Failures {
            remaining: count,
            error: Some(error),
        };
        self
    }

    /// The first `count` image fetches fail with `error`.
    pub(crate) fn failing_fetches(self, count: usize, error: ProviderError) -> Self {
        *self.fetch_failures.lock() = Failures {
            remaining: count,
            error: Some(error),
        };
        self
    }

    pub(crate) fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

impl ImageryProvider for MockProvider {
    async fn lookup_metadata(&self, point: &CandidatePoint) -> Result<PanoramaLookup, ProviderError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = Failures::take(&self.lookup_failures) {
            return Err(error);
        }

        let (lat, lon) = match self.resolve {
            Resolve::Offset(dlat, dlon) => (point.lat + dlat, point.lon + dlon),
            Resolve::Fixed(lat, lon) => (lat, lon),
            Resolve::Unavailable => {
                return Ok(PanoramaLookup::Unavailable {
                    status: "ZERO_RESULTS".to_string(),
                })
            }
        };
        Ok(PanoramaLookup::Available(PanoramaMetadata {
            panorama_id: format!("pano_{}_{}", lat, lon),
            lat,
            lon,
            date: Some("2023-06".to_string()),
        }))
    }

    async fn fetch_image(&self, _point: &CandidatePoint) -> Result<Vec<u8>, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match Failures::take(&self.fetch_failures) {
            Some(error) => Err(error),
            None => Ok(IMAGE_BYTES.to_vec()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

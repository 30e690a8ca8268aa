//! Provider types and traits

use crate::coord::CandidatePoint;
use std::fmt;
use std::future::Future;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Transport failure (connect, timeout, body read)
    HttpError(String),
    /// Non-success HTTP status
    HttpStatus { status: u16, url: String },
    /// Provider reported its request quota is exhausted
    QuotaExceeded,
    /// Provider reported an unspecified server-side failure
    ServiceUnavailable(String),
    /// Provider refused the request (bad key, malformed request)
    RequestDenied(String),
    /// Invalid response data from provider
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether retrying the same request later may succeed.
    ///
    /// Transport errors, HTTP 429 and 5xx, quota and unknown service errors
    /// are transient. Everything else is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::HttpError(_)
            | ProviderError::QuotaExceeded
            | ProviderError::ServiceUnavailable(_) => true,
            ProviderError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            ProviderError::RequestDenied(_) | ProviderError::InvalidResponse(_) => false,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            ProviderError::QuotaExceeded => write!(f, "Provider quota exceeded"),
            ProviderError::ServiceUnavailable(msg) => {
                write!(f, "Provider temporarily unavailable: {}", msg)
            }
            ProviderError::RequestDenied(msg) => write!(f, "Request denied: {}", msg),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Panorama found near a requested coordinate.
///
/// `lat`/`lon` are the panorama's own position, which generally differs from
/// the requested point.
#[derive(Debug, Clone, PartialEq)]
pub struct PanoramaMetadata {
    pub panorama_id: String,
    pub lat: f64,
    pub lon: f64,
    /// Capture date as reported by the provider (e.g. `2021-07`)
    pub date: Option<String>,
}

/// Outcome of a metadata lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PanoramaLookup {
    /// Imagery exists near the point
    Available(PanoramaMetadata),
    /// No imagery near the point; `status` is the provider's reason code
    Unavailable { status: String },
}

/// Async trait for street-level imagery providers.
///
/// A metadata lookup is free; fetching an image is billable.
pub trait ImageryProvider: Send + Sync {
    /// Looks up whether imagery exists near the candidate point.
    fn lookup_metadata(
        &self,
        point: &CandidatePoint,
    ) -> impl Future<Output = Result<PanoramaLookup, ProviderError>> + Send;

    /// Downloads the image for the candidate point and heading.
    ///
    /// # Returns
    ///
    /// Raw image data (typically JPEG format) or an error.
    fn fetch_image(
        &self,
        point: &CandidatePoint,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;
}

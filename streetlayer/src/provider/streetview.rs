//! Google Street View Static API provider.
//!
//! Two endpoints are used per candidate:
//!
//! - Metadata: `https://maps.googleapis.com/maps/api/streetview/metadata?...`
//!   (not billed) reports whether a panorama exists near the point and where
//!   it actually is.
//! - Image: `https://maps.googleapis.com/maps/api/streetview?...` (billed)
//!   returns the JPEG for the requested heading.
//!
//! Both take the same query string:
//! `size=640x640&fov=90&pitch=0&location=<lat>,<lon>&heading=<deg>&key=<API_KEY>`.
//!
//! The metadata endpoint always answers HTTP 200; the outcome is carried in
//! its `status` field.

use super::http::{redact_url, AsyncHttpClient};
use super::types::{ImageryProvider, PanoramaLookup, PanoramaMetadata, ProviderError};
use crate::coord::CandidatePoint;
use serde::Deserialize;
use tracing::{debug, trace};

const BASE_URL: &str = "https://maps.googleapis.com/maps/api/streetview";

/// Image request parameters shared by the metadata and image endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    /// Image size as `<width>x<height>`
    pub size: String,
    /// Horizontal field of view in degrees
    pub fov: u16,
    /// Camera pitch in degrees
    pub pitch: i16,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            size: "640x640".to_string(),
            fov: 90,
            pitch: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    status: String,
    pano_id: Option<String>,
    location: Option<LatLng>,
    date: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Street View imagery provider.
///
/// Requires a Google Maps Platform API key with the Street View Static API
/// enabled. Image requests are billed per call; metadata requests are free.
pub struct StreetViewProvider<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
    params: ImageParams,
}

impl<C: AsyncHttpClient> StreetViewProvider<C> {
    /// Creates a provider with default image parameters.
    pub fn new(http_client: C, api_key: String) -> Self {
        Self::with_params(http_client, api_key, ImageParams::default())
    }

    pub fn with_params(http_client: C, api_key: String, params: ImageParams) -> Self {
        Self {
            http_client,
            api_key,
            params,
        }
    }

    pub fn params(&self) -> &ImageParams {
        &self.params
    }

    fn query(&self, point: &CandidatePoint) -> String {
        format!(
            "?size={}&fov={}&pitch={}&location={},{}&heading={}&key={}",
            self.params.size,
            self.params.fov,
            self.params.pitch,
            point.lat,
            point.lon,
            point.heading.degrees(),
            self.api_key
        )
    }

    fn metadata_url(&self, point: &CandidatePoint) -> String {
        format!("{}/metadata{}", BASE_URL, self.query(point))
    }

    fn image_url(&self, point: &CandidatePoint) -> String {
        format!("{}{}", BASE_URL, self.query(point))
    }
}

/// Interprets a metadata response body.
fn parse_metadata(body: &[u8]) -> Result<PanoramaLookup, ProviderError> {
    let response: MetadataResponse = serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Bad metadata JSON: {}", e)))?;

    let MetadataResponse {
        status,
        pano_id,
        location,
        date,
        error_message,
    } = response;
    let detail = error_message.unwrap_or_else(|| status.clone());

    match status.as_str() {
        "OK" => match (pano_id, location) {
            (Some(panorama_id), Some(location)) => Ok(PanoramaLookup::Available(PanoramaMetadata {
                panorama_id,
                lat: location.lat,
                lon: location.lng,
                date,
            })),
            _ => Err(ProviderError::InvalidResponse(
                "status OK without pano_id or location".to_string(),
            )),
        },
        "OVER_QUERY_LIMIT" => Err(ProviderError::QuotaExceeded),
        "UNKNOWN_ERROR" => Err(ProviderError::ServiceUnavailable(detail)),
        "REQUEST_DENIED" | "INVALID_REQUEST" => Err(ProviderError::RequestDenied(detail)),
        _ => Ok(PanoramaLookup::Unavailable { status }),
    }
}

impl<C: AsyncHttpClient> ImageryProvider for StreetViewProvider<C> {
    async fn lookup_metadata(&self, point: &CandidatePoint) -> Result<PanoramaLookup, ProviderError> {
        let url = self.metadata_url(point);
        trace!(url = redact_url(&url), lat = point.lat, lon = point.lon, "Metadata lookup");

        let body = self.http_client.get(&url).await?;
        let lookup = parse_metadata(&body)?;

        if let PanoramaLookup::Unavailable { status } = &lookup {
            debug!(lat = point.lat, lon = point.lon, status = %status, "No panorama near point");
        }
        Ok(lookup)
    }

    async fn fetch_image(&self, point: &CandidatePoint) -> Result<Vec<u8>, ProviderError> {
        let bytes = self.http_client.get(&self.image_url(point)).await?;
        if bytes.is_empty() {
            return Err(ProviderError::InvalidResponse("empty image body".to_string()));
        }
        Ok(bytes)
    }

    fn name(&self) -> &str {
        "Google Street View"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Heading;
    use crate::provider::MockAsyncHttpClient;

    fn point() -> CandidatePoint {
        CandidatePoint::new(40.7128, -74.006, Heading::East).unwrap()
    }

    fn provider(response: Result<Vec<u8>, ProviderError>) -> StreetViewProvider<MockAsyncHttpClient> {
        StreetViewProvider::new(MockAsyncHttpClient::new(response), "TEST_KEY".to_string())
    }

    #[test]
    fn test_url_format() {
        let provider = provider(Ok(Vec::new()));
        assert_eq!(
            provider.metadata_url(&point()),
            "https://maps.googleapis.com/maps/api/streetview/metadata?size=640x640&fov=90&pitch=0&location=40.7128,-74.006&heading=92&key=TEST_KEY"
        );
        assert_eq!(
            provider.image_url(&point()),
            "https://maps.googleapis.com/maps/api/streetview?size=640x640&fov=90&pitch=0&location=40.7128,-74.006&heading=92&key=TEST_KEY"
        );
    }

    #[test]
    fn test_custom_params() {
        let params = ImageParams {
            size: "320x240".to_string(),
            fov: 120,
            pitch: -10,
        };
        let provider =
            StreetViewProvider::with_params(MockAsyncHttpClient::new(Ok(Vec::new())), "K".into(), params);
        assert!(provider
            .image_url(&point())
            .contains("?size=320x240&fov=120&pitch=-10&"));
    }

    #[test]
    fn test_parse_ok() {
        let body = br#"{
            "copyright": "(c) Google",
            "date": "2021-07",
            "location": {"lat": 40.71281, "lng": -74.00602},
            "pano_id": "abc123",
            "status": "OK"
        }"#;
        let lookup = parse_metadata(body).unwrap();
        assert_eq!(
            lookup,
            PanoramaLookup::Available(PanoramaMetadata {
                panorama_id: "abc123".to_string(),
                lat: 40.71281,
                lon: -74.00602,
                date: Some("2021-07".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_ok_without_date() {
        let body = br#"{"location": {"lat": 1.0, "lng": 2.0}, "pano_id": "p", "status": "OK"}"#;
        match parse_metadata(body).unwrap() {
            PanoramaLookup::Available(meta) => assert_eq!(meta.date, None),
            other => panic!("Expected Available, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unavailable_statuses() {
        for status in ["ZERO_RESULTS", "NOT_FOUND"] {
            let body = format!(r#"{{"status": "{}"}}"#, status);
            assert_eq!(
                parse_metadata(body.as_bytes()).unwrap(),
                PanoramaLookup::Unavailable {
                    status: status.to_string()
                }
            );
        }
    }

    #[test]
    fn test_parse_error_statuses() {
        assert_eq!(
            parse_metadata(br#"{"status": "OVER_QUERY_LIMIT"}"#),
            Err(ProviderError::QuotaExceeded)
        );
        assert!(matches!(
            parse_metadata(br#"{"status": "UNKNOWN_ERROR"}"#),
            Err(ProviderError::ServiceUnavailable(_))
        ));
        assert_eq!(
            parse_metadata(br#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#),
            Err(ProviderError::RequestDenied("The provided API key is invalid.".to_string()))
        );
        assert!(matches!(
            parse_metadata(br#"{"status": "INVALID_REQUEST"}"#),
            Err(ProviderError::RequestDenied(_))
        ));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_metadata(b"<html>"),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_metadata(br#"{"status": "OK"}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_metadata_uses_metadata_endpoint() {
        let body = br#"{"location": {"lat": 1.0, "lng": 2.0}, "pano_id": "p", "status": "OK"}"#;
        let provider = provider(Ok(body.to_vec()));

        let lookup = provider.lookup_metadata(&point()).await.unwrap();
        assert!(matches!(lookup, PanoramaLookup::Available(_)));

        let urls = provider.http_client.requested_urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://maps.googleapis.com/maps/api/streetview/metadata?"));
    }

    #[tokio::test]
    async fn test_fetch_image_passes_http_errors_through() {
        let provider = provider(Err(ProviderError::HttpStatus {
            status: 503,
            url: BASE_URL.to_string(),
        }));
        let err = provider.fetch_image(&point()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_image_rejects_empty_body() {
        let provider = provider(Ok(Vec::new()));
        assert!(matches!(
            provider.fetch_image(&point()).await,
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider(Ok(Vec::new())).name(), "Google Street View");
    }
}

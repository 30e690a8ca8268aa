//! Street-level imagery provider abstraction
//!
//! This module provides the [`ImageryProvider`] trait the acquisition worker
//! drives, and the Google Street View implementation of it.
//!
//! ```ignore
//! use streetlayer::provider::{AsyncReqwestClient, StreetViewProvider};
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let provider = StreetViewProvider::new(http_client, api_key);
//! ```

mod http;
mod streetview;
mod types;

pub use http::{redact_url, AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use streetview::{ImageParams, StreetViewProvider};
pub use types::{ImageryProvider, PanoramaLookup, PanoramaMetadata, ProviderError};

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, ScriptedHttpClient};

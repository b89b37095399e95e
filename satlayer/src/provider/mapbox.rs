//! MapBox Static Images provider.
//!
//! Fetches one rendered image per request from the MapBox Static Images API.
//! Requires a MapBox access token (free tier available with usage limits).
//!
//! # Getting an Access Token
//!
//! 1. Create a free account at <https://www.mapbox.com/>
//! 2. Navigate to your account's access tokens page
//! 3. Use the default public token or create a new one
//!
//! # Usage Limits
//!
//! Static image requests are billed per request; see
//! <https://www.mapbox.com/pricing/> for the free allowance.

use crate::provider::{AsyncHttpClient, AsyncProvider, FetchError, FetchRequest};

/// Async MapBox static imagery provider.
///
/// # Example
///
/// ```ignore
/// use satlayer::provider::{AsyncMapBoxProvider, AsyncReqwestClient};
///
/// let client = AsyncReqwestClient::new()?;
/// let provider = AsyncMapBoxProvider::new(client);
/// // Use provider with AcquisitionOrchestrator...
/// ```
pub struct AsyncMapBoxProvider<C: AsyncHttpClient> {
    http_client: C,
}

impl<C: AsyncHttpClient> AsyncMapBoxProvider<C> {
    /// Creates a new provider around an HTTP client.
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }
}

impl<C: AsyncHttpClient> AsyncProvider for AsyncMapBoxProvider<C> {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        self.http_client.get(&request.url()).await
    }

    fn name(&self) -> &str {
        "MapBox"
    }
}

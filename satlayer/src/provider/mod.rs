//! Satellite imagery provider abstraction
//!
//! This module resolves record coordinates into fetch requests and executes
//! them against the MapBox Static Images API.
//!
//! ```ignore
//! use satlayer::provider::{AsyncMapBoxProvider, AsyncReqwestClient, FetchRequest, ImageryParams};
//!
//! let provider = AsyncMapBoxProvider::new(AsyncReqwestClient::new()?);
//! let request = FetchRequest::resolve(47.51, -122.25, &ImageryParams::default(), token);
//! let bytes = provider.fetch(&request).await?;
//! ```

mod http;
mod mapbox;
mod request;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT};
pub use mapbox::AsyncMapBoxProvider;
pub use request::{
    FetchRequest, ImageryParams, DEFAULT_SIZE_PX, DEFAULT_STYLE, DEFAULT_ZOOM,
    MAPBOX_STATIC_BASE_URL,
};
pub use types::{AsyncProvider, FetchError};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

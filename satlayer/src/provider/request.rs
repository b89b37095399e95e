//! Coordinate-to-URL resolution.
//!
//! Turns a record's coordinates plus the fixed imagery settings into a
//! [`FetchRequest`] for the MapBox Static Images API:
//!
//! `https://api.mapbox.com/styles/v1/{style}/static/{lon},{lat},{zoom}/{size}x{size}?access_token={token}`
//!
//! Coordinates are forwarded as-is. Out-of-range values are for the remote
//! service to reject.

use super::http::loggable_url;

/// Base URL for the MapBox Static Images API.
pub const MAPBOX_STATIC_BASE_URL: &str = "https://api.mapbox.com/styles/v1";

/// Default map style: satellite imagery without labels.
pub const DEFAULT_STYLE: &str = "mapbox/satellite-v9";

/// Default zoom level, close enough to resolve individual buildings.
pub const DEFAULT_ZOOM: u8 = 18;

/// Default square image edge in pixels (standard CNN input size).
pub const DEFAULT_SIZE_PX: u32 = 224;

/// Fixed imagery parameters shared by every request of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageryParams {
    /// MapBox style identifier, e.g. `mapbox/satellite-v9`
    pub style: String,
    /// Zoom level
    pub zoom: u8,
    /// Square image edge in pixels
    pub size_px: u32,
}

impl Default for ImageryParams {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_string(),
            zoom: DEFAULT_ZOOM,
            size_px: DEFAULT_SIZE_PX,
        }
    }
}

/// Immutable description of one image fetch.
#[derive(Clone, PartialEq)]
pub struct FetchRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub style: String,
    pub size_px: u32,
    pub access_token: String,
}

impl FetchRequest {
    /// Builds the request for one coordinate pair. Pure and total.
    pub fn resolve(
        latitude: f64,
        longitude: f64,
        params: &ImageryParams,
        access_token: &str,
    ) -> Self {
        Self {
            latitude,
            longitude,
            zoom: params.zoom,
            style: params.style.clone(),
            size_px: params.size_px,
            access_token: access_token.to_string(),
        }
    }

    /// Renders the full request URL, including the access token.
    pub fn url(&self) -> String {
        format!(
            "{}/{}/static/{},{},{}/{}x{}?access_token={}",
            MAPBOX_STATIC_BASE_URL,
            self.style,
            self.longitude,
            self.latitude,
            self.zoom,
            self.size_px,
            self.size_px,
            self.access_token
        )
    }
}

// Hand-written so the access token stays out of debug output.
impl std::fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRequest")
            .field("url", &loggable_url(&self.url()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let request = FetchRequest::resolve(47.5112, -122.257, &ImageryParams::default(), "pk.test123");

        assert_eq!(
            request.url(),
            "https://api.mapbox.com/styles/v1/mapbox/satellite-v9/static/-122.257,47.5112,18/224x224?access_token=pk.test123"
        );
    }

    #[test]
    fn test_longitude_precedes_latitude() {
        let request = FetchRequest::resolve(1.0, 2.0, &ImageryParams::default(), "t");
        assert!(request.url().contains("/static/2,1,18/"));
    }

    #[test]
    fn test_custom_params() {
        let params = ImageryParams {
            style: "mapbox/satellite-streets-v12".to_string(),
            zoom: 15,
            size_px: 512,
        };
        let request = FetchRequest::resolve(0.5, -0.25, &params, "tok");

        assert_eq!(request.zoom, 15);
        assert_eq!(request.size_px, 512);
        assert_eq!(
            request.url(),
            "https://api.mapbox.com/styles/v1/mapbox/satellite-streets-v12/static/-0.25,0.5,15/512x512?access_token=tok"
        );
    }

    #[test]
    fn test_out_of_range_coordinates_forwarded() {
        let request = FetchRequest::resolve(123.0, -400.0, &ImageryParams::default(), "t");
        assert_eq!(request.latitude, 123.0);
        assert_eq!(request.longitude, -400.0);
        assert!(request.url().contains("/static/-400,123,18/"));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let params = ImageryParams::default();
        assert_eq!(
            FetchRequest::resolve(10.0, 20.0, &params, "t"),
            FetchRequest::resolve(10.0, 20.0, &params, "t")
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let request = FetchRequest::resolve(1.0, 2.0, &ImageryParams::default(), "pk.secret");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("pk.secret"));
        assert!(debug.contains("satellite-v9"));
    }
}

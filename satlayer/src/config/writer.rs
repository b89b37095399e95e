//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let access_token = config.mapbox.access_token.as_deref().unwrap_or("");
    let throttle_skipped = if config.acquisition.throttle_skipped {
        "true"
    } else {
        "false"
    };

    format!(
        r#"[mapbox]
; MapBox access token (the MAPBOX_TOKEN environment variable takes precedence)
; Get one at: https://account.mapbox.com/access-tokens/
access_token = {}
; Map style used for static images
style = {}
; Zoom level (0-22); 18 resolves individual buildings
zoom = {}
; Square image edge in pixels (1-1280)
size = {}

[acquisition]
; Dataset root; images are written to <base_dir>/images/<split>/<id>.jpg
base_dir = {}
; HTTP timeout per request in seconds
timeout = {}
; Spacing between requests in milliseconds
request_interval_ms = {}
; Also pause after records whose image already exists
throttle_skipped = {}
; Records fetched concurrently (1 = sequential)
concurrency = {}
; Rate limiter: fixed (pause after each request) or token_bucket (shared, for concurrency > 1)
rate_limiter = {}

[logging]
; Log file location
file = {}
"#,
        access_token,
        config.mapbox.style,
        config.mapbox.zoom,
        config.mapbox.size,
        path_to_string(&config.acquisition.base_dir),
        config.acquisition.timeout,
        config.acquisition.request_interval_ms,
        throttle_skipped,
        config.acquisition.concurrency,
        config.acquisition.rate_limiter,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_all_sections() {
        let text = to_config_string(&ConfigFile::default());
        assert!(text.contains("[mapbox]"));
        assert!(text.contains("[acquisition]"));
        assert!(text.contains("[logging]"));
        assert!(text.contains("style = mapbox/satellite-v9"));
        assert!(text.contains("rate_limiter = fixed"));
    }

    #[test]
    fn test_blank_token_written_empty() {
        let text = to_config_string(&ConfigFile::default());
        assert!(text.contains("access_token = \n"));
    }
}

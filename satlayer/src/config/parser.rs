//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::{MAX_CONCURRENCY, MAX_SIZE_PX, MAX_TIMEOUT_SECS, MAX_ZOOM};
use super::file::ConfigError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigError> {
    let mut config = ConfigFile::default();

    // [mapbox] section
    if let Some(section) = ini.section(Some("mapbox")) {
        if let Some(v) = section.get("access_token") {
            let v = v.trim();
            if !v.is_empty() {
                config.mapbox.access_token = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("style") {
            let v = v.trim();
            if v.is_empty() || v.contains('?') {
                return Err(invalid("mapbox", "style", v, "expected an id like 'mapbox/satellite-v9'"));
            }
            config.mapbox.style = v.to_string();
        }
        if let Some(v) = section.get("zoom") {
            config.mapbox.zoom = parse_bounded("mapbox", "zoom", v, 0, MAX_ZOOM)?;
        }
        if let Some(v) = section.get("size") {
            config.mapbox.size = parse_bounded("mapbox", "size", v, 1, MAX_SIZE_PX)?;
        }
    }

    // [acquisition] section
    if let Some(section) = ini.section(Some("acquisition")) {
        if let Some(v) = section.get("base_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.acquisition.base_dir = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("timeout") {
            config.acquisition.timeout = parse_bounded("acquisition", "timeout", v, 1, MAX_TIMEOUT_SECS)?;
        }
        if let Some(v) = section.get("request_interval_ms") {
            config.acquisition.request_interval_ms = v.trim().parse().map_err(|_| {
                invalid(
                    "acquisition",
                    "request_interval_ms",
                    v,
                    "must be a non-negative integer (milliseconds)",
                )
            })?;
        }
        if let Some(v) = section.get("throttle_skipped") {
            config.acquisition.throttle_skipped = parse_bool(v).ok_or_else(|| {
                invalid("acquisition", "throttle_skipped", v, "must be true or false")
            })?;
        }
        if let Some(v) = section.get("concurrency") {
            config.acquisition.concurrency =
                parse_bounded("acquisition", "concurrency", v, 1, MAX_CONCURRENCY)?;
        }
        if let Some(v) = section.get("rate_limiter") {
            config.acquisition.rate_limiter = v.parse().map_err(|_| {
                invalid(
                    "acquisition",
                    "rate_limiter",
                    v,
                    "must be 'fixed' or 'token_bucket'",
                )
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bounded<T>(section: &str, key: &str, value: &str, min: T, max: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + std::fmt::Display,
{
    let reason = || format!("must be an integer between {} and {}", min, max);

    let parsed: T = value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, &reason()))?;
    if parsed < min || parsed > max {
        return Err(invalid(section, key, value, &reason()));
    }
    Ok(parsed)
}

/// Parse a boolean value, accepting the usual spellings.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand ~ to home directory in paths.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimiterKind;

    fn parse(text: &str) -> Result<ConfigFile, ConfigError> {
        parse_ini(&Ini::load_from_str(text).unwrap())
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_full_ini() {
        let config = parse(
            "[mapbox]\naccess_token = pk.abc\nstyle = mapbox/satellite-streets-v12\nzoom = 16\nsize = 512\n\
             [acquisition]\nbase_dir = /datasets/houses\ntimeout = 20\nrequest_interval_ms = 50\n\
             throttle_skipped = yes\nconcurrency = 4\nrate_limiter = token_bucket\n\
             [logging]\nfile = /tmp/sat.log\n",
        )
        .unwrap();

        assert_eq!(config.mapbox.access_token.as_deref(), Some("pk.abc"));
        assert_eq!(config.mapbox.style, "mapbox/satellite-streets-v12");
        assert_eq!(config.mapbox.zoom, 16);
        assert_eq!(config.mapbox.size, 512);
        assert_eq!(config.acquisition.base_dir, PathBuf::from("/datasets/houses"));
        assert_eq!(config.acquisition.timeout, 20);
        assert_eq!(config.acquisition.request_interval_ms, 50);
        assert!(config.acquisition.throttle_skipped);
        assert_eq!(config.acquisition.concurrency, 4);
        assert_eq!(config.acquisition.rate_limiter, RateLimiterKind::TokenBucket);
        assert_eq!(config.logging.file, PathBuf::from("/tmp/sat.log"));
    }

    #[test]
    fn test_blank_token_is_none() {
        let config = parse("[mapbox]\naccess_token =\n").unwrap();
        assert!(config.mapbox.access_token.is_none());
    }

    #[test]
    fn test_zoom_out_of_range() {
        match parse("[mapbox]\nzoom = 23\n") {
            Err(ConfigError::InvalidValue { section, key, .. }) => {
                assert_eq!(section, "mapbox");
                assert_eq!(key, "zoom");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(parse("[acquisition]\nconcurrency = 0\n").is_err());
    }

    #[test]
    fn test_zero_interval_allowed() {
        let config = parse("[acquisition]\nrequest_interval_ms = 0\n").unwrap();
        assert_eq!(config.acquisition.request_interval_ms, 0);
    }

    #[test]
    fn test_bad_bool_rejected() {
        assert!(parse("[acquisition]\nthrottle_skipped = maybe\n").is_err());
    }

    #[test]
    fn test_bad_limiter_rejected() {
        assert!(parse("[acquisition]\nrate_limiter = leaky\n").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn test_error_message_names_range() {
        let err = parse("[acquisition]\ntimeout = 0\n").unwrap_err();
        assert!(err.to_string().contains("must be an integer between 1 and 3600"));
    }
}

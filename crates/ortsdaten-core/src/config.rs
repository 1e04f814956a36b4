use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::{catalog, ConfigError};

const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_PLACES_API_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid, or if the commercial
/// places source is enabled without an API key.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid, or if the commercial
/// places source is enabled without an API key.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{other}\""),
            }),
        }
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let use_google_places = parse_bool("ORTSDATEN_USE_GOOGLE_PLACES", "false")?;
    let google_api_key = lookup("ORTSDATEN_GOOGLE_API_KEY").ok();
    let unsplash_api_key = lookup("ORTSDATEN_UNSPLASH_API_KEY").ok();
    let pixabay_api_key = lookup("ORTSDATEN_PIXABAY_API_KEY").ok();

    if use_google_places && google_api_key.is_none() {
        return Err(ConfigError::MissingCommercialKey);
    }

    let categories = match lookup("ORTSDATEN_CATEGORIES") {
        Ok(raw) => {
            let parsed: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            if parsed.is_empty() {
                return Err(ConfigError::InvalidEnvVar {
                    var: "ORTSDATEN_CATEGORIES".to_string(),
                    reason: "category list is empty".to_string(),
                });
            }
            parsed
        }
        Err(_) => catalog::DEFAULT_CATEGORIES
            .iter()
            .map(|c| (*c).to_owned())
            .collect(),
    };

    let request_delay_ms = parse_u64("ORTSDATEN_REQUEST_DELAY_MS", "1500")?;
    let batch_size = parse_usize("ORTSDATEN_BATCH_SIZE", "3")?;
    if batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ORTSDATEN_BATCH_SIZE".to_string(),
            reason: "batch size must be at least 1".to_string(),
        });
    }
    let max_retries = parse_u32("ORTSDATEN_MAX_RETRIES", "3")?;
    let request_timeout_secs = parse_u64("ORTSDATEN_REQUEST_TIMEOUT_SECS", "180")?;
    let user_agent = or_default("ORTSDATEN_USER_AGENT", "ortsdaten/0.1 (places-ingestion)");
    let output_dir = PathBuf::from(or_default("ORTSDATEN_OUTPUT_DIR", "./data/json_output"));
    let log_level = or_default("ORTSDATEN_LOG_LEVEL", "info");
    let overpass_url = or_default("ORTSDATEN_OVERPASS_URL", DEFAULT_OVERPASS_URL);
    let places_api_url = or_default("ORTSDATEN_PLACES_API_URL", DEFAULT_PLACES_API_URL);

    Ok(AppConfig {
        use_google_places,
        google_api_key,
        unsplash_api_key,
        pixabay_api_key,
        categories,
        request_delay_ms,
        batch_size,
        max_retries,
        request_timeout_secs,
        user_agent,
        output_dir,
        log_level,
        overpass_url,
        places_api_url,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn defaults_apply_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(!cfg.use_google_places);
        assert!(cfg.google_api_key.is_none());
        assert_eq!(cfg.categories.len(), catalog::DEFAULT_CATEGORIES.len());
        assert_eq!(cfg.request_delay_ms, 1500);
        assert_eq!(cfg.batch_size, 3);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.request_timeout_secs, 180);
        assert_eq!(cfg.user_agent, "ortsdaten/0.1 (places-ingestion)");
        assert_eq!(cfg.output_dir, PathBuf::from("./data/json_output"));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.overpass_url, DEFAULT_OVERPASS_URL);
        assert_eq!(cfg.places_api_url, DEFAULT_PLACES_API_URL);
    }

    #[test]
    fn commercial_mode_without_key_is_fatal() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_USE_GOOGLE_PLACES", "true");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingCommercialKey)),
            "expected MissingCommercialKey, got: {result:?}"
        );
    }

    #[test]
    fn commercial_mode_with_key_succeeds() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_USE_GOOGLE_PLACES", "true");
        map.insert("ORTSDATEN_GOOGLE_API_KEY", "test-key");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.use_google_places);
        assert_eq!(cfg.google_api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn invalid_bool_is_rejected() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_USE_GOOGLE_PLACES", "maybe");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ORTSDATEN_USE_GOOGLE_PLACES"),
            "expected InvalidEnvVar(ORTSDATEN_USE_GOOGLE_PLACES), got: {result:?}"
        );
    }

    #[test]
    fn categories_are_parsed_from_comma_separated_list() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_CATEGORIES", "cafe, restaurant ,bar");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.categories, vec!["cafe", "restaurant", "bar"]);
    }

    #[test]
    fn empty_category_list_is_rejected() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_CATEGORIES", " , ,");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ORTSDATEN_CATEGORIES"),
            "expected InvalidEnvVar(ORTSDATEN_CATEGORIES), got: {result:?}"
        );
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_BATCH_SIZE", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ORTSDATEN_BATCH_SIZE"),
            "expected InvalidEnvVar(ORTSDATEN_BATCH_SIZE), got: {result:?}"
        );
    }

    #[test]
    fn numeric_overrides_are_applied() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_REQUEST_DELAY_MS", "250");
        map.insert("ORTSDATEN_BATCH_SIZE", "5");
        map.insert("ORTSDATEN_MAX_RETRIES", "1");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.request_delay_ms, 250);
        assert_eq!(cfg.batch_size, 5);
        assert_eq!(cfg.max_retries, 1);
    }

    #[test]
    fn invalid_max_retries_is_rejected() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_MAX_RETRIES", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ORTSDATEN_MAX_RETRIES"),
            "expected InvalidEnvVar(ORTSDATEN_MAX_RETRIES), got: {result:?}"
        );
    }

    #[test]
    fn endpoint_overrides_are_applied() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_OVERPASS_URL", "http://127.0.0.1:9999/interpreter");
        map.insert("ORTSDATEN_PLACES_API_URL", "http://127.0.0.1:9998");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.overpass_url, "http://127.0.0.1:9999/interpreter");
        assert_eq!(cfg.places_api_url, "http://127.0.0.1:9998");
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut map = HashMap::new();
        map.insert("ORTSDATEN_GOOGLE_API_KEY", "super-secret");
        map.insert("ORTSDATEN_UNSPLASH_API_KEY", "also-secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("also-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}

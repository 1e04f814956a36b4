use std::path::PathBuf;

/// Resolved application configuration. Built by
/// [`crate::config::load_app_config`] from `ORTSDATEN_*` environment
/// variables.
#[derive(Clone)]
pub struct AppConfig {
    /// When true, scrape through the commercial places API instead of
    /// the free tag-based geodata service. Requires `google_api_key`.
    pub use_google_places: bool,
    pub google_api_key: Option<String>,
    pub unsplash_api_key: Option<String>,
    pub pixabay_api_key: Option<String>,
    /// Scrape categories. Defaults to the full catalog set.
    pub categories: Vec<String>,
    /// Pacing delay between category requests within one city task.
    pub request_delay_ms: u64,
    /// Number of cities scraped concurrently per batch.
    pub batch_size: usize,
    /// Attempt bound for timed-out tag-based requests.
    pub max_retries: u32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub output_dir: PathBuf,
    pub log_level: String,
    /// Override for the Overpass interpreter endpoint (tests).
    pub overpass_url: String,
    /// Override for the commercial places API base URL (tests).
    pub places_api_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("use_google_places", &self.use_google_places)
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "unsplash_api_key",
                &self.unsplash_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "pixabay_api_key",
                &self.pixabay_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("categories", &self.categories)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("batch_size", &self.batch_size)
            .field("max_retries", &self.max_retries)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("output_dir", &self.output_dir)
            .field("log_level", &self.log_level)
            .field("overpass_url", &self.overpass_url)
            .field("places_api_url", &self.places_api_url)
            .finish()
    }
}

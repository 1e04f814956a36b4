//! Construction-time selection between the two source adapters.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use ortsdaten_core::AppConfig;

use crate::error::ScrapeError;
use crate::images::ImageResolver;
use crate::overpass::{OverpassAdapter, RetryPolicy};
use crate::places_api::PlacesApiAdapter;
use crate::rate_limit::SourceRateLimiter;
use crate::types::{PlaceRecord, ScrapeJob, UsageStats};

/// The active source backend, chosen once from configuration. Both
/// variants expose the same capability: turn a job into normalized
/// records, absorbing per-job failures.
pub enum SourceAdapter {
    TagBased(OverpassAdapter),
    Commercial(PlacesApiAdapter),
}

impl SourceAdapter {
    /// Builds the adapter selected by `config.use_google_places`,
    /// wiring in the shared rate limiter and usage counters.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] when commercial mode is
    /// selected without an API key, or [`ScrapeError::Http`] when the
    /// HTTP client cannot be constructed.
    pub fn from_config(
        config: &AppConfig,
        limiter: Arc<SourceRateLimiter>,
        usage: Arc<Mutex<UsageStats>>,
    ) -> Result<Self, ScrapeError> {
        if config.use_google_places {
            let api_key = config.google_api_key.as_deref().ok_or_else(|| {
                ScrapeError::Config(
                    "commercial places source enabled without an API key".to_owned(),
                )
            })?;
            let adapter = PlacesApiAdapter::new(
                &config.places_api_url,
                api_key,
                config.request_timeout_secs,
                &config.user_agent,
                usage,
            )?;
            Ok(Self::Commercial(adapter))
        } else {
            let images = ImageResolver::new(
                reqwest::Client::new(),
                config.unsplash_api_key.clone(),
                config.pixabay_api_key.clone(),
                Arc::clone(&limiter),
            );
            let adapter = OverpassAdapter::new(
                &config.overpass_url,
                config.request_timeout_secs,
                &config.user_agent,
                RetryPolicy {
                    max_attempts: config.max_retries.max(1),
                    ..RetryPolicy::default()
                },
                Duration::from_millis(config.request_delay_ms),
                limiter,
                images,
            )?;
            Ok(Self::TagBased(adapter))
        }
    }

    /// Fetches and normalizes all places for one job. Per-job failures
    /// are absorbed by the adapters; this never errors.
    pub async fn fetch(&self, job: &ScrapeJob) -> Vec<PlaceRecord> {
        match self {
            Self::TagBased(adapter) => adapter.fetch_places(job).await,
            Self::Commercial(adapter) => adapter.fetch_places(job).await,
        }
    }
}

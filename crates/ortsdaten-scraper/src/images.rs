//! Best-effort image resolution for scraped places.
//!
//! Tries premium photo APIs in order (Unsplash by category, then
//! Pixabay by "category city") and falls back to a static
//! per-category placeholder. Every network failure is swallowed and
//! treated as "no result" — resolution must never escalate the
//! pipeline's error level.

use std::sync::Arc;
use std::time::Duration;

use crate::rate_limit::SourceRateLimiter;

const DEFAULT_UNSPLASH_URL: &str = "https://api.unsplash.com";
const DEFAULT_PIXABAY_URL: &str = "https://pixabay.com/api/";

/// Minimum spacing between calls to the same premium photo API.
const PREMIUM_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Static placeholder images keyed by app category.
const PLACEHOLDER_URLS: &[(&str, &str)] = &[
    (
        "cafe",
        "https://images.unsplash.com/photo-1554118811-1e0d58224f24?w=400",
    ),
    (
        "restaurant",
        "https://images.unsplash.com/photo-1517248135467-4c7edcad34c4?w=400",
    ),
    (
        "bar",
        "https://images.unsplash.com/photo-1566417713940-fe7c737a9ef2?w=400",
    ),
    (
        "library",
        "https://images.unsplash.com/photo-1521587760476-6c12a4b040da?w=400",
    ),
    (
        "hotel_lobby",
        "https://images.unsplash.com/photo-1564501049412-61c2a3083791?w=400",
    ),
    (
        "coworking",
        "https://images.unsplash.com/photo-1497366216548-37526070297c?w=400",
    ),
];

const DEFAULT_PLACEHOLDER_URL: &str =
    "https://images.unsplash.com/photo-1519167758481-83f29da8c2f0?w=400";

/// Static placeholder URL for an app category, with a generic default
/// for categories that have none.
#[must_use]
pub fn placeholder_url(category: &str) -> &'static str {
    PLACEHOLDER_URLS
        .iter()
        .find(|(c, _)| *c == category)
        .map_or(DEFAULT_PLACEHOLDER_URL, |(_, url)| url)
}

pub struct ImageResolver {
    client: reqwest::Client,
    unsplash_key: Option<String>,
    pixabay_key: Option<String>,
    unsplash_url: String,
    pixabay_url: String,
    limiter: Arc<SourceRateLimiter>,
}

impl ImageResolver {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        unsplash_key: Option<String>,
        pixabay_key: Option<String>,
        limiter: Arc<SourceRateLimiter>,
    ) -> Self {
        Self {
            client,
            unsplash_key,
            pixabay_key,
            unsplash_url: DEFAULT_UNSPLASH_URL.to_owned(),
            pixabay_url: DEFAULT_PIXABAY_URL.to_owned(),
            limiter,
        }
    }

    /// Points the premium endpoints at custom base URLs (for testing
    /// with wiremock).
    #[must_use]
    pub fn with_base_urls(mut self, unsplash_url: &str, pixabay_url: &str) -> Self {
        self.unsplash_url = unsplash_url.trim_end_matches('/').to_owned();
        self.pixabay_url = pixabay_url.to_owned();
        self
    }

    /// Resolves an image URL for a place. Always returns a URL: the
    /// premium chain falls through to the category placeholder.
    pub async fn resolve(&self, category: &str, city: &str) -> String {
        if self.unsplash_key.is_some() {
            if let Some(url) = self.unsplash_image(category).await {
                return url;
            }
        }

        if self.pixabay_key.is_some() {
            if let Some(url) = self.pixabay_image(&format!("{category} {city}")).await {
                return url;
            }
        }

        placeholder_url(category).to_owned()
    }

    async fn unsplash_image(&self, query: &str) -> Option<String> {
        let key = self.unsplash_key.as_deref()?;
        self.limiter.wait("unsplash", PREMIUM_MIN_INTERVAL).await;

        let url = format!("{}/photos/random", self.unsplash_url);
        let result = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("client_id", key),
                ("w", "400"),
                ("h", "300"),
            ])
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                let body: serde_json::Value = resp.json().await.ok()?;
                body.get("urls")?
                    .get("small")?
                    .as_str()
                    .map(str::to_owned)
            }
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), query, "unsplash lookup failed");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, query, "unsplash lookup failed");
                None
            }
        }
    }

    async fn pixabay_image(&self, query: &str) -> Option<String> {
        let key = self.pixabay_key.as_deref()?;
        self.limiter.wait("pixabay", PREMIUM_MIN_INTERVAL).await;

        let result = self
            .client
            .get(&self.pixabay_url)
            .query(&[
                ("key", key),
                ("q", query),
                ("image_type", "photo"),
                ("per_page", "3"),
            ])
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                let body: serde_json::Value = resp.json().await.ok()?;
                body.get("hits")?
                    .as_array()?
                    .first()?
                    .get("webformatURL")?
                    .as_str()
                    .map(str::to_owned)
            }
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), query, "pixabay lookup failed");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, query, "pixabay lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_covers_known_categories() {
        assert!(placeholder_url("cafe").contains("photo-1554118811"));
        assert!(placeholder_url("coworking").contains("photo-1497366216548"));
    }

    #[test]
    fn placeholder_defaults_for_unknown_category() {
        assert_eq!(placeholder_url("service_station"), DEFAULT_PLACEHOLDER_URL);
        assert_eq!(placeholder_url(""), DEFAULT_PLACEHOLDER_URL);
    }

    #[tokio::test]
    async fn resolve_without_keys_returns_placeholder() {
        let resolver = ImageResolver::new(
            reqwest::Client::new(),
            None,
            None,
            Arc::new(SourceRateLimiter::new()),
        );
        let url = resolver.resolve("cafe", "Marburg").await;
        assert_eq!(url, placeholder_url("cafe"));
    }
}

//! Source adapter for the free tag-based geodata service (Overpass).
//!
//! One POST per (city, category) job. The query selects nodes and
//! ways matching the category's tag predicates inside the named
//! administrative area, with `out center` so ways carry a usable
//! centroid. Failures are handled per the pipeline's partial-failure
//! policy: a job that cannot be completed yields zero records and a
//! log line, never an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;

use ortsdaten_core::{catalog, geo};

use crate::error::ScrapeError;
use crate::images::ImageResolver;
use crate::rate_limit::SourceRateLimiter;
use crate::types::{DataSource, OpeningHours, PlaceRecord, ScrapeJob};

/// Rate-limiter key for the Overpass upstream.
const SOURCE_KEY: &str = "overpass";

/// Server-side timeout hint embedded in every query, seconds.
const QUERY_TIMEOUT_SECS: u32 = 180;

/// Retry behavior for tag-based jobs.
///
/// `max_attempts` bounds timed-out requests; the throttle pause for
/// HTTP 429 does not count against it (server-side throttling is not
/// a transient fault). Non-200 statuses other than 429 abandon the
/// job immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total request attempts for a job whose requests time out.
    pub max_attempts: u32,
    /// Pause between timed-out attempts.
    pub timeout_backoff: Duration,
    /// Pause before retrying after HTTP 429.
    pub throttle_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_backoff: Duration::from_secs(5),
            throttle_backoff: Duration::from_secs(60),
        }
    }
}

/// Raw Overpass response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// One raw element. Nodes carry `lat`/`lon` directly; ways carry a
/// nested `center` (from `out center`).
#[derive(Debug, Deserialize)]
pub(crate) struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<ElementCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ElementCenter {
    pub lat: f64,
    pub lon: f64,
}

/// Enrichment fields pulled out of the free-form tag map. Keeps the
/// stringly-typed upstream payload out of the rest of the pipeline.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct TagEnrichment {
    pub address: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
}

pub struct OverpassAdapter {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
    min_interval: Duration,
    limiter: Arc<SourceRateLimiter>,
    images: ImageResolver,
}

impl OverpassAdapter {
    /// Creates an adapter against `endpoint` (production interpreter
    /// URL, or a mock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        endpoint: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
        min_interval: Duration,
        limiter: Arc<SourceRateLimiter>,
        images: ImageResolver,
    ) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
            retry,
            min_interval,
            limiter,
            images,
        })
    }

    /// Fetches and normalizes all places for one job.
    ///
    /// Never returns an error: timed-out jobs are retried up to the
    /// policy bound and then abandoned with a warning; 429 pauses and
    /// retries in place; any other non-200 abandons immediately.
    pub async fn fetch_places(&self, job: &ScrapeJob) -> Vec<PlaceRecord> {
        let query = build_query(&job.city, &job.category);
        let mut attempt = 0u32;

        while attempt < self.retry.max_attempts {
            self.limiter.wait(SOURCE_KEY, self.min_interval).await;

            let result = self
                .client
                .post(&self.endpoint)
                .body(query.clone())
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let body = match resp.json::<OverpassResponse>().await {
                        Ok(body) => body,
                        Err(e) => {
                            tracing::warn!(
                                city = %job.city,
                                category = %job.category,
                                error = %e,
                                "unparseable tag-based response — abandoning job"
                            );
                            return Vec::new();
                        }
                    };
                    return self.normalize_elements(body, job).await;
                }
                Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    // Server-side throttling, not a transient fault:
                    // pause and retry without charging the attempt bound.
                    tracing::warn!(
                        city = %job.city,
                        category = %job.category,
                        backoff_secs = self.retry.throttle_backoff.as_secs(),
                        "tag-based upstream throttled us — pausing"
                    );
                    tokio::time::sleep(self.retry.throttle_backoff).await;
                }
                Ok(resp) => {
                    tracing::warn!(
                        city = %job.city,
                        category = %job.category,
                        status = resp.status().as_u16(),
                        "unexpected status from tag-based upstream — abandoning job"
                    );
                    return Vec::new();
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    attempt += 1;
                    if attempt < self.retry.max_attempts {
                        tracing::warn!(
                            city = %job.city,
                            category = %job.category,
                            attempt,
                            max_attempts = self.retry.max_attempts,
                            "tag-based request timed out — retrying"
                        );
                        tokio::time::sleep(self.retry.timeout_backoff).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        city = %job.city,
                        category = %job.category,
                        error = %e,
                        "tag-based request failed — abandoning job"
                    );
                    return Vec::new();
                }
            }
        }

        tracing::warn!(
            city = %job.city,
            category = %job.category,
            attempts = self.retry.max_attempts,
            "tag-based job abandoned after exhausting attempts"
        );
        Vec::new()
    }

    async fn normalize_elements(
        &self,
        response: OverpassResponse,
        job: &ScrapeJob,
    ) -> Vec<PlaceRecord> {
        let app_category = catalog::app_category(&job.category).to_owned();
        let city_alternatives: Vec<String> = catalog::alternate_names(&job.city)
            .iter()
            .map(|s| (*s).to_owned())
            .collect();

        let mut dropped = 0usize;
        let mut records = Vec::new();

        for element in response.elements {
            let Some((lat, lon)) = element_coordinates(&element) else {
                dropped += 1;
                continue;
            };
            if !geo::GERMANY_BOUNDS.contains(lat, lon) {
                dropped += 1;
                continue;
            }
            let Some(name) = display_name(&element.tags) else {
                dropped += 1;
                continue;
            };

            let enrichment = extract_enrichment(&element.tags);
            let image_url = self.images.resolve(&app_category, &job.city).await;

            records.push(PlaceRecord {
                description: format!("{name} in {}", job.city),
                name,
                address: enrichment.address,
                city: job.city.clone(),
                city_alternatives: city_alternatives.clone(),
                postal_code: enrichment.postal_code,
                latitude: lat,
                longitude: lon,
                category: app_category.clone(),
                image_url: Some(image_url),
                rating: None,
                phone: enrichment.phone,
                website: enrichment.website,
                opening_hours: enrichment.opening_hours.map(OpeningHours::Text),
                price_level: None,
                user_ratings_total: None,
                business_status: Some("OPERATIONAL".to_owned()),
                osm_id: Some(element.id),
                google_place_id: None,
                scraped_at: Utc::now(),
                data_source: DataSource::TagBased,
            });
        }

        if dropped > 0 {
            tracing::debug!(
                city = %job.city,
                category = %job.category,
                dropped,
                kept = records.len(),
                "dropped malformed tag-based elements"
            );
        }
        records
    }
}

/// Tag predicates for a scrape category: `(tag key, tag value)` pairs,
/// each expanded into a node and a way selector.
fn category_predicates(category: &str) -> Vec<(&'static str, String)> {
    match category {
        "hotel" => vec![("tourism", "hotel".to_owned())],
        "gym" => vec![("leisure", "fitness_centre".to_owned())],
        "spa" => vec![("leisure", "spa".to_owned())],
        other => vec![("amenity", other.to_owned())],
    }
}

/// Builds the Overpass QL query for one job: JSON output, a 180s
/// server-side timeout hint, area matched by exact administrative
/// name, and `out center` for way centroids.
pub(crate) fn build_query(city: &str, category: &str) -> String {
    let selectors: String = category_predicates(category)
        .iter()
        .flat_map(|(key, value)| {
            [
                format!("node[\"{key}\"=\"{value}\"](area.a);"),
                format!("way[\"{key}\"=\"{value}\"](area.a);"),
            ]
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "[out:json][timeout:{QUERY_TIMEOUT_SECS}];\n\
         area[\"name\"=\"{city}\"]->.a;\n\
         ({selectors});\n\
         out center;"
    )
}

/// Coordinates for an element: node lat/lon, or the way centroid.
pub(crate) fn element_coordinates(element: &OverpassElement) -> Option<(f64, f64)> {
    match element.kind.as_str() {
        "node" => Some((element.lat?, element.lon?)),
        "way" => element.center.as_ref().map(|c| (c.lat, c.lon)),
        _ => None,
    }
}

/// Display name from the tag map: `name`, falling back to `operator`.
/// Names shorter than two characters are treated as absent.
pub(crate) fn display_name(tags: &HashMap<String, String>) -> Option<String> {
    let name = tags
        .get("name")
        .filter(|n| !n.trim().is_empty())
        .or_else(|| tags.get("operator"))?
        .trim();
    if name.chars().count() < 2 {
        return None;
    }
    Some(name.to_owned())
}

/// Pure extraction of the normalized enrichment fields from the
/// free-form tag map.
pub(crate) fn extract_enrichment(tags: &HashMap<String, String>) -> TagEnrichment {
    let get = |key: &str| tags.get(key).cloned();
    TagEnrichment {
        address: get("addr:street").unwrap_or_default(),
        postal_code: get("addr:postcode").unwrap_or_default(),
        phone: get("phone").or_else(|| get("contact:phone")),
        website: get("website").or_else(|| get("contact:website")),
        opening_hours: get("opening_hours"),
    }
}

//! Source adapter for the paid commercial places API.
//!
//! Two-stage fetch per job: a nearby search around the national
//! center, then a details call per result. Every upstream call
//! increments the shared [`UsageStats`] counters so the orchestrator
//! can report estimated spend. Unlike the tag-based adapter there is
//! no retry/backoff here — a transient failure yields zero records
//! for the job and a log line.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;

use ortsdaten_core::{catalog, geo};

use crate::error::ScrapeError;
use crate::types::{DataSource, OpeningHours, PlaceRecord, ScrapeJob, UsageStats};

/// Search radius around the city-center coordinate, meters.
const NEARBY_RADIUS_M: u32 = 5000;

/// Cap on nearby-search results processed per job.
const MAX_RESULTS_PER_SEARCH: usize = 20;

/// Pacing delay between consecutive details calls.
const DETAILS_PACING: Duration = Duration::from_millis(100);

/// Width requested through the photo URL template.
const PHOTO_MAX_WIDTH: u32 = 400;

/// Photos are resolved through a deterministic URL template against
/// the production host — no extra network call is made, so this does
/// not go through the test-injectable base URL.
const PHOTO_URL_BASE: &str = "https://maps.googleapis.com/maps/api/place/photo";

const DETAILS_FIELDS: &str = "name,formatted_address,geometry,formatted_phone_number,website,\
                              opening_hours,rating,user_ratings_total,price_level,photos,\
                              business_status";

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    name: Option<String>,
    formatted_address: Option<String>,
    geometry: Option<Geometry>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
    opening_hours: Option<OpeningHoursInfo>,
    rating: Option<f64>,
    user_ratings_total: Option<u64>,
    price_level: Option<u8>,
    #[serde(default)]
    photos: Vec<Photo>,
    business_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct OpeningHoursInfo {
    weekday_text: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: Option<String>,
}

/// Commercial place type for a scrape category, defaulting to the
/// generic point-of-interest type.
#[must_use]
pub fn place_type(category: &str) -> &'static str {
    match category {
        "cafe" => "cafe",
        "restaurant" | "fast_food" => "restaurant",
        "bar" | "pub" | "biergarten" => "bar",
        "hotel" => "lodging",
        "library" => "library",
        "university" => "university",
        "cinema" => "movie_theater",
        "fuel" => "gas_station",
        "gym" => "gym",
        "spa" => "spa",
        "hospital" => "hospital",
        "community_centre" => "community_center",
        _ => "point_of_interest",
    }
}

pub struct PlacesApiAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    usage: Arc<Mutex<UsageStats>>,
}

impl PlacesApiAdapter {
    /// Creates an adapter against `base_url` (the production
    /// `…/maps/api/place` prefix, or a mock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        usage: Arc<Mutex<UsageStats>>,
    ) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            usage,
        })
    }

    /// Fetches and normalizes all places for one job.
    ///
    /// Never returns an error: a failed search yields zero records, a
    /// failed details call skips only that result. Both are logged.
    pub async fn fetch_places(&self, job: &ScrapeJob) -> Vec<PlaceRecord> {
        let place_ids = match self.nearby_search(&job.category).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    city = %job.city,
                    category = %job.category,
                    error = %e,
                    "commercial nearby search failed — abandoning job"
                );
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        let mut first = true;
        for place_id in place_ids {
            if !first {
                tokio::time::sleep(DETAILS_PACING).await;
            }
            first = false;

            match self.place_details(&place_id).await {
                Ok(Some(details)) => {
                    if let Some(record) = self.normalize_details(&place_id, details, job) {
                        records.push(record);
                    }
                }
                Ok(None) => {
                    tracing::debug!(place_id, "details response had no result");
                }
                Err(e) => {
                    tracing::warn!(
                        place_id,
                        error = %e,
                        "commercial details fetch failed — skipping result"
                    );
                }
            }
        }
        records
    }

    async fn nearby_search(&self, category: &str) -> Result<Vec<String>, ScrapeError> {
        let url = format!("{}/nearbysearch/json", self.base_url);
        let (lat, lng) = geo::GERMANY_CENTER;
        let location = format!("{lat},{lng}");
        let radius = NEARBY_RADIUS_M.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", place_type(category)),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = resp.text().await?;
        let parsed: NearbySearchResponse =
            serde_json::from_str(&body).map_err(|e| ScrapeError::Deserialize {
                context: format!("nearby search for {category}"),
                source: e,
            })?;
        self.usage.lock().await.record_search();

        Ok(parsed
            .results
            .into_iter()
            .take(MAX_RESULTS_PER_SEARCH)
            .map(|r| r.place_id)
            .collect())
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, ScrapeError> {
        let url = format!("{}/details/json", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("place_id", place_id),
                ("fields", DETAILS_FIELDS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = resp.text().await?;
        let parsed: DetailsResponse =
            serde_json::from_str(&body).map_err(|e| ScrapeError::Deserialize {
                context: format!("details for {place_id}"),
                source: e,
            })?;
        self.usage.lock().await.record_details();

        Ok(parsed.result)
    }

    /// Normalizes one details payload, or drops it when the record
    /// invariants (usable name, in-bounds coordinates) cannot be met.
    fn normalize_details(
        &self,
        place_id: &str,
        details: PlaceDetails,
        job: &ScrapeJob,
    ) -> Option<PlaceRecord> {
        let name = details.name.filter(|n| n.trim().chars().count() >= 2)?;
        let location = details.geometry?.location;
        if !geo::GERMANY_BOUNDS.contains(location.lat, location.lng) {
            tracing::debug!(place_id, "dropping out-of-bounds commercial result");
            return None;
        }

        let address = details.formatted_address.unwrap_or_default();
        let image_url = details
            .photos
            .first()
            .and_then(|p| p.photo_reference.as_deref())
            .map(|reference| self.photo_url(reference));
        let opening_hours = details
            .opening_hours
            .and_then(|h| h.weekday_text)
            .map(OpeningHours::WeekdayText);

        Some(PlaceRecord {
            description: format!("{name} in {}", job.city),
            postal_code: geo::extract_postal_code(&address),
            name,
            address,
            city: job.city.clone(),
            city_alternatives: catalog::alternate_names(&job.city)
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            latitude: location.lat,
            longitude: location.lng,
            category: catalog::app_category(&job.category).to_owned(),
            image_url,
            rating: details.rating,
            phone: details.formatted_phone_number,
            website: details.website,
            opening_hours,
            price_level: details.price_level,
            user_ratings_total: details.user_ratings_total,
            business_status: details.business_status,
            osm_id: None,
            google_place_id: Some(place_id.to_owned()),
            scraped_at: Utc::now(),
            data_source: DataSource::Commercial,
        })
    }

    fn photo_url(&self, photo_reference: &str) -> String {
        format!(
            "{PHOTO_URL_BASE}?maxwidth={PHOTO_MAX_WIDTH}&photo_reference={photo_reference}&key={}",
            self.api_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_type_maps_known_categories() {
        assert_eq!(place_type("cafe"), "cafe");
        assert_eq!(place_type("pub"), "bar");
        assert_eq!(place_type("biergarten"), "bar");
        assert_eq!(place_type("hotel"), "lodging");
        assert_eq!(place_type("fuel"), "gas_station");
        assert_eq!(place_type("cinema"), "movie_theater");
    }

    #[test]
    fn place_type_defaults_to_point_of_interest() {
        assert_eq!(place_type("coworking_space"), "point_of_interest");
        assert_eq!(place_type("anything_else"), "point_of_interest");
    }

    #[test]
    fn photo_url_template_is_deterministic() {
        let adapter = PlacesApiAdapter::new(
            "http://localhost:1",
            "test-key",
            5,
            "ortsdaten-test/0.1",
            Arc::new(Mutex::new(UsageStats::default())),
        )
        .unwrap();
        assert_eq!(
            adapter.photo_url("photo-ref-abc"),
            "https://maps.googleapis.com/maps/api/place/photo\
             ?maxwidth=400&photo_reference=photo-ref-abc&key=test-key"
        );
    }
}

//! Normalized record types shared by both source adapters.
//!
//! ## Observed upstream shapes
//!
//! ### Overpass elements
//! `lat`/`lon` sit on the element for nodes but inside a nested
//! `center` object for ways (`out center` geometry). `tags` is a
//! free-text string map; `name` may be missing entirely, in which case
//! `operator` sometimes carries a usable display name.
//!
//! ### Commercial details
//! `opening_hours.weekday_text` is a list of per-day strings, while
//! the Overpass `opening_hours` tag is a single OSM-syntax string.
//! Both forms survive into the output unchanged, so
//! [`OpeningHours`] is an untagged either-type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance of a normalized record. Serialized values match the
/// historical output files (`openstreetmap` / `google_places`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "openstreetmap")]
    TagBased,
    #[serde(rename = "google_places")]
    Commercial,
}

/// One (city, category) unit of scraping work. Created by the
/// orchestrator, consumed once by a source adapter, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeJob {
    pub city: String,
    pub category: String,
}

/// Opening hours in whichever shape the upstream provided: a single
/// OSM-syntax string or a weekday-text list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpeningHours {
    Text(String),
    WeekdayText(Vec<String>),
}

/// Canonical, source-agnostic representation of a point of interest.
///
/// Invariants upheld by the adapters: `latitude`/`longitude` are
/// inside the national bounding box, `name` is at least two
/// characters, and exactly one of `osm_id`/`google_place_id` is set
/// according to `data_source`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    pub address: String,
    pub city: String,
    pub city_alternatives: Vec<String>,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Canonical app category, never the raw upstream tag.
    pub category: String,
    pub description: String,
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    pub price_level: Option<u8>,
    pub user_ratings_total: Option<u64>,
    pub business_status: Option<String>,
    pub osm_id: Option<i64>,
    pub google_place_id: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub data_source: DataSource,
}

/// Per-call cost of a commercial nearby search, USD.
const NEARBY_SEARCH_COST_USD: f64 = 0.032;
/// Per-call cost of a commercial details fetch, USD.
const DETAILS_COST_USD: f64 = 0.017;
/// Monthly free-tier credit, USD.
const FREE_TIER_USD: f64 = 200.0;

/// Running usage counters for the commercial adapter. Mutated after
/// every upstream call, read for progress reporting, never persisted.
#[derive(Debug, Default, Clone, Copy)]
pub struct UsageStats {
    pub searches_performed: u64,
    pub details_fetched: u64,
}

impl UsageStats {
    pub fn record_search(&mut self) {
        self.searches_performed += 1;
    }

    pub fn record_details(&mut self) {
        self.details_fetched += 1;
    }

    /// Estimated spend so far, rounded to cents.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimated_cost_usd(&self) -> f64 {
        let cost = self.searches_performed as f64 * NEARBY_SEARCH_COST_USD
            + self.details_fetched as f64 * DETAILS_COST_USD;
        round_cents(cost)
    }

    /// Remaining free-tier budget, never negative, rounded to cents.
    #[must_use]
    pub fn free_tier_remaining_usd(&self) -> f64 {
        round_cents((FREE_TIER_USD - self.estimated_cost_usd()).max(0.0))
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

//! Coordinate validation and small address helpers.

use std::sync::OnceLock;

use regex::Regex;

/// Inclusive bounding box used to validate scraped coordinates.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// National bounding box for Germany. Boundary values are inclusive.
pub const GERMANY_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 47.0,
    max_lat: 55.1,
    min_lng: 5.8,
    max_lng: 15.0,
};

/// Approximate geographic center of Germany. Used as the search origin
/// for the commercial places adapter (no per-city geocoding is done).
pub const GERMANY_CENTER: (f64, f64) = (51.1657, 10.4515);

impl BoundingBox {
    /// Whether `(lat, lng)` lies inside the box, boundaries included.
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

/// Extracts a German 5-digit postal code from a formatted address,
/// returning an empty string when none is present.
#[must_use]
pub fn extract_postal_code(address: &str) -> String {
    static POSTAL_RE: OnceLock<Regex> = OnceLock::new();
    let re = POSTAL_RE.get_or_init(|| Regex::new(r"\b\d{5}\b").expect("valid regex"));
    re.find(address).map_or_else(String::new, |m| m.as_str().to_owned())
}

//! Integration tests for `PlacesApiAdapter::fetch_places` against a
//! mocked commercial API.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ortsdaten_scraper::{DataSource, OpeningHours, PlacesApiAdapter, ScrapeJob, UsageStats};

fn test_adapter(base_url: &str) -> (PlacesApiAdapter, Arc<Mutex<UsageStats>>) {
    let usage = Arc::new(Mutex::new(UsageStats::default()));
    let adapter = PlacesApiAdapter::new(
        base_url,
        "test-key",
        5,
        "ortsdaten-test/0.1",
        Arc::clone(&usage),
    )
    .expect("failed to build test PlacesApiAdapter");
    (adapter, usage)
}

fn berlin_cafe_job() -> ScrapeJob {
    ScrapeJob {
        city: "Berlin".to_owned(),
        category: "cafe".to_owned(),
    }
}

fn details_body(name: &str, lat: f64, lng: f64) -> serde_json::Value {
    json!({
        "result": {
            "name": name,
            "formatted_address": "Unter den Linden 1, 10117 Berlin",
            "geometry": { "location": { "lat": lat, "lng": lng } },
            "rating": 4.4,
            "user_ratings_total": 312,
            "price_level": 2,
            "opening_hours": { "weekday_text": ["Monday: 9:00 AM – 6:00 PM"] },
            "photos": [{ "photo_reference": "ref-1" }],
            "business_status": "OPERATIONAL"
        }
    })
}

#[tokio::test]
async fn failed_details_skips_only_that_result_and_usage_tracks_successes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("type", "cafe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "results": [
                { "place_id": "id-a" },
                { "place_id": "id-b" },
                { "place_id": "id-c" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "id-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&details_body(
            "Café Einstein",
            52.5163,
            13.3777,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "id-b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "id-c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&details_body(
            "Balzac Coffee",
            52.5200,
            13.4050,
        )))
        .mount(&server)
        .await;

    let (adapter, usage) = test_adapter(&server.uri());
    let records = adapter.fetch_places(&berlin_cafe_job()).await;

    assert_eq!(records.len(), 2, "the failed details call drops one result");
    assert_eq!(records[0].name, "Café Einstein");
    assert_eq!(records[1].name, "Balzac Coffee");

    let stats = *usage.lock().await;
    assert_eq!(stats.searches_performed, 1);
    assert_eq!(stats.details_fetched, 2, "failed details calls are not billed");
}

#[tokio::test]
async fn records_carry_commercial_enrichment_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "results": [{ "place_id": "id-a" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&details_body(
            "Café Einstein",
            52.5163,
            13.3777,
        )))
        .mount(&server)
        .await;

    let (adapter, _usage) = test_adapter(&server.uri());
    let records = adapter.fetch_places(&berlin_cafe_job()).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.data_source, DataSource::Commercial);
    assert_eq!(record.google_place_id.as_deref(), Some("id-a"));
    assert_eq!(record.osm_id, None);
    assert_eq!(record.postal_code, "10117");
    assert_eq!(record.rating, Some(4.4));
    assert_eq!(record.user_ratings_total, Some(312));
    assert_eq!(record.price_level, Some(2));
    assert_eq!(
        record.opening_hours,
        Some(OpeningHours::WeekdayText(vec![
            "Monday: 9:00 AM – 6:00 PM".to_owned()
        ]))
    );
    let image_url = record.image_url.as_deref().unwrap();
    assert!(image_url.contains("photo_reference=ref-1"));
    assert!(image_url.contains("maxwidth=400"));
}

#[tokio::test]
async fn failed_search_abandons_the_job_with_zero_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let (adapter, usage) = test_adapter(&server.uri());
    let records = adapter.fetch_places(&berlin_cafe_job()).await;

    assert!(records.is_empty());
    let stats = *usage.lock().await;
    assert_eq!(stats.searches_performed, 0, "failed searches are not billed");
    assert_eq!(stats.details_fetched, 0);
}

#[tokio::test]
async fn out_of_bounds_and_short_named_results_are_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "results": [{ "place_id": "id-vienna" }, { "place_id": "id-short" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "id-vienna"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&details_body(
            "Wiener Kaffeehaus",
            48.2082,
            16.3738,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "id-short"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&details_body(
            "X", 52.52, 13.405,
        )))
        .mount(&server)
        .await;

    let (adapter, usage) = test_adapter(&server.uri());
    let records = adapter.fetch_places(&berlin_cafe_job()).await;

    assert!(records.is_empty());
    let stats = *usage.lock().await;
    assert_eq!(
        stats.details_fetched, 2,
        "dropped results were still fetched and billed"
    );
}

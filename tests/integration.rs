use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ride_booking::api::rest::router;
use ride_booking::config::Config;
use ride_booking::providers::{Providers, SimulatedDriverProvider, SyntheticDistanceProvider};
use ride_booking::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

const MATCHING_DELAY: Duration = Duration::from_millis(2500);

fn config() -> Config {
    Config {
        matching_delay: MATCHING_DELAY,
        ..Config::default()
    }
}

fn providers() -> Providers {
    Providers {
        distance: Arc::new(SyntheticDistanceProvider::seeded(10.0, 10.0, 1)),
        drivers: Arc::new(SimulatedDriverProvider::seeded(
            SimulatedDriverProvider::default_roster(),
            (3, 7),
            1,
        )),
    }
}

fn setup() -> axum::Router {
    let config = config();
    router(Arc::new(AppState::new(&config, providers())))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn booking(vehicle_class: &str) -> Value {
    json!({
        "pickup": { "id": "A", "label": "Gulshan" },
        "dropoff": { "id": "B", "label": "Banani" },
        "vehicle_class": vehicle_class
    })
}

#[tokio::test]
async fn health_reports_idle() {
    let app = setup();
    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ride_state"], "idle");
    assert_eq!(body["scheduled_rides"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(empty_request("GET", "/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("active_rides"));
}

#[tokio::test]
async fn fare_estimate_matches_pricing_tables() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/fares/estimate?vehicle_class=standard&distance_km=10",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_amount"], 3000);
    assert_eq!(body["vehicle_class"], "standard");

    let response = app
        .oneshot(empty_request(
            "GET",
            "/fares/estimate?vehicle_class=premium&distance_km=10",
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total_amount"], 8000);
}

#[tokio::test]
async fn fare_estimate_rejects_bad_input() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/fares/estimate?vehicle_class=boat&distance_km=10",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["reason"], "invalid_vehicle_class");

    let response = app
        .oneshot(empty_request(
            "GET",
            "/fares/estimate?vehicle_class=suv&distance_km=-1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["reason"], "invalid_distance");
}

#[tokio::test]
async fn vehicle_classes_carry_descriptions() {
    let app = setup();
    let response = app
        .oneshot(empty_request("GET", "/vehicle-classes"))
        .await
        .unwrap();

    let body = body_json(response).await;
    let classes = body.as_array().unwrap();
    assert_eq!(classes.len(), 3);
    assert_eq!(classes[1]["id"], "suv");
    assert_eq!(
        classes[1]["description"],
        "Spacious vehicle for groups or luggage"
    );
}

#[tokio::test]
async fn request_ride_returns_searching_with_quote() {
    let app = setup();
    let response = app
        .oneshot(json_request("POST", "/rides", booking("suv")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["state"], "searching");
    assert_eq!(body["ride"]["vehicle_class"], "suv");
    assert_eq!(body["ride"]["pickup"]["label"], "Gulshan");
    assert_eq!(body["ride"]["quote"]["total_amount"], 5250);
    assert!(body["driver"].is_null());
}

#[tokio::test]
async fn missing_fields_return_400_and_stay_idle() {
    let app = setup();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/rides",
            json!({ "pickup": { "id": "A" }, "vehicle_class": "standard" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["reason"], "validation");

    let response = app
        .oneshot(empty_request("GET", "/rides/current"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["state"], "idle");
}

#[tokio::test]
async fn second_request_returns_409() {
    let app = setup();
    let first = app
        .clone()
        .oneshot(json_request("POST", "/rides", booking("standard")))
        .await
        .unwrap();
    let first_id = body_json(first).await["ride"]["id"].clone();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/rides", booking("premium")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["reason"], "ride_already_active");

    let response = app
        .oneshot(empty_request("GET", "/rides/current"))
        .await
        .unwrap();
    let current = body_json(response).await;
    assert_eq!(current["ride"]["id"], first_id);
    assert_eq!(current["ride"]["vehicle_class"], "standard");
}

#[tokio::test]
async fn cancel_without_ride_returns_409() {
    let app = setup();
    let response = app
        .oneshot(empty_request("POST", "/rides/current/cancel"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["reason"], "no_active_ride");
}

#[tokio::test(start_paused = true)]
async fn full_ride_flow() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/rides", booking("suv")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ride_id = body_json(response).await["ride"]["id"].clone();

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/rides/current/complete"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["reason"], "driver_not_assigned");

    tokio::time::sleep(MATCHING_DELAY + Duration::from_millis(100)).await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/rides/current"))
        .await
        .unwrap();
    let current = body_json(response).await;
    assert_eq!(current["state"], "matched");
    assert_eq!(current["ride"]["id"], ride_id);
    assert!(
        current["driver"]["vehicle_description"]
            .as_str()
            .unwrap()
            .ends_with("(suv)")
    );
    let eta = current["driver"]["eta_minutes"].as_u64().unwrap();
    assert!((3..=7).contains(&eta));

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/rides/current/complete"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], ride_id);

    let response = app
        .oneshot(empty_request("GET", "/rides/current"))
        .await
        .unwrap();
    let current = body_json(response).await;
    assert_eq!(current["state"], "idle");
    assert!(current["ride"].is_null());
}

#[tokio::test(start_paused = true)]
async fn cancelled_ride_is_not_matched_later() {
    let app = setup();

    app.clone()
        .oneshot(json_request("POST", "/rides", booking("premium")))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/rides/current/cancel"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["vehicle_class"], "premium");

    tokio::time::sleep(MATCHING_DELAY * 3).await;

    let response = app
        .oneshot(empty_request("GET", "/rides/current"))
        .await
        .unwrap();
    let current = body_json(response).await;
    assert_eq!(current["state"], "idle");
    assert!(current["driver"].is_null());
}

#[tokio::test]
async fn schedule_lifecycle() {
    let app = setup();
    let pickup_at = (chrono::Utc::now() + chrono::Duration::days(1)).to_rfc3339();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/schedules",
            json!({
                "pickup": { "id": "Home" },
                "dropoff": { "id": "Airport" },
                "vehicle_class": "premium",
                "pickup_at": pickup_at
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().starts_with("Ride scheduled for"));
    assert_eq!(body["ride"]["quote"]["total_amount"], 8000);
    let id = body["ride"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/schedules"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/schedules/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/schedules/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("GET", &format!("/schedules/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn schedule_in_the_past_returns_400() {
    let app = setup();
    let pickup_at = (chrono::Utc::now() - chrono::Duration::hours(2)).to_rfc3339();

    let response = app
        .oneshot(json_request(
            "POST",
            "/schedules",
            json!({
                "pickup": { "id": "Home" },
                "dropoff": { "id": "Airport" },
                "vehicle_class": "standard",
                "pickup_at": pickup_at
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use skylane_api::AppState;
use skylane_core::models::Route;
use skylane_core::InventoryService;
use skylane_store::MemoryInventoryStore;

/// Monday 2020-11-23 09:30 UTC; a Copenhagen morning in ISO week 48.
const SK_SEARCH_DEPART: i64 = 1_606_120_200_000;
/// Tuesday 2020-12-01 09:00 UTC; a London morning in ISO week 49.
const FR_SEARCH_DEPART: i64 = 1_606_813_200_000;

const CARD: &str = "1234567891234567";

async fn test_app() -> Router {
    let store = Arc::new(MemoryInventoryStore::new());

    let sk = store.add_carrier("SK", "Scandinavian Airlines").await;
    let fr = store.add_carrier("FR", "Ryanair").await;
    let cph = store
        .add_airport("CPH", "Copenhagen Airport", "Europe/Copenhagen")
        .await;
    let lhr = store
        .add_airport("LHR", "London Heathrow Airport", "Europe/London")
        .await;

    store
        .add_route(Route {
            id: Uuid::new_v4(),
            carrier_id: sk.id,
            departure_airport_id: cph.id,
            arrival_airport_id: lhr.id,
            weekday: 1,
            departure_second_in_day: 28800,
            duration_in_seconds: 5400,
            number_of_seats: 366,
            seat_price: 510,
        })
        .await;
    store
        .add_route(Route {
            id: Uuid::new_v4(),
            carrier_id: fr.id,
            departure_airport_id: lhr.id,
            arrival_airport_id: cph.id,
            weekday: 2,
            departure_second_in_day: 28800,
            duration_in_seconds: 5400,
            number_of_seats: 6,
            seat_price: 69,
        })
        .await;

    let state = AppState {
        inventory: InventoryService::new(store),
    };
    skylane_api::app(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn search_body(departure: &str, arrival: &str, depart: i64) -> Value {
    json!({
        "departure": { "iata": departure },
        "arrival": { "iata": arrival },
        "depart": depart,
    })
}

/// Publish SK001 and FR002 by searching both routes in a fixed order.
async fn publish_flights(app: &Router) {
    let (status, _) = send(
        app,
        "POST",
        "/v1/flights/search",
        Some(search_body("CPH", "LHR", SK_SEARCH_DEPART)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        app,
        "POST",
        "/v1/flights/search",
        Some(search_body("LHR", "CPH", FR_SEARCH_DEPART)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_directory_lookups() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/v1/carriers/SK", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["iata"], "SK");
    assert_eq!(body["name"], "Scandinavian Airlines");

    let (status, _) = send(&app, "GET", "/v1/carriers/XX", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/v1/airports/CPH", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["time_zone"], "Europe/Copenhagen");

    let (status, _) = send(&app, "GET", "/v1/airports/COPENHAGEN", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_returns_flight_summaries() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/flights/search",
        Some(search_body("CPH", "LHR", SK_SEARCH_DEPART)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let summary = &body[0];
    assert_eq!(summary["flight_code"], "SK001");
    assert_eq!(summary["carrier"]["iata"], "SK");
    assert_eq!(summary["departure_date"], 1_606_114_800_000_i64);
    assert_eq!(summary["arrival_date"], 1_606_120_200_000_i64);
    assert_eq!(summary["available_seats"], 366);
    assert_eq!(summary["seat_price"], 510);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/flights/search",
        Some(search_body("XXX", "LHR", SK_SEARCH_DEPART)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reservations_and_seat_exhaustion() {
    let app = test_app().await;
    publish_flights(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/reservations",
        Some(json!({ "flight_code": "FR002", "amount_of_seats": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price"], 138);

    // 4 seats left on the 6-seat flight.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/reservations",
        Some(json!({ "flight_code": "FR002", "amount_of_seats": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/reservations",
        Some(json!({ "flight_code": "S01", "amount_of_seats": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/reservations",
        Some(json!({ "flight_code": "SK001", "amount_of_seats": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/reservations",
        Some(json!({ "flight_code": "SK101", "amount_of_seats": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_lifecycle() {
    let app = test_app().await;
    publish_flights(&app).await;

    let (status, reservation) = send(
        &app,
        "POST",
        "/v1/reservations",
        Some(json!({ "flight_code": "FR002", "amount_of_seats": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "reservations": [{
                "id": reservation["id"],
                "passengers": [{ "first_name": "Kurt", "last_name": "Wonnegut" }],
            }],
            "credit_card_number": CARD,
            "frequent_flyer_number": "A12B34C",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["price"], 69);
    assert_eq!(booking["credit_card_number"], CARD);
    assert_eq!(booking["frequent_flyer_id"], "A12B34C");
    assert_eq!(booking["flight_bookings"][0]["flight_code"], "FR002");

    let booking_id = booking["id"].as_str().unwrap();
    let pnr = booking["flight_bookings"][0]["passengers"][0]["pnr"]
        .as_str()
        .unwrap();

    let (status, by_id) = send(&app, "GET", &format!("/v1/bookings/{booking_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id, booking);

    let (status, by_pnr) = send(&app, "GET", &format!("/v1/bookings/by-pnr/{pnr}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_pnr, booking);

    let (status, _) = send(&app, "DELETE", &format!("/v1/bookings/by-pnr/{pnr}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/v1/bookings/by-pnr/{pnr}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_validation_statuses() {
    let app = test_app().await;
    publish_flights(&app).await;

    let (_, reservation) = send(
        &app,
        "POST",
        "/v1/reservations",
        Some(json!({ "flight_code": "FR002", "amount_of_seats": 2 })),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "reservations": [{
                "id": reservation["id"],
                "passengers": [{ "first_name": "Kurt", "last_name": "Wonnegut" }],
            }],
            "credit_card_number": "123",
            "frequent_flyer_number": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // One passenger for a two-seat hold.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "reservations": [{
                "id": reservation["id"],
                "passengers": [{ "first_name": "Kurt", "last_name": "Wonnegut" }],
            }],
            "credit_card_number": CARD,
            "frequent_flyer_number": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

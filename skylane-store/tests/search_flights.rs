mod common;

use common::*;
use skylane_core::Error;

#[tokio::test]
async fn test_retrieve_valid_flight_summary() {
    let fixture = fixture().await;

    let summaries = fixture
        .service
        .flights_available("CPH", "LHR", SK_SEARCH_DEPART)
        .await
        .unwrap();

    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.flight_code, "SK001");
    assert_eq!(summary.carrier.iata, "SK");
    assert_eq!(summary.carrier.name, "Scandinavian Airlines");
    assert_eq!(summary.departure_airport.iata, "CPH");
    assert_eq!(summary.arrival_airport.iata, "LHR");
    assert_eq!(summary.departure_date, SK_DEPARTURE_DATE);
    assert_eq!(summary.arrival_date, SK_ARRIVAL_DATE);
    assert_eq!(summary.available_seats, 366);
    assert_eq!(summary.seat_price, 510);
}

#[tokio::test]
async fn test_availability_reflects_holds_and_bookings() {
    let fixture = fixture().await;
    occupy_fr002(&fixture).await;

    let summaries = fixture
        .service
        .flights_available("LHR", "CPH", FR_SEARCH_DEPART)
        .await
        .unwrap();

    // 6 seats minus a booking of 3 and a hold of 1.
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].available_seats, 2);
}

#[tokio::test]
async fn test_empty_result_when_no_route_flies_that_day() {
    let fixture = fixture().await;

    let summaries = fixture
        .service
        .flights_available("CPH", "LHR", WEDNESDAY_DEPART)
        .await
        .unwrap();

    assert!(summaries.is_empty());
}

#[tokio::test]
async fn test_repeated_search_reuses_the_same_leg() {
    let fixture = fixture().await;

    let first = fixture
        .service
        .flights_available("CPH", "LHR", SK_SEARCH_DEPART)
        .await
        .unwrap();
    let second = fixture
        .service
        .flights_available("CPH", "LHR", SK_SEARCH_DEPART)
        .await
        .unwrap();

    assert_eq!(first[0].flight_code, "SK001");
    assert_eq!(second[0].flight_code, "SK001");
}

#[tokio::test]
async fn test_new_week_materializes_a_new_flight_number() {
    let fixture = fixture().await;

    let summaries = fixture
        .service
        .flights_available("CPH", "LHR", SK_SEARCH_DEPART_WEEK_49)
        .await
        .unwrap();

    // SK001 and FR002 already exist, so week 49 gets the next number.
    assert_eq!(summaries[0].flight_code, "SK003");
    assert_eq!(summaries[0].available_seats, 366);
}

#[tokio::test]
async fn test_sold_out_flight_is_filtered_from_results() {
    let fixture = fixture().await;
    reserve(&fixture, "FR002", 6).await;

    let summaries = fixture
        .service
        .flights_available("LHR", "CPH", FR_SEARCH_DEPART)
        .await
        .unwrap();

    assert!(summaries.is_empty());
}

#[tokio::test]
async fn test_negative_departure_time_is_rejected() {
    let fixture = fixture().await;

    let result = fixture.service.flights_available("CPH", "LHR", -1).await;

    assert!(matches!(result, Err(Error::Input(_))));
}

#[tokio::test]
async fn test_unknown_airports_are_rejected() {
    let fixture = fixture().await;

    let departure = fixture
        .service
        .flights_available("XXX", "LHR", SK_SEARCH_DEPART)
        .await;
    assert!(matches!(departure, Err(Error::NotFound(_))));

    let arrival = fixture
        .service
        .flights_available("CPH", "XXX", SK_SEARCH_DEPART)
        .await;
    assert!(matches!(arrival, Err(Error::NotFound(_))));
}

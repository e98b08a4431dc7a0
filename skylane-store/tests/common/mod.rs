#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use skylane_core::models::{BookingDetail, Person, Route};
use skylane_core::InventoryService;
use skylane_store::MemoryInventoryStore;

/// Monday 2020-11-23 09:30 UTC; a Copenhagen morning in ISO week 48.
pub const SK_SEARCH_DEPART: i64 = 1_606_120_200_000;
pub const SK_DEPARTURE_DATE: i64 = 1_606_114_800_000;
pub const SK_ARRIVAL_DATE: i64 = 1_606_120_200_000;

/// Monday 2020-11-30 09:30 UTC; the same route one ISO week later.
pub const SK_SEARCH_DEPART_WEEK_49: i64 = 1_606_728_600_000;

/// Wednesday 2020-11-25 10:00 UTC; no route flies that day.
pub const WEDNESDAY_DEPART: i64 = 1_606_298_400_000;

/// Tuesday 2020-12-01 09:00 UTC; a London morning in ISO week 49.
pub const FR_SEARCH_DEPART: i64 = 1_606_813_200_000;
pub const FR_DEPARTURE_DATE: i64 = 1_606_809_600_000;
pub const FR_ARRIVAL_DATE: i64 = 1_606_815_000_000;

pub const CARD: &str = "1234567891234567";
pub const FREQUENT_FLYER: &str = "A12B34C";

pub struct Fixture {
    pub store: Arc<MemoryInventoryStore>,
    pub service: InventoryService,
    pub sk_route: Route,
    pub fr_route: Route,
}

/// Two carriers, two airports and one route each way. The legs are published
/// through search in a fixed order so the flight codes come out as SK001
/// (CPH to LHR, Mondays, 366 seats at 510) and FR002 (LHR to CPH, Tuesdays,
/// 6 seats at 69).
pub async fn fixture() -> Fixture {
    let store = Arc::new(MemoryInventoryStore::new());

    let sk = store.add_carrier("SK", "Scandinavian Airlines").await;
    let fr = store.add_carrier("FR", "Ryanair").await;
    let cph = store
        .add_airport("CPH", "Copenhagen Airport", "Europe/Copenhagen")
        .await;
    let lhr = store
        .add_airport("LHR", "London Heathrow Airport", "Europe/London")
        .await;

    let sk_route = store
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

    let fr_route = store
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

    let service = InventoryService::new(store.clone());

    service
        .flights_available("CPH", "LHR", SK_SEARCH_DEPART)
        .await
        .expect("publish SK001");
    service
        .flights_available("LHR", "CPH", FR_SEARCH_DEPART)
        .await
        .expect("publish FR002");

    Fixture {
        store,
        service,
        sk_route,
        fr_route,
    }
}

pub fn person(first_name: &str, last_name: &str) -> Person {
    Person {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        agency: None,
    }
}

/// Reserve seats on a flight and return the reservation id.
pub async fn reserve(fixture: &Fixture, flight_code: &str, seats: u32) -> Uuid {
    fixture
        .service
        .reserve_flight(flight_code, seats)
        .await
        .expect("reservation should succeed")
        .id
}

/// Book a single reservation with the given passengers using the default
/// payment details.
pub async fn book(
    fixture: &Fixture,
    reservation_id: Uuid,
    passengers: Vec<Person>,
) -> BookingDetail {
    fixture
        .service
        .create_booking(
            vec![skylane_core::models::ReservationPassengers {
                id: reservation_id,
                passengers,
            }],
            CARD,
            Some(FREQUENT_FLYER),
        )
        .await
        .expect("booking should succeed")
}

/// Occupy FR002 the way the seeded dataset does: a confirmed booking of three
/// passengers plus a live hold of one seat, leaving two sellable seats.
pub async fn occupy_fr002(fixture: &Fixture) -> Uuid {
    let reservation_id = reserve(fixture, "FR002", 3).await;
    book(
        fixture,
        reservation_id,
        vec![
            person("Per", "Nielsen"),
            person("Adam", "Lassie"),
            person("Kurt", "Wonnegut"),
        ],
    )
    .await;

    reserve(fixture, "FR002", 1).await
}

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use skylane_core::availability::{available_seats, fits};
use skylane_core::models::{
    Airport, Booking, Carrier, Leg, Reservation, Route, FLIGHT_NUMBER_CEILING,
};
use skylane_core::repository::{InventoryStore, NewBooking};
use skylane_core::{Error, Result};

#[derive(Default)]
struct State {
    carriers: Vec<Carrier>,
    airports: Vec<Airport>,
    routes: Vec<Route>,
    legs: Vec<Leg>,
    leg_sequence: u32,
    reservations: Vec<Reservation>,
    bookings: Vec<Booking>,
}

/// In-memory inventory store backing the test suites and local experiments.
///
/// One lock around the whole state makes every storage operation atomic, so
/// the same concurrency contract holds as for the Postgres store: no durable
/// overselling, exactly-once sequence assignment, all-or-nothing booking
/// commits.
#[derive(Default)]
pub struct MemoryInventoryStore {
    state: Mutex<State>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_carrier(&self, iata: &str, name: &str) -> Carrier {
        let carrier = Carrier {
            id: Uuid::new_v4(),
            iata: iata.to_string(),
            name: name.to_string(),
        };
        self.state.lock().await.carriers.push(carrier.clone());
        carrier
    }

    pub async fn add_airport(&self, iata: &str, name: &str, time_zone: &str) -> Airport {
        let airport = Airport {
            id: Uuid::new_v4(),
            iata: iata.to_string(),
            name: name.to_string(),
            time_zone: time_zone.to_string(),
        };
        self.state.lock().await.airports.push(airport.clone());
        airport
    }

    pub async fn add_route(&self, route: Route) -> Route {
        self.state.lock().await.routes.push(route.clone());
        route
    }
}

fn seats_booked_in(state: &State, leg_id: Uuid) -> u32 {
    state
        .bookings
        .iter()
        .flat_map(|booking| &booking.booking_legs)
        .filter(|booking_leg| booking_leg.leg_id == leg_id)
        .map(|booking_leg| booking_leg.passengers.len() as u32)
        .sum()
}

fn seats_held_in(state: &State, leg_id: Uuid) -> u32 {
    state
        .reservations
        .iter()
        .filter(|reservation| reservation.leg_id == leg_id)
        .map(|reservation| reservation.amount_of_seats)
        .sum()
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn carrier_by_iata(&self, iata: &str) -> Result<Option<Carrier>> {
        let state = self.state.lock().await;
        Ok(state.carriers.iter().find(|c| c.iata == iata).cloned())
    }

    async fn airport_by_iata(&self, iata: &str) -> Result<Option<Airport>> {
        let state = self.state.lock().await;
        Ok(state.airports.iter().find(|a| a.iata == iata).cloned())
    }

    async fn carrier(&self, id: Uuid) -> Result<Option<Carrier>> {
        let state = self.state.lock().await;
        Ok(state.carriers.iter().find(|c| c.id == id).cloned())
    }

    async fn airport(&self, id: Uuid) -> Result<Option<Airport>> {
        let state = self.state.lock().await;
        Ok(state.airports.iter().find(|a| a.id == id).cloned())
    }

    async fn route(&self, id: Uuid) -> Result<Option<Route>> {
        let state = self.state.lock().await;
        Ok(state.routes.iter().find(|r| r.id == id).cloned())
    }

    async fn routes_between(
        &self,
        departure_airport_id: Uuid,
        arrival_airport_id: Uuid,
        weekday: u8,
    ) -> Result<Vec<Route>> {
        let state = self.state.lock().await;
        Ok(state
            .routes
            .iter()
            .filter(|route| {
                route.departure_airport_id == departure_airport_id
                    && route.arrival_airport_id == arrival_airport_id
                    && route.weekday == weekday
            })
            .cloned()
            .collect())
    }

    async fn leg(&self, id: Uuid) -> Result<Option<Leg>> {
        let state = self.state.lock().await;
        Ok(state.legs.iter().find(|l| l.id == id).cloned())
    }

    async fn leg_for_route(&self, route_id: Uuid, week: u32, year: i32) -> Result<Option<Leg>> {
        let state = self.state.lock().await;
        Ok(state
            .legs
            .iter()
            .find(|leg| leg.route_id == route_id && leg.week == week && leg.year == year)
            .cloned())
    }

    async fn leg_by_sequence(&self, sequence_id: u32) -> Result<Option<Leg>> {
        let state = self.state.lock().await;
        // Insertion order doubles as creation order; after a sequence wrap the
        // oldest holder of the number wins, like the database query.
        Ok(state
            .legs
            .iter()
            .find(|leg| leg.sequence_id == sequence_id)
            .cloned())
    }

    async fn insert_leg(&self, route_id: Uuid, week: u32, year: i32) -> Result<Leg> {
        let mut state = self.state.lock().await;

        if let Some(existing) = state
            .legs
            .iter()
            .find(|leg| leg.route_id == route_id && leg.week == week && leg.year == year)
        {
            return Ok(existing.clone());
        }

        state.leg_sequence = if state.leg_sequence >= FLIGHT_NUMBER_CEILING {
            1
        } else {
            state.leg_sequence + 1
        };

        let leg = Leg {
            id: Uuid::new_v4(),
            route_id,
            week,
            year,
            sequence_id: state.leg_sequence,
        };
        state.legs.push(leg.clone());
        Ok(leg)
    }

    async fn seats_booked(&self, leg_id: Uuid) -> Result<u32> {
        let state = self.state.lock().await;
        Ok(seats_booked_in(&state, leg_id))
    }

    async fn seats_held(&self, leg_id: Uuid) -> Result<u32> {
        let state = self.state.lock().await;
        Ok(seats_held_in(&state, leg_id))
    }

    async fn create_reservation(&self, leg_id: Uuid, amount_of_seats: u32) -> Result<Reservation> {
        let mut state = self.state.lock().await;

        let leg = state
            .legs
            .iter()
            .find(|leg| leg.id == leg_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Could not find flight".to_string()))?;
        let route = state
            .routes
            .iter()
            .find(|route| route.id == leg.route_id)
            .cloned()
            .ok_or_else(|| Error::Internal(format!("Leg {} references a missing route", leg.id)))?;

        let booked = seats_booked_in(&state, leg_id);
        let held = seats_held_in(&state, leg_id);
        let available = available_seats(route.number_of_seats, booked, held);

        if !fits(available, amount_of_seats) {
            return Err(Error::Reservation(
                "There are not enough seats left for this reservation".to_string(),
            ));
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            leg_id,
            amount_of_seats,
        };
        state.reservations.push(reservation.clone());
        Ok(reservation)
    }

    async fn reservation(&self, id: Uuid) -> Result<Option<Reservation>> {
        let state = self.state.lock().await;
        Ok(state.reservations.iter().find(|r| r.id == id).cloned())
    }

    async fn commit_booking(&self, new_booking: NewBooking) -> Result<Uuid> {
        let mut state = self.state.lock().await;

        // Validate everything before touching the state, so a failure leaves
        // no trace of the attempt.
        for reservation_id in &new_booking.consumed_reservations {
            if !state.reservations.iter().any(|r| r.id == *reservation_id) {
                return Err(Error::NotFound("Could not find reservation".to_string()));
            }
        }

        let mut locators: HashSet<String> = state
            .bookings
            .iter()
            .flat_map(|booking| &booking.booking_legs)
            .flat_map(|booking_leg| &booking_leg.passengers)
            .map(|passenger| passenger.pnr.clone())
            .collect();
        for booking_leg in &new_booking.booking_legs {
            for passenger in &booking_leg.passengers {
                if !locators.insert(passenger.pnr.clone()) {
                    return Err(Error::Internal(format!(
                        "Duplicate record locator: {}",
                        passenger.pnr
                    )));
                }
            }
        }

        state
            .reservations
            .retain(|r| !new_booking.consumed_reservations.contains(&r.id));

        let booking = Booking {
            id: Uuid::new_v4(),
            booking_legs: new_booking.booking_legs,
            credit_card_number: new_booking.credit_card_number,
            frequent_flyer_id: new_booking.frequent_flyer_id,
        };
        let booking_id = booking.id;
        state.bookings.push(booking);
        Ok(booking_id)
    }

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>> {
        let state = self.state.lock().await;
        Ok(state.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn booking_by_pnr(&self, pnr: &str) -> Result<Option<Booking>> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .iter()
            .find(|booking| {
                booking
                    .booking_legs
                    .iter()
                    .flat_map(|booking_leg| &booking_leg.passengers)
                    .any(|passenger| passenger.pnr == pnr)
            })
            .cloned())
    }

    async fn delete_booking(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.bookings.len();
        state.bookings.retain(|b| b.id != id);
        Ok(state.bookings.len() < before)
    }
}

use std::sync::Arc;

use chrono::{Datelike, TimeZone, Utc};
use uuid::Uuid;

use crate::availability::available_seats;
use crate::legs::resolve_leg;
use crate::models::{
    Airport, AirportDetail, Booking, BookingDetail, BookingLeg, Carrier, CarrierDetail,
    FlightBookingDetail, FlightPassenger, FlightSummary, Passenger, ReservationPassengers,
    ReservationSummary, parse_flight_code,
};
use crate::pnr;
use crate::repository::{InventoryStore, NewBooking};
use crate::schedule;
use crate::{Error, Result};

/// The seat inventory operations exposed to the transport layer.
///
/// Each call is independent; any coordination between concurrent calls is
/// delegated to the [`InventoryStore`] guarantees.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub async fn carrier_information(&self, iata: &str) -> Result<CarrierDetail> {
        if iata.is_empty() {
            return Err(Error::Input("Please provide an IATA code".to_string()));
        }
        if iata.len() != 2 {
            return Err(Error::Input("Carrier IATA codes are 2 characters long".to_string()));
        }

        let carrier = self
            .store
            .carrier_by_iata(iata)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Could not find carrier for IATA: {iata}")))?;

        Ok(carrier_detail(&carrier))
    }

    pub async fn airport_information(&self, iata: &str) -> Result<AirportDetail> {
        if iata.is_empty() {
            return Err(Error::Input("Please provide an IATA code".to_string()));
        }
        if iata.len() != 3 {
            return Err(Error::Input("Airport IATA codes are 3 characters long".to_string()));
        }

        let airport = self
            .store
            .airport_by_iata(iata)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Could not find airport for IATA: {iata}")))?;

        Ok(airport_detail(&airport))
    }

    /// List flights between two airports on the calendar date of `depart`
    /// (epoch milliseconds), as seen in the departure airport's zone.
    ///
    /// Materializes the leg for every matching route as a side effect, so a
    /// searched flight can subsequently be reserved by its flight code.
    /// Flights with no sellable seats left are filtered out.
    pub async fn flights_available(
        &self,
        departure_iata: &str,
        arrival_iata: &str,
        depart: i64,
    ) -> Result<Vec<FlightSummary>> {
        if depart <= 0 {
            return Err(Error::Input("Departure time must be positive".to_string()));
        }

        let departure_airport = self
            .store
            .airport_by_iata(departure_iata)
            .await?
            .ok_or_else(|| Error::NotFound("Could not find departure airport".to_string()))?;
        let arrival_airport = self
            .store
            .airport_by_iata(arrival_iata)
            .await?
            .ok_or_else(|| Error::NotFound("Could not find arrival airport".to_string()))?;

        let zone = schedule::zone(&departure_airport.time_zone)?;
        let instant = Utc
            .timestamp_millis_opt(depart)
            .single()
            .ok_or_else(|| Error::Input("Departure time is out of range".to_string()))?;
        let local = instant.with_timezone(&zone);

        let weekday = local.weekday().num_days_from_sunday() as u8;
        let week = local.iso_week().week();
        let year = local.iso_week().year();
        let date = local.date_naive();

        let routes = self
            .store
            .routes_between(departure_airport.id, arrival_airport.id, weekday)
            .await?;

        let mut summaries = Vec::new();

        for route in routes {
            let carrier = self.store.carrier(route.carrier_id).await?.ok_or_else(|| {
                Error::Internal(format!("Route {} references a missing carrier", route.id))
            })?;

            let (departure_date, arrival_date) = schedule::flight_times(&route, date, zone)?;
            let leg = resolve_leg(self.store.as_ref(), route.id, week, year).await?;

            let booked = self.store.seats_booked(leg.id).await?;
            let held = self.store.seats_held(leg.id).await?;
            let available = available_seats(route.number_of_seats, booked, held);

            if available > 0 {
                summaries.push(FlightSummary {
                    flight_code: leg.flight_code(&carrier),
                    carrier: carrier_detail(&carrier),
                    departure_airport: airport_detail(&departure_airport),
                    arrival_airport: airport_detail(&arrival_airport),
                    departure_date,
                    arrival_date,
                    available_seats: available,
                    seat_price: route.seat_price,
                });
            }
        }

        tracing::debug!(
            departure = departure_iata,
            arrival = arrival_iata,
            week,
            year,
            results = summaries.len(),
            "searched flights"
        );

        Ok(summaries)
    }

    /// Place a seat hold against an existing flight. Unlike search this never
    /// materializes a leg: a flight code that was never published cannot be
    /// reserved.
    pub async fn reserve_flight(
        &self,
        flight_code: &str,
        amount_of_seats: u32,
    ) -> Result<ReservationSummary> {
        if !(1..=9).contains(&amount_of_seats) {
            return Err(Error::Input(
                "Seat amount must be between 1 and 9".to_string(),
            ));
        }

        let (_, sequence_id) = parse_flight_code(flight_code)?;

        let leg = self
            .store
            .leg_by_sequence(sequence_id)
            .await?
            .ok_or_else(|| Error::NotFound("Could not find flight".to_string()))?;
        let route = self.store.route(leg.route_id).await?.ok_or_else(|| {
            Error::Internal(format!("Leg {} references a missing route", leg.id))
        })?;

        let reservation = self.store.create_reservation(leg.id, amount_of_seats).await?;
        let price = route.seat_price * i64::from(amount_of_seats);

        tracing::info!(flight_code, seats = amount_of_seats, price, "reserved seats");

        Ok(ReservationSummary { id: reservation.id, price })
    }

    /// Convert one or more reservations into a single confirmed booking.
    ///
    /// Entries are validated strictly in order; the reservation deletions and
    /// the booking insert then commit as one atomic storage transaction, so a
    /// failure anywhere leaves every hold untouched.
    pub async fn create_booking(
        &self,
        entries: Vec<ReservationPassengers>,
        credit_card_number: &str,
        frequent_flyer_number: Option<&str>,
    ) -> Result<BookingDetail> {
        if entries.is_empty() {
            return Err(Error::Input(
                "Please provide at least one reservation".to_string(),
            ));
        }
        if credit_card_number.len() != 16
            || !credit_card_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(Error::Input(
                "Credit card number must be exactly 16 digits".to_string(),
            ));
        }
        if let Some(frequent_flyer) = frequent_flyer_number {
            if frequent_flyer.len() != 7 {
                return Err(Error::Input(
                    "Frequent flyer number must be exactly 7 characters".to_string(),
                ));
            }
        }
        for entry in &entries {
            if entry.passengers.is_empty() || entry.passengers.len() > 9 {
                return Err(Error::Input(
                    "A reservation must carry between 1 and 9 passengers".to_string(),
                ));
            }
        }

        let mut consumed_reservations = Vec::with_capacity(entries.len());
        let mut booking_legs = Vec::with_capacity(entries.len());

        for entry in entries {
            let reservation = self
                .store
                .reservation(entry.id)
                .await?
                .ok_or_else(|| Error::NotFound("Could not find reservation".to_string()))?;

            if entry.passengers.len() != reservation.amount_of_seats as usize {
                return Err(Error::Booking(
                    "Passenger list length does not match the reserved amount of seats"
                        .to_string(),
                ));
            }

            let passengers = entry
                .passengers
                .into_iter()
                .map(|person| Passenger { pnr: pnr::generate(), person })
                .collect();

            booking_legs.push(BookingLeg { leg_id: reservation.leg_id, passengers });
            consumed_reservations.push(reservation.id);
        }

        let booking_id = self
            .store
            .commit_booking(NewBooking {
                consumed_reservations,
                booking_legs,
                credit_card_number: credit_card_number.to_string(),
                frequent_flyer_id: frequent_flyer_number.map(str::to_string),
            })
            .await?;

        tracing::info!(%booking_id, "created booking");

        self.booking_by_id(booking_id).await
    }

    pub async fn booking_by_id(&self, id: Uuid) -> Result<BookingDetail> {
        let booking = self
            .store
            .booking(id)
            .await?
            .ok_or_else(|| Error::NotFound("Booking not found".to_string()))?;
        self.assemble_detail(booking).await
    }

    pub async fn booking_by_pnr(&self, pnr: &str) -> Result<BookingDetail> {
        let booking = self.find_by_pnr(pnr).await?;
        self.assemble_detail(booking).await
    }

    pub async fn cancel_booking(&self, pnr: &str) -> Result<()> {
        let booking = self.find_by_pnr(pnr).await?;
        self.store.delete_booking(booking.id).await?;
        tracing::info!(booking_id = %booking.id, "cancelled booking");
        Ok(())
    }

    async fn find_by_pnr(&self, pnr: &str) -> Result<Booking> {
        if pnr.is_empty() {
            return Err(Error::Input("Please provide a record locator".to_string()));
        }
        self.store
            .booking_by_pnr(pnr)
            .await?
            .ok_or_else(|| Error::NotFound("Booking not found".to_string()))
    }

    /// Expand a stored booking into its caller-facing detail, deriving the
    /// price and per-leg schedule instants from the referenced routes.
    async fn assemble_detail(&self, booking: Booking) -> Result<BookingDetail> {
        let mut price = 0i64;
        let mut flight_bookings = Vec::with_capacity(booking.booking_legs.len());

        for booking_leg in &booking.booking_legs {
            let leg = self.store.leg(booking_leg.leg_id).await?.ok_or_else(|| {
                Error::Internal(format!("Booking {} references a missing leg", booking.id))
            })?;
            let route = self.store.route(leg.route_id).await?.ok_or_else(|| {
                Error::Internal(format!("Leg {} references a missing route", leg.id))
            })?;
            let carrier = self.store.carrier(route.carrier_id).await?.ok_or_else(|| {
                Error::Internal(format!("Route {} references a missing carrier", route.id))
            })?;
            let departure_airport =
                self.store.airport(route.departure_airport_id).await?.ok_or_else(|| {
                    Error::Internal(format!("Route {} references a missing airport", route.id))
                })?;
            let arrival_airport =
                self.store.airport(route.arrival_airport_id).await?.ok_or_else(|| {
                    Error::Internal(format!("Route {} references a missing airport", route.id))
                })?;

            let zone = schedule::zone(&departure_airport.time_zone)?;
            let date = schedule::leg_date(leg.week, leg.year, route.weekday)?;
            let (departure_date, arrival_date) = schedule::flight_times(&route, date, zone)?;

            price += route.seat_price * booking_leg.passengers.len() as i64;

            let passengers = booking_leg
                .passengers
                .iter()
                .map(|passenger| FlightPassenger {
                    first_name: passenger.person.first_name.clone(),
                    last_name: passenger.person.last_name.clone(),
                    pnr: passenger.pnr.clone(),
                })
                .collect();

            flight_bookings.push(FlightBookingDetail {
                flight_code: leg.flight_code(&carrier),
                carrier: carrier_detail(&carrier),
                departure_airport: airport_detail(&departure_airport),
                arrival_airport: airport_detail(&arrival_airport),
                departure_date,
                arrival_date,
                passengers,
            });
        }

        Ok(BookingDetail {
            id: booking.id,
            price,
            credit_card_number: booking.credit_card_number,
            frequent_flyer_id: booking.frequent_flyer_id.unwrap_or_default(),
            flight_bookings,
        })
    }
}

fn carrier_detail(carrier: &Carrier) -> CarrierDetail {
    CarrierDetail {
        iata: carrier.iata.clone(),
        name: carrier.name.clone(),
    }
}

fn airport_detail(airport: &Airport) -> AirportDetail {
    AirportDetail {
        iata: airport.iata.clone(),
        name: airport.name.clone(),
        time_zone: airport.time_zone.clone(),
    }
}

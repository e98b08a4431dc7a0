use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Number of digits in the flight number suffix. Sequence allocation wraps
/// back to 1 once this range is exhausted.
pub const FLIGHT_NUMBER_DIGITS: usize = 3;
pub const FLIGHT_NUMBER_CEILING: u32 = 999;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carrier {
    pub id: Uuid,
    pub iata: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airport {
    pub id: Uuid,
    pub iata: String,
    pub name: String,
    pub time_zone: String,
}

/// Weekly-recurring schedule template between two airports for one carrier.
/// `weekday` is 0-6 with 0 = Sunday; the departure is expressed as a
/// second-of-day in the departure airport's local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub carrier_id: Uuid,
    pub departure_airport_id: Uuid,
    pub arrival_airport_id: Uuid,
    pub weekday: u8,
    pub departure_second_in_day: u32,
    pub duration_in_seconds: u32,
    pub number_of_seats: u32,
    pub seat_price: i64,
}

/// One materialized occurrence of a route in a specific ISO week. Legs are
/// created on first access and never deleted; `sequence_id` is allocated from
/// a collection-wide counter, not per route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leg {
    pub id: Uuid,
    pub route_id: Uuid,
    pub week: u32,
    pub year: i32,
    pub sequence_id: u32,
}

impl Leg {
    /// Zero-padded flight number suffix, e.g. `001`.
    pub fn padded_id(&self) -> String {
        format!("{:0width$}", self.sequence_id, width = FLIGHT_NUMBER_DIGITS)
    }

    /// Public flight code: carrier IATA followed by the padded sequence id.
    pub fn flight_code(&self, carrier: &Carrier) -> String {
        format!("{}{}", carrier.iata, self.padded_id())
    }
}

/// Decode a wire-format flight code (`[A-Z]{2}[0-9]{3}`) into its carrier
/// prefix and leg sequence number.
pub fn parse_flight_code(code: &str) -> Result<(String, u32)> {
    let valid = code.len() == 5
        && code.is_ascii()
        && code[..2].chars().all(|c| c.is_ascii_uppercase())
        && code[2..].chars().all(|c| c.is_ascii_digit());

    if !valid {
        return Err(Error::Input(
            "Flight code does not match the required format".to_string(),
        ));
    }

    let sequence_id = code[2..]
        .parse::<u32>()
        .map_err(|_| Error::Input("Flight code does not match the required format".to_string()))?;

    Ok((code[..2].to_string(), sequence_id))
}

/// A temporary seat hold against a leg. Reservations are summed at read time
/// when computing availability and only disappear when consumed by a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub leg_id: Uuid,
    pub amount_of_seats: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub pnr: String,
    pub person: Person,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingLeg {
    pub leg_id: Uuid,
    pub passengers: Vec<Passenger>,
}

/// A confirmed itinerary. The price is always derived from the booked legs
/// and their routes, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub booking_legs: Vec<BookingLeg>,
    pub credit_card_number: String,
    pub frequent_flyer_id: Option<String>,
}

// ============================================================================
// Caller-facing detail objects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierDetail {
    pub iata: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportDetail {
    pub iata: String,
    pub name: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub carrier: CarrierDetail,
    pub departure_airport: AirportDetail,
    pub arrival_airport: AirportDetail,
    pub flight_code: String,
    pub departure_date: i64,
    pub arrival_date: i64,
    pub available_seats: i64,
    pub seat_price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationSummary {
    pub id: Uuid,
    pub price: i64,
}

/// One reservation being converted into a booking, together with the named
/// passengers that will occupy its held seats.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationPassengers {
    pub id: Uuid,
    pub passengers: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPassenger {
    pub first_name: String,
    pub last_name: String,
    pub pnr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightBookingDetail {
    pub flight_code: String,
    pub carrier: CarrierDetail,
    pub departure_airport: AirportDetail,
    pub arrival_airport: AirportDetail,
    pub departure_date: i64,
    pub arrival_date: i64,
    pub passengers: Vec<FlightPassenger>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDetail {
    pub id: Uuid,
    pub price: i64,
    pub credit_card_number: String,
    pub frequent_flyer_id: String,
    pub flight_bookings: Vec<FlightBookingDetail>,
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Airport, Booking, BookingLeg, Carrier, Leg, Reservation, Route,
};
use crate::Result;

/// Everything the booking transaction needs to persist in one atomic step:
/// the holds it consumes and the booking aggregate that replaces them.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub consumed_reservations: Vec<Uuid>,
    pub booking_legs: Vec<BookingLeg>,
    pub credit_card_number: String,
    pub frequent_flyer_id: Option<String>,
}

/// Storage contract for the seat inventory.
///
/// There is no in-process coordination between operations; all correctness
/// under concurrency comes from the guarantees documented on the individual
/// methods, which every implementation must honor with its own atomicity
/// primitives.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn carrier_by_iata(&self, iata: &str) -> Result<Option<Carrier>>;
    async fn airport_by_iata(&self, iata: &str) -> Result<Option<Airport>>;
    async fn carrier(&self, id: Uuid) -> Result<Option<Carrier>>;
    async fn airport(&self, id: Uuid) -> Result<Option<Airport>>;

    async fn route(&self, id: Uuid) -> Result<Option<Route>>;
    async fn routes_between(
        &self,
        departure_airport_id: Uuid,
        arrival_airport_id: Uuid,
        weekday: u8,
    ) -> Result<Vec<Route>>;

    async fn leg(&self, id: Uuid) -> Result<Option<Leg>>;
    async fn leg_for_route(&self, route_id: Uuid, week: u32, year: i32) -> Result<Option<Leg>>;

    /// Oldest leg carrying the given flight number. Sequence ids wrap after
    /// the ceiling, so the number alone is not guaranteed unique forever.
    async fn leg_by_sequence(&self, sequence_id: u32) -> Result<Option<Leg>>;

    /// Create the leg for `(route, week, year)` if it does not exist yet.
    ///
    /// Must be atomic against a concurrent insert of the same key: the loser
    /// of the race returns the winner's row instead of a duplicate. The
    /// sequence id comes from a single atomic increment of the leg counter,
    /// wrapping to 1 past [`crate::models::FLIGHT_NUMBER_CEILING`]; gaps from
    /// lost races are acceptable, double assignment is not.
    async fn insert_leg(&self, route_id: Uuid, week: u32, year: i32) -> Result<Leg>;

    /// Seats consumed by confirmed bookings referencing this leg, recomputed
    /// from the booking records on every call.
    async fn seats_booked(&self, leg_id: Uuid) -> Result<u32>;

    /// Seats held by live reservations against this leg, recomputed from the
    /// reservation records on every call.
    async fn seats_held(&self, leg_id: Uuid) -> Result<u32>;

    /// Persist a new seat hold after re-checking availability.
    ///
    /// The availability check and the insert must be atomic against other
    /// reservations on the same leg: once all concurrent calls settle, booked
    /// plus held seats never exceed the route capacity. Exhaustion fails with
    /// [`crate::Error::Reservation`].
    async fn create_reservation(&self, leg_id: Uuid, amount_of_seats: u32) -> Result<Reservation>;

    async fn reservation(&self, id: Uuid) -> Result<Option<Reservation>>;

    /// Atomically delete the consumed reservations and persist the booking.
    ///
    /// All-or-nothing: a missing reservation, a record locator collision or
    /// any write failure aborts the whole transaction, leaving every
    /// reservation in place and no booking behind.
    async fn commit_booking(&self, new_booking: NewBooking) -> Result<Uuid>;

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>>;

    /// Booking containing the passenger with the given record locator.
    async fn booking_by_pnr(&self, pnr: &str) -> Result<Option<Booking>>;

    /// Delete a booking wholesale. Returns false when it did not exist.
    async fn delete_booking(&self, id: Uuid) -> Result<bool>;
}

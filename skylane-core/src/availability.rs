//! Remaining-seat arithmetic for a single leg.
//!
//! Availability is always recomputed from the source records (confirmed
//! booking legs and live reservations); there is no cached counter to drift
//! out of sync. The sums are supplied by the storage layer.

/// Sellable seats left on a leg: route capacity minus seats consumed by
/// confirmed bookings minus seats held by live reservations.
///
/// The result can be negative while concurrent writers race; callers must
/// never use a negative value to authorize a write.
pub fn available_seats(capacity: u32, seats_booked: u32, seats_held: u32) -> i64 {
    i64::from(capacity) - i64::from(seats_booked) - i64::from(seats_held)
}

/// Whether a request for `requested` seats fits into the current availability.
pub fn fits(available: i64, requested: u32) -> bool {
    available - i64::from(requested) >= 0
}

//! Lazy materialization of flight legs.
//!
//! Legs only come into existence when a search, reservation or booking needs
//! them. Resolution is the single seam through which that happens, so the
//! create-if-absent semantics stay in one place.

use uuid::Uuid;

use crate::models::Leg;
use crate::repository::InventoryStore;
use crate::Result;

/// Return the leg for `(route, week, year)`, materializing it on first
/// access. Idempotent: repeated calls yield the same leg and sequence id.
pub async fn resolve_leg(
    store: &dyn InventoryStore,
    route_id: Uuid,
    week: u32,
    year: i32,
) -> Result<Leg> {
    if let Some(leg) = store.leg_for_route(route_id, week, year).await? {
        return Ok(leg);
    }

    let leg = store.insert_leg(route_id, week, year).await?;
    tracing::debug!(
        route_id = %route_id,
        week,
        year,
        flight_number = %leg.padded_id(),
        "materialized leg"
    );
    Ok(leg)
}

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;

use skylane_core::models::ReservationSummary;
use skylane_core::Error;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub flight_code: String,
    pub amount_of_seats: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/reservations", post(create_reservation))
}

async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<ReservationSummary>), ApiError> {
    // Accept any integer on the wire so a negative amount fails the seat
    // bound check instead of request deserialization.
    let amount_of_seats = u32::try_from(req.amount_of_seats)
        .map_err(|_| Error::Input("Seat amount must be between 1 and 9".to_string()))?;

    let summary = state
        .inventory
        .reserve_flight(&req.flight_code, amount_of_seats)
        .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

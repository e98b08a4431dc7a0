use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use skylane_core::models::{BookingDetail, ReservationPassengers};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub reservations: Vec<ReservationPassengers>,
    pub credit_card_number: String,
    pub frequent_flyer_number: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
        .route(
            "/v1/bookings/by-pnr/{pnr}",
            get(get_booking_by_pnr).delete(cancel_booking),
        )
}

async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingDetail>), ApiError> {
    let detail = state
        .inventory
        .create_booking(
            req.reservations,
            &req.credit_card_number,
            req.frequent_flyer_number.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDetail>, ApiError> {
    Ok(Json(state.inventory.booking_by_id(id).await?))
}

async fn get_booking_by_pnr(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
) -> Result<Json<BookingDetail>, ApiError> {
    Ok(Json(state.inventory.booking_by_pnr(&pnr).await?))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.inventory.cancel_booking(&pnr).await?;
    Ok(StatusCode::NO_CONTENT)
}

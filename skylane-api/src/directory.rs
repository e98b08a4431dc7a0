use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use skylane_core::models::{AirportDetail, CarrierDetail};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/carriers/{iata}", get(get_carrier))
        .route("/v1/airports/{iata}", get(get_airport))
}

async fn get_carrier(
    State(state): State<AppState>,
    Path(iata): Path<String>,
) -> Result<Json<CarrierDetail>, ApiError> {
    Ok(Json(state.inventory.carrier_information(&iata).await?))
}

async fn get_airport(
    State(state): State<AppState>,
    Path(iata): Path<String>,
) -> Result<Json<AirportDetail>, ApiError> {
    Ok(Json(state.inventory.airport_information(&iata).await?))
}

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use skylane_core::models::FlightSummary;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AirportIdentifier {
    pub iata: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub departure: AirportIdentifier,
    pub arrival: AirportIdentifier,
    /// Epoch milliseconds; the calendar date is taken in the departure
    /// airport's zone.
    pub depart: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/flights/search", post(search_flights))
}

async fn search_flights(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<FlightSummary>>, ApiError> {
    let summaries = state
        .inventory
        .flights_available(&req.departure.iata, &req.arrival.iata, req.depart)
        .await?;
    Ok(Json(summaries))
}

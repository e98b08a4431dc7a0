use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Wire mapping of the core error taxonomy: bad request for input errors,
/// not found for missing entities, conflict for failed seat holds and
/// unprocessable for booking validation failures.
#[derive(Debug)]
pub struct ApiError(skylane_core::Error);

impl From<skylane_core::Error> for ApiError {
    fn from(err: skylane_core::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use skylane_core::Error;

        let (status, error_message) = match self.0 {
            Error::Input(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Reservation(msg) => (StatusCode::CONFLICT, msg),
            Error::Booking(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Error::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

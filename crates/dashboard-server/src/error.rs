use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Everything a handler can fail with. Axum turns these into HTTP responses
/// through the `IntoResponse` impl below.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Trade ledger error: {0}")]
    Database(#[from] database::DbError),
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(db_err) => {
                // Log the detail, return a generic message; row contents and
                // connection strings stay out of API responses.
                tracing::error!(error = ?db_err, "Ledger access failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The trade ledger could not be read".to_string(),
                )
            }
            AppError::InvalidRange(message) => (StatusCode::BAD_REQUEST, message),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

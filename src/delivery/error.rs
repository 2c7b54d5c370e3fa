use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for delivery zone operations
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Delivery zone {0} not found")]
    ZoneNotFound(i32),

    #[error("Invalid CEP: {0}")]
    InvalidCep(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for DeliveryError {
    fn from(err: sqlx::Error) -> Self {
        DeliveryError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            DeliveryError::ZoneNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Delivery zone with id {} not found", id),
            ),
            DeliveryError::InvalidCep(msg) => (StatusCode::BAD_REQUEST, msg),
            DeliveryError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            DeliveryError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

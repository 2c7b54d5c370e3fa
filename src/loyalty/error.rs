use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for loyalty operations
#[derive(Debug, thiserror::Error)]
pub enum LoyaltyError {
    #[error("Insufficient points")]
    InsufficientPoints,

    #[error("Reward {0} not found")]
    RewardNotFound(i32),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for LoyaltyError {
    fn from(err: sqlx::Error) -> Self {
        LoyaltyError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for LoyaltyError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            LoyaltyError::InsufficientPoints => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Insufficient points".to_string(),
            ),
            LoyaltyError::RewardNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Reward with id {} not found", id),
            ),
            LoyaltyError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            LoyaltyError::DatabaseError(msg) => {
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

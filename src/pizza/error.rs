use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for pizza option and composition operations
#[derive(Debug, thiserror::Error)]
pub enum PizzaError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Pizza size {0} not found")]
    SizeNotFound(i32),

    #[error("Pizza border {0} not found")]
    BorderNotFound(i32),

    #[error("Flavor product {0} not found")]
    FlavorNotFound(i32),

    #[error("This size allows at most {max} flavors")]
    MaxFlavorsExceeded { max: i32 },

    #[error("Select at least one flavor")]
    NoFlavorsSelected,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for PizzaError {
    fn from(err: sqlx::Error) -> Self {
        PizzaError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for PizzaError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            PizzaError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "A database error occurred".to_string())
            }
            PizzaError::SizeNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Pizza size with id {} not found", id),
            ),
            PizzaError::BorderNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Pizza border with id {} not found", id),
            ),
            PizzaError::FlavorNotFound(id) => (
                StatusCode::BAD_REQUEST,
                format!("Flavor product with id {} not found", id),
            ),
            PizzaError::MaxFlavorsExceeded { max } => (
                StatusCode::BAD_REQUEST,
                format!("This size allows at most {} flavors", max),
            ),
            PizzaError::NoFlavorsSelected => (
                StatusCode::BAD_REQUEST,
                "Select at least one flavor".to_string(),
            ),
            PizzaError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

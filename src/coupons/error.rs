use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;

/// Error types for coupon validation and management
///
/// Every validation rejection carries a human-readable reason; none of
/// them are retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    #[error("Coupon not found or inactive")]
    NotFound,

    #[error("This coupon is not valid yet")]
    NotYetValid,

    #[error("This coupon has expired")]
    Expired,

    #[error("This coupon has reached its usage limit")]
    UsageLimitReached,

    #[error("Minimum order value for this coupon: {minimum}")]
    BelowMinimum { minimum: Decimal },

    #[error("You have already used this coupon the maximum number of times")]
    PerUserLimitReached,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CouponError {
    fn from(err: sqlx::Error) -> Self {
        CouponError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for CouponError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            CouponError::NotFound => (
                StatusCode::NOT_FOUND,
                "Coupon not found or inactive".to_string(),
            ),
            CouponError::NotYetValid => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "This coupon is not valid yet".to_string(),
            ),
            CouponError::Expired => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "This coupon has expired".to_string(),
            ),
            CouponError::UsageLimitReached => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "This coupon has reached its usage limit".to_string(),
            ),
            CouponError::BelowMinimum { minimum } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Minimum order value for this coupon: {}", minimum),
            ),
            CouponError::PerUserLimitReached => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "You have already used this coupon the maximum number of times".to_string(),
            ),
            CouponError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            CouponError::DatabaseError(msg) => {
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

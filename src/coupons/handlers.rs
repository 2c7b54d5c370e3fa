// HTTP handlers for coupon validation and back-office management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::coupons::engine::normalize_code;
use crate::coupons::error::CouponError;
use crate::coupons::models::{
    Coupon, CouponQuote, CouponUse, CreateCoupon, DiscountType, UpdateCoupon,
    ValidateCouponRequest,
};
use crate::validation;
use crate::AppState;

/// Handler for POST /api/coupons/validate
///
/// Validates a code against the given cart total. Works for anonymous
/// carts too; the per-user cap is only checked for signed-in users.
pub async fn validate_coupon_handler(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Json(request): Json<ValidateCouponRequest>,
) -> Result<Json<CouponQuote>, CouponError> {
    request
        .validate()
        .map_err(|e| CouponError::ValidationError(e.to_string()))?;

    let quote = state
        .coupon_service
        .validate(
            &request.code,
            request.order_total,
            user.map(|u| u.user_id),
        )
        .await?;

    Ok(Json(quote))
}

/// Handler for GET /api/coupons
/// Lists active coupons for the storefront promotions page
pub async fn list_coupons_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Coupon>>, CouponError> {
    let coupons = state.coupon_service.repo().list(true).await?;
    Ok(Json(coupons))
}

/// Handler for GET /api/admin/coupons
/// Lists every coupon, including inactive ones
pub async fn list_all_coupons_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Coupon>>, CouponError> {
    let coupons = state.coupon_service.repo().list(false).await?;
    Ok(Json(coupons))
}

/// Handler for POST /api/admin/coupons
pub async fn create_coupon_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateCoupon>,
) -> Result<(StatusCode, Json<Coupon>), CouponError> {
    payload
        .validate()
        .map_err(|e| CouponError::ValidationError(e.to_string()))?;

    if validation::validate_non_negative_amount(payload.discount_value).is_err() {
        return Err(CouponError::ValidationError(
            "Discount value must not be negative".to_string(),
        ));
    }
    if payload.discount_type == DiscountType::Percentage
        && validation::validate_percentage(payload.discount_value).is_err()
    {
        return Err(CouponError::ValidationError(
            "Percentage discount must be between 0 and 100".to_string(),
        ));
    }
    if validation::validate_non_negative_amount(payload.min_order_value).is_err() {
        return Err(CouponError::ValidationError(
            "Minimum order value must not be negative".to_string(),
        ));
    }

    let coupon = state.coupon_service.repo().create(&payload).await?;
    tracing::info!("Created coupon {} ({})", coupon.id, coupon.code);
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Handler for GET /api/admin/coupons/:id/uses
/// Redemption log for one coupon, newest first
pub async fn coupon_uses_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CouponUse>>, CouponError> {
    state
        .coupon_service
        .repo()
        .find_by_id(id)
        .await?
        .ok_or(CouponError::NotFound)?;

    let uses = state.coupon_service.repo().list_uses(id).await?;
    Ok(Json(uses))
}

/// Handler for PUT /api/admin/coupons/:id
/// Partial update keeping existing values for omitted fields
pub async fn update_coupon_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCoupon>,
) -> Result<Json<Coupon>, CouponError> {
    let mut existing = state
        .coupon_service
        .repo()
        .find_by_id(id)
        .await?
        .ok_or(CouponError::NotFound)?;

    if let Some(code) = payload.code {
        existing.code = normalize_code(&code);
    }
    if payload.description.is_some() {
        existing.description = payload.description;
    }
    if let Some(discount_type) = payload.discount_type {
        existing.discount_type = discount_type;
    }
    if let Some(discount_value) = payload.discount_value {
        existing.discount_value = discount_value;
    }
    if let Some(min_order_value) = payload.min_order_value {
        existing.min_order_value = min_order_value;
    }
    if let Some(max_uses) = payload.max_uses {
        existing.max_uses = max_uses;
    }
    if let Some(max_uses_per_user) = payload.max_uses_per_user {
        existing.max_uses_per_user = max_uses_per_user;
    }
    if let Some(valid_from) = payload.valid_from {
        existing.valid_from = valid_from;
    }
    if let Some(valid_until) = payload.valid_until {
        existing.valid_until = valid_until;
    }
    if let Some(is_active) = payload.is_active {
        existing.is_active = is_active;
    }

    let updated = state.coupon_service.repo().update(&existing).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/admin/coupons/:id
pub async fn delete_coupon_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, CouponError> {
    if !state.coupon_service.repo().delete(id).await? {
        return Err(CouponError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

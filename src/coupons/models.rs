use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// How a coupon's discount value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Discount is a percentage of the order total (e.g. 10 = 10% off)
    Percentage,
    /// Discount is a fixed amount subtracted from the order total
    Fixed,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountType::Percentage => write!(f, "percentage"),
            DiscountType::Fixed => write!(f, "fixed"),
        }
    }
}

/// Coupon database model
///
/// Codes are stored upper-cased and matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    pub id: i32,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Decimal,
    /// None means unlimited global uses
    pub max_uses: Option<i32>,
    pub uses_count: i32,
    /// None means unlimited uses per user
    pub max_uses_per_user: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One redemption event; append-only, used for the per-user cap
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CouponUse {
    pub id: i32,
    pub coupon_id: i32,
    pub user_id: i32,
    pub order_id: Option<Uuid>,
    pub used_at: DateTime<Utc>,
}

/// Request DTO for creating a coupon
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCoupon {
    #[validate(length(min = 1, message = "Code must not be empty"))]
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_value: Decimal,
    pub max_uses: Option<i32>,
    pub max_uses_per_user: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Request DTO for updating a coupon
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCoupon {
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    pub max_uses: Option<Option<i32>>,
    pub max_uses_per_user: Option<Option<i32>>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

/// Request DTO for validating a coupon against a cart total
#[derive(Debug, Deserialize, Validate)]
pub struct ValidateCouponRequest {
    #[validate(length(min = 1, message = "Code must not be empty"))]
    pub code: String,
    pub order_total: Decimal,
}

/// A successfully validated coupon with the computed discount
#[derive(Debug, Clone, Serialize)]
pub struct CouponQuote {
    pub coupon: Coupon,
    pub discount: Decimal,
}

fn default_true() -> bool {
    true
}

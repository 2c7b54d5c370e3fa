use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::coupons::engine;
use crate::coupons::error::CouponError;
use crate::coupons::models::CouponQuote;
use crate::coupons::repository::CouponRepository;

/// Service for coupon validation and application
#[derive(Clone)]
pub struct CouponService {
    repo: CouponRepository,
}

impl CouponService {
    /// Create a new CouponService
    pub fn new(repo: CouponRepository) -> Self {
        Self { repo }
    }

    /// Validate a coupon code against an order total
    ///
    /// Looks the code up among active coupons, counts the user's prior
    /// redemptions when a user is known, and runs the validation engine.
    /// Returns the coupon together with the clamped discount.
    pub async fn validate(
        &self,
        code: &str,
        order_total: Decimal,
        user_id: Option<i32>,
    ) -> Result<CouponQuote, CouponError> {
        let coupon = self
            .repo
            .find_active_by_code(code)
            .await?
            .ok_or(CouponError::NotFound)?;

        let prior_user_uses = match user_id {
            Some(user_id) => Some(self.repo.count_user_uses(coupon.id, user_id).await?),
            None => None,
        };

        let discount = engine::evaluate(&coupon, order_total, prior_user_uses, Utc::now())?;

        Ok(CouponQuote { coupon, discount })
    }

    /// Record a coupon redemption at checkout confirmation
    ///
    /// Appends a coupon_uses row and atomically increments the global
    /// uses_count. Deliberately not transactional with `validate`; a race
    /// between two concurrent redemptions of a last remaining use is
    /// accepted (see DESIGN.md).
    pub async fn apply(
        &self,
        coupon_id: i32,
        user_id: i32,
        order_id: Option<Uuid>,
    ) -> Result<(), CouponError> {
        self.repo.record_use(coupon_id, user_id, order_id).await?;
        tracing::info!("Coupon {} redeemed by user {}", coupon_id, user_id);
        Ok(())
    }

    /// Access to the underlying repository for admin CRUD handlers
    pub fn repo(&self) -> &CouponRepository {
        &self.repo
    }
}

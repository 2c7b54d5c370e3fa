use sqlx::PgPool;
use uuid::Uuid;

use crate::coupons::engine::normalize_code;
use crate::coupons::error::CouponError;
use crate::coupons::models::{Coupon, CreateCoupon};

/// Repository for coupon storage and the redemption log
#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    /// Create a new CouponRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active coupon by its normalized code
    pub async fn find_active_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponError> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "SELECT * FROM coupons WHERE code = $1 AND is_active = TRUE",
        )
        .bind(normalize_code(code))
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Find a coupon by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Coupon>, CouponError> {
        let coupon = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    /// List coupons, newest first, optionally active-only
    pub async fn list(&self, active_only: bool) -> Result<Vec<Coupon>, CouponError> {
        let query = if active_only {
            "SELECT * FROM coupons WHERE is_active = TRUE ORDER BY created_at DESC"
        } else {
            "SELECT * FROM coupons ORDER BY created_at DESC"
        };

        let coupons = sqlx::query_as::<_, Coupon>(query)
            .fetch_all(&self.pool)
            .await?;

        Ok(coupons)
    }

    /// Create a coupon with an upper-cased unique code
    pub async fn create(&self, coupon: &CreateCoupon) -> Result<Coupon, CouponError> {
        let created = sqlx::query_as::<_, Coupon>(
            r#"
            INSERT INTO coupons
                (code, description, discount_type, discount_value, min_order_value,
                 max_uses, max_uses_per_user, valid_from, valid_until, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()), $9, $10)
            RETURNING *
            "#,
        )
        .bind(normalize_code(&coupon.code))
        .bind(&coupon.description)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_order_value)
        .bind(coupon.max_uses)
        .bind(coupon.max_uses_per_user)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return CouponError::ValidationError(format!(
                        "Coupon code '{}' already exists",
                        normalize_code(&coupon.code)
                    ));
                }
            }
            CouponError::DatabaseError(e.to_string())
        })?;

        Ok(created)
    }

    /// Update a coupon with already-merged field values
    pub async fn update(&self, existing: &Coupon) -> Result<Coupon, CouponError> {
        let updated = sqlx::query_as::<_, Coupon>(
            r#"
            UPDATE coupons
            SET code = $1,
                description = $2,
                discount_type = $3,
                discount_value = $4,
                min_order_value = $5,
                max_uses = $6,
                max_uses_per_user = $7,
                valid_from = $8,
                valid_until = $9,
                is_active = $10,
                updated_at = NOW()
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(normalize_code(&existing.code))
        .bind(&existing.description)
        .bind(existing.discount_type)
        .bind(existing.discount_value)
        .bind(existing.min_order_value)
        .bind(existing.max_uses)
        .bind(existing.max_uses_per_user)
        .bind(existing.valid_from)
        .bind(existing.valid_until)
        .bind(existing.is_active)
        .bind(existing.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a coupon; returns false when no row matched
    pub async fn delete(&self, id: i32) -> Result<bool, CouponError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The redemption log of one coupon, newest first
    pub async fn list_uses(
        &self,
        coupon_id: i32,
    ) -> Result<Vec<crate::coupons::models::CouponUse>, CouponError> {
        let uses = sqlx::query_as::<_, crate::coupons::models::CouponUse>(
            "SELECT * FROM coupon_uses WHERE coupon_id = $1 ORDER BY used_at DESC",
        )
        .bind(coupon_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(uses)
    }

    /// How many times a user has redeemed a coupon
    pub async fn count_user_uses(&self, coupon_id: i32, user_id: i32) -> Result<i64, CouponError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coupon_uses WHERE coupon_id = $1 AND user_id = $2",
        )
        .bind(coupon_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Record a redemption and bump the global counter
    ///
    /// The counter bump is a single atomic increment so concurrent
    /// redemptions cannot lose updates on uses_count itself.
    pub async fn record_use(
        &self,
        coupon_id: i32,
        user_id: i32,
        order_id: Option<Uuid>,
    ) -> Result<(), CouponError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO coupon_uses (coupon_id, user_id, order_id) VALUES ($1, $2, $3)")
            .bind(coupon_id)
            .bind(user_id)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE coupons SET uses_count = uses_count + 1, updated_at = NOW() WHERE id = $1")
            .bind(coupon_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

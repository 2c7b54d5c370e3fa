use sqlx::PgPool;

use crate::delivery::error::DeliveryError;
use crate::delivery::models::{CreateDeliveryZone, DeliveryZone};

/// Repository for delivery zone operations
#[derive(Clone)]
pub struct DeliveryZoneRepository {
    pool: PgPool,
}

impl DeliveryZoneRepository {
    /// Create a new DeliveryZoneRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List zones ordered for display, optionally active-only
    pub async fn list(&self, active_only: bool) -> Result<Vec<DeliveryZone>, DeliveryError> {
        let query = if active_only {
            "SELECT * FROM delivery_zones WHERE is_active = TRUE ORDER BY display_order, id"
        } else {
            "SELECT * FROM delivery_zones ORDER BY display_order, id"
        };

        let zones = sqlx::query_as::<_, DeliveryZone>(query)
            .fetch_all(&self.pool)
            .await?;

        Ok(zones)
    }

    /// Find a zone by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<DeliveryZone>, DeliveryError> {
        let zone = sqlx::query_as::<_, DeliveryZone>("SELECT * FROM delivery_zones WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(zone)
    }

    /// Create a delivery zone
    pub async fn create(&self, zone: &CreateDeliveryZone) -> Result<DeliveryZone, DeliveryError> {
        let created = sqlx::query_as::<_, DeliveryZone>(
            r#"
            INSERT INTO delivery_zones
                (name, neighborhoods, delivery_fee, estimated_time_min, estimated_time_max,
                 display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&zone.name)
        .bind(&zone.neighborhoods)
        .bind(zone.delivery_fee)
        .bind(zone.estimated_time_min)
        .bind(zone.estimated_time_max)
        .bind(zone.display_order)
        .bind(zone.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a zone with already-merged field values
    pub async fn update(&self, existing: &DeliveryZone) -> Result<DeliveryZone, DeliveryError> {
        let updated = sqlx::query_as::<_, DeliveryZone>(
            r#"
            UPDATE delivery_zones
            SET name = $1,
                neighborhoods = $2,
                delivery_fee = $3,
                estimated_time_min = $4,
                estimated_time_max = $5,
                display_order = $6,
                is_active = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&existing.name)
        .bind(&existing.neighborhoods)
        .bind(existing.delivery_fee)
        .bind(existing.estimated_time_min)
        .bind(existing.estimated_time_max)
        .bind(existing.display_order)
        .bind(existing.is_active)
        .bind(existing.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a zone; returns false when no row matched
    pub async fn delete(&self, id: i32) -> Result<bool, DeliveryError> {
        let result = sqlx::query("DELETE FROM delivery_zones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

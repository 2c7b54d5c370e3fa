use sqlx::PgPool;

use crate::pizza::error::PizzaError;
use crate::pizza::models::{
    CreatePizzaBorder, CreatePizzaSize, PizzaBorder, PizzaSize, ProductPrice,
};

/// Repository for pizza size, border and per-size price operations
#[derive(Clone)]
pub struct PizzaOptionsRepository {
    pool: PgPool,
}

impl PizzaOptionsRepository {
    /// Create a new PizzaOptionsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List pizza sizes, optionally restricted to active ones
    pub async fn list_sizes(&self, active_only: bool) -> Result<Vec<PizzaSize>, PizzaError> {
        let query = if active_only {
            "SELECT * FROM pizza_sizes WHERE is_active = TRUE ORDER BY display_order, id"
        } else {
            "SELECT * FROM pizza_sizes ORDER BY display_order, id"
        };

        let sizes = sqlx::query_as::<_, PizzaSize>(query)
            .fetch_all(&self.pool)
            .await?;

        Ok(sizes)
    }

    /// Find a pizza size by ID
    pub async fn find_size(&self, id: i32) -> Result<Option<PizzaSize>, PizzaError> {
        let size = sqlx::query_as::<_, PizzaSize>("SELECT * FROM pizza_sizes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(size)
    }

    /// Create a pizza size
    pub async fn create_size(&self, size: &CreatePizzaSize) -> Result<PizzaSize, PizzaError> {
        let created = sqlx::query_as::<_, PizzaSize>(
            r#"
            INSERT INTO pizza_sizes (code, name, description, price_multiplier, max_flavors, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&size.code)
        .bind(&size.name)
        .bind(&size.description)
        .bind(size.price_multiplier)
        .bind(size.max_flavors)
        .bind(size.display_order)
        .bind(size.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a pizza size, keeping existing values for omitted fields
    pub async fn update_size(&self, existing: &PizzaSize) -> Result<PizzaSize, PizzaError> {
        let updated = sqlx::query_as::<_, PizzaSize>(
            r#"
            UPDATE pizza_sizes
            SET code = $1,
                name = $2,
                description = $3,
                price_multiplier = $4,
                max_flavors = $5,
                display_order = $6,
                is_active = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&existing.code)
        .bind(&existing.name)
        .bind(&existing.description)
        .bind(existing.price_multiplier)
        .bind(existing.max_flavors)
        .bind(existing.display_order)
        .bind(existing.is_active)
        .bind(existing.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a pizza size; returns false when no row matched
    pub async fn delete_size(&self, id: i32) -> Result<bool, PizzaError> {
        let result = sqlx::query("DELETE FROM pizza_sizes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List pizza borders, optionally restricted to active ones
    pub async fn list_borders(&self, active_only: bool) -> Result<Vec<PizzaBorder>, PizzaError> {
        let query = if active_only {
            "SELECT * FROM pizza_borders WHERE is_active = TRUE ORDER BY display_order, id"
        } else {
            "SELECT * FROM pizza_borders ORDER BY display_order, id"
        };

        let borders = sqlx::query_as::<_, PizzaBorder>(query)
            .fetch_all(&self.pool)
            .await?;

        Ok(borders)
    }

    /// Find a pizza border by ID
    pub async fn find_border(&self, id: i32) -> Result<Option<PizzaBorder>, PizzaError> {
        let border = sqlx::query_as::<_, PizzaBorder>("SELECT * FROM pizza_borders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(border)
    }

    /// Create a pizza border
    pub async fn create_border(
        &self,
        border: &CreatePizzaBorder,
    ) -> Result<PizzaBorder, PizzaError> {
        let created = sqlx::query_as::<_, PizzaBorder>(
            r#"
            INSERT INTO pizza_borders (name, description, additional_price, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&border.name)
        .bind(&border.description)
        .bind(border.additional_price)
        .bind(border.display_order)
        .bind(border.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a pizza border with already-merged field values
    pub async fn update_border(&self, existing: &PizzaBorder) -> Result<PizzaBorder, PizzaError> {
        let updated = sqlx::query_as::<_, PizzaBorder>(
            r#"
            UPDATE pizza_borders
            SET name = $1,
                description = $2,
                additional_price = $3,
                display_order = $4,
                is_active = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&existing.name)
        .bind(&existing.description)
        .bind(existing.additional_price)
        .bind(existing.display_order)
        .bind(existing.is_active)
        .bind(existing.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a pizza border; returns false when no row matched
    pub async fn delete_border(&self, id: i32) -> Result<bool, PizzaError> {
        let result = sqlx::query("DELETE FROM pizza_borders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List per-size price overrides for one product
    pub async fn prices_for_product(&self, product_id: i32) -> Result<Vec<ProductPrice>, PizzaError> {
        let prices = sqlx::query_as::<_, ProductPrice>(
            "SELECT * FROM product_prices WHERE product_id = $1 ORDER BY size_id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(prices)
    }

    /// List per-size price overrides for a set of products
    pub async fn prices_for_products(
        &self,
        product_ids: &[i32],
    ) -> Result<Vec<ProductPrice>, PizzaError> {
        let prices = sqlx::query_as::<_, ProductPrice>(
            "SELECT * FROM product_prices WHERE product_id = ANY($1)",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(prices)
    }

    /// Find one price override by (product, size)
    pub async fn find_price(
        &self,
        product_id: i32,
        size_id: i32,
    ) -> Result<Option<ProductPrice>, PizzaError> {
        let price = sqlx::query_as::<_, ProductPrice>(
            "SELECT * FROM product_prices WHERE product_id = $1 AND size_id = $2",
        )
        .bind(product_id)
        .bind(size_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }

    /// Create or replace the price override for (product, size)
    pub async fn upsert_price(
        &self,
        product_id: i32,
        size_id: i32,
        price: rust_decimal::Decimal,
    ) -> Result<ProductPrice, PizzaError> {
        let row = sqlx::query_as::<_, ProductPrice>(
            r#"
            INSERT INTO product_prices (product_id, size_id, price)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, size_id)
            DO UPDATE SET price = EXCLUDED.price, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(size_id)
        .bind(price)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Delete the price override for (product, size); returns false when
    /// no row matched
    pub async fn delete_price(&self, product_id: i32, size_id: i32) -> Result<bool, PizzaError> {
        let result = sqlx::query("DELETE FROM product_prices WHERE product_id = $1 AND size_id = $2")
            .bind(product_id)
            .bind(size_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

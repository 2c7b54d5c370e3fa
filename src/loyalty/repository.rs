use sqlx::PgPool;
use uuid::Uuid;

use crate::loyalty::error::LoyaltyError;
use crate::loyalty::models::{
    CreateLoyaltyReward, LoyaltyBalance, LoyaltyReward, LoyaltyTransaction, TransactionType,
};

/// Repository for loyalty balances, the transaction ledger and rewards
#[derive(Clone)]
pub struct LoyaltyRepository {
    pool: PgPool,
}

impl LoyaltyRepository {
    /// Create a new LoyaltyRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read a user's balance row, if one exists
    pub async fn balance(&self, user_id: i32) -> Result<Option<LoyaltyBalance>, LoyaltyError> {
        let balance = sqlx::query_as::<_, LoyaltyBalance>(
            "SELECT * FROM loyalty_points WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Credit points to a user, creating the balance row on first accrual
    ///
    /// A single upsert increments total, lifetime and order count
    /// atomically, so concurrent accruals cannot lose updates.
    pub async fn credit(&self, user_id: i32, points: i32) -> Result<LoyaltyBalance, LoyaltyError> {
        let balance = sqlx::query_as::<_, LoyaltyBalance>(
            r#"
            INSERT INTO loyalty_points (user_id, total_points, lifetime_points, orders_count)
            VALUES ($1, $2, $2, 1)
            ON CONFLICT (user_id)
            DO UPDATE SET
                total_points = loyalty_points.total_points + $2,
                lifetime_points = loyalty_points.lifetime_points + $2,
                orders_count = loyalty_points.orders_count + 1,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(points)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Debit spendable points only; lifetime_points stays untouched
    pub async fn debit(&self, user_id: i32, points: i32) -> Result<LoyaltyBalance, LoyaltyError> {
        let balance = sqlx::query_as::<_, LoyaltyBalance>(
            r#"
            UPDATE loyalty_points
            SET total_points = total_points - $2,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(points)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(LoyaltyError::InsufficientPoints)?;

        Ok(balance)
    }

    /// Append a ledger entry
    pub async fn append_transaction(
        &self,
        user_id: i32,
        order_id: Option<Uuid>,
        points: i32,
        transaction_type: TransactionType,
        description: Option<&str>,
    ) -> Result<(), LoyaltyError> {
        sqlx::query(
            r#"
            INSERT INTO loyalty_transactions (user_id, order_id, points, transaction_type, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(order_id)
        .bind(points)
        .bind(transaction_type)
        .bind(description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// A user's most recent ledger entries, newest first
    pub async fn recent_transactions(
        &self,
        user_id: i32,
        limit: i64,
    ) -> Result<Vec<LoyaltyTransaction>, LoyaltyError> {
        let transactions = sqlx::query_as::<_, LoyaltyTransaction>(
            r#"
            SELECT * FROM loyalty_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// List rewards ordered for display, optionally active-only
    pub async fn list_rewards(&self, active_only: bool) -> Result<Vec<LoyaltyReward>, LoyaltyError> {
        let query = if active_only {
            "SELECT * FROM loyalty_rewards WHERE is_active = TRUE ORDER BY display_order, id"
        } else {
            "SELECT * FROM loyalty_rewards ORDER BY display_order, id"
        };

        let rewards = sqlx::query_as::<_, LoyaltyReward>(query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rewards)
    }

    /// Find a reward by ID
    pub async fn find_reward(&self, id: i32) -> Result<Option<LoyaltyReward>, LoyaltyError> {
        let reward = sqlx::query_as::<_, LoyaltyReward>(
            "SELECT * FROM loyalty_rewards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reward)
    }

    /// Create a reward
    pub async fn create_reward(
        &self,
        reward: &CreateLoyaltyReward,
    ) -> Result<LoyaltyReward, LoyaltyError> {
        let created = sqlx::query_as::<_, LoyaltyReward>(
            r#"
            INSERT INTO loyalty_rewards
                (name, description, points_required, reward_type, reward_value, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&reward.name)
        .bind(&reward.description)
        .bind(reward.points_required)
        .bind(reward.reward_type)
        .bind(reward.reward_value)
        .bind(reward.display_order)
        .bind(reward.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a reward with already-merged field values
    pub async fn update_reward(
        &self,
        existing: &LoyaltyReward,
    ) -> Result<LoyaltyReward, LoyaltyError> {
        let updated = sqlx::query_as::<_, LoyaltyReward>(
            r#"
            UPDATE loyalty_rewards
            SET name = $1,
                description = $2,
                points_required = $3,
                reward_type = $4,
                reward_value = $5,
                display_order = $6,
                is_active = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&existing.name)
        .bind(&existing.description)
        .bind(existing.points_required)
        .bind(existing.reward_type)
        .bind(existing.reward_value)
        .bind(existing.display_order)
        .bind(existing.is_active)
        .bind(existing.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a reward; returns false when no row matched
    pub async fn delete_reward(&self, id: i32) -> Result<bool, LoyaltyError> {
        let result = sqlx::query("DELETE FROM loyalty_rewards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

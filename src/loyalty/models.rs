use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Kind of ledger entry
///
/// `Expired` exists in the taxonomy but no code path produces it;
/// point expiry is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Earned,
    Redeemed,
    Expired,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Earned => write!(f, "earned"),
            TransactionType::Redeemed => write!(f, "redeemed"),
            TransactionType::Expired => write!(f, "expired"),
        }
    }
}

/// What a reward grants when redeemed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    Discount,
    FreeItem,
    FreePizza,
}

/// Materialized per-user balance
///
/// `total_points` is spendable; `lifetime_points` only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoyaltyBalance {
    pub user_id: i32,
    pub total_points: i32,
    pub lifetime_points: i32,
    pub orders_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only ledger entry; points are signed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoyaltyTransaction {
    pub id: i32,
    pub user_id: i32,
    pub order_id: Option<Uuid>,
    pub points: i32,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A redeemable catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoyaltyReward {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub points_required: i32,
    pub reward_type: RewardType,
    pub reward_value: Option<Decimal>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a reward
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoyaltyReward {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "A reward must cost at least one point"))]
    pub points_required: i32,
    pub reward_type: RewardType,
    pub reward_value: Option<Decimal>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Request DTO for updating a reward
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLoyaltyReward {
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "A reward must cost at least one point"))]
    pub points_required: Option<i32>,
    pub reward_type: Option<RewardType>,
    pub reward_value: Option<Decimal>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Request DTO for redeeming a reward
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub reward_id: i32,
}

/// Balance response; zeroed for users with no balance row yet
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub total_points: i32,
    pub lifetime_points: i32,
    pub orders_count: i32,
}

impl From<Option<LoyaltyBalance>> for BalanceResponse {
    fn from(balance: Option<LoyaltyBalance>) -> Self {
        match balance {
            Some(balance) => Self {
                total_points: balance.total_points,
                lifetime_points: balance.lifetime_points,
                orders_count: balance.orders_count,
            },
            None => Self {
                total_points: 0,
                lifetime_points: 0,
                orders_count: 0,
            },
        }
    }
}

fn default_true() -> bool {
    true
}

// HTTP handlers for loyalty balances, ledger history and rewards

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::loyalty::error::LoyaltyError;
use crate::loyalty::models::{
    BalanceResponse, CreateLoyaltyReward, LoyaltyReward, LoyaltyTransaction, RedeemRequest,
    UpdateLoyaltyReward,
};
use crate::AppState;

/// Most recent ledger entries returned to the profile page
const TRANSACTION_HISTORY_LIMIT: i64 = 20;

/// Handler for GET /api/loyalty/points
/// Current user's balance; zeroed when no accrual has happened yet
pub async fn balance_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<BalanceResponse>, LoyaltyError> {
    let balance = state.loyalty_service.repo().balance(user.user_id).await?;
    Ok(Json(balance.into()))
}

/// Handler for GET /api/loyalty/transactions
/// Current user's most recent ledger entries, newest first
pub async fn transactions_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<LoyaltyTransaction>>, LoyaltyError> {
    let transactions = state
        .loyalty_service
        .repo()
        .recent_transactions(user.user_id, TRANSACTION_HISTORY_LIMIT)
        .await?;

    Ok(Json(transactions))
}

/// Handler for GET /api/loyalty/rewards
/// Active rewards for the storefront
pub async fn list_rewards_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<LoyaltyReward>>, LoyaltyError> {
    let rewards = state.loyalty_service.repo().list_rewards(true).await?;
    Ok(Json(rewards))
}

/// Handler for POST /api/loyalty/redeem
pub async fn redeem_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<RedeemRequest>,
) -> Result<Json<LoyaltyReward>, LoyaltyError> {
    let reward = state
        .loyalty_service
        .repo()
        .find_reward(request.reward_id)
        .await?
        .filter(|r| r.is_active)
        .ok_or(LoyaltyError::RewardNotFound(request.reward_id))?;

    state.loyalty_service.redeem(user.user_id, &reward).await?;

    Ok(Json(reward))
}

/// Handler for GET /api/admin/loyalty/rewards
pub async fn list_all_rewards_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<LoyaltyReward>>, LoyaltyError> {
    let rewards = state.loyalty_service.repo().list_rewards(false).await?;
    Ok(Json(rewards))
}

/// Handler for POST /api/admin/loyalty/rewards
pub async fn create_reward_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateLoyaltyReward>,
) -> Result<(StatusCode, Json<LoyaltyReward>), LoyaltyError> {
    payload
        .validate()
        .map_err(|e| LoyaltyError::ValidationError(e.to_string()))?;

    let reward = state.loyalty_service.repo().create_reward(&payload).await?;
    tracing::info!("Created loyalty reward {} ({})", reward.id, reward.name);
    Ok((StatusCode::CREATED, Json(reward)))
}

/// Handler for PUT /api/admin/loyalty/rewards/:id
/// Partial update keeping existing values for omitted fields
pub async fn update_reward_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateLoyaltyReward>,
) -> Result<Json<LoyaltyReward>, LoyaltyError> {
    payload
        .validate()
        .map_err(|e| LoyaltyError::ValidationError(e.to_string()))?;

    let mut existing = state
        .loyalty_service
        .repo()
        .find_reward(id)
        .await?
        .ok_or(LoyaltyError::RewardNotFound(id))?;

    if let Some(name) = payload.name {
        existing.name = name;
    }
    if payload.description.is_some() {
        existing.description = payload.description;
    }
    if let Some(points_required) = payload.points_required {
        existing.points_required = points_required;
    }
    if let Some(reward_type) = payload.reward_type {
        existing.reward_type = reward_type;
    }
    if payload.reward_value.is_some() {
        existing.reward_value = payload.reward_value;
    }
    if let Some(display_order) = payload.display_order {
        existing.display_order = display_order;
    }
    if let Some(is_active) = payload.is_active {
        existing.is_active = is_active;
    }

    let updated = state.loyalty_service.repo().update_reward(&existing).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/admin/loyalty/rewards/:id
pub async fn delete_reward_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, LoyaltyError> {
    if !state.loyalty_service.repo().delete_reward(id).await? {
        return Err(LoyaltyError::RewardNotFound(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

use uuid::Uuid;

use crate::loyalty::error::LoyaltyError;
use crate::loyalty::ledger::Accrual;
use crate::loyalty::models::{LoyaltyReward, TransactionType};
use crate::loyalty::repository::LoyaltyRepository;

/// Service for loyalty accrual and redemption
#[derive(Clone)]
pub struct LoyaltyService {
    repo: LoyaltyRepository,
}

impl LoyaltyService {
    /// Create a new LoyaltyService
    pub fn new(repo: LoyaltyRepository) -> Self {
        Self { repo }
    }

    /// Award points to a user
    ///
    /// No-op returning 0 when the accrual is worth nothing. Otherwise the
    /// balance is upserted with atomic increments and an `earned` entry is
    /// appended to the ledger.
    pub async fn earn(
        &self,
        user_id: i32,
        order_id: Option<Uuid>,
        accrual: Accrual,
        description: Option<&str>,
    ) -> Result<i32, LoyaltyError> {
        let points = accrual.effective_points();
        if points <= 0 {
            return Ok(0);
        }

        let balance = self.repo.credit(user_id, points).await?;
        self.repo
            .append_transaction(
                user_id,
                order_id,
                points,
                TransactionType::Earned,
                description.or(Some("Pontos ganhos no pedido")),
            )
            .await?;

        tracing::info!(
            "Awarded {} points to user {} (balance now {})",
            points,
            user_id,
            balance.total_points
        );
        Ok(points)
    }

    /// Redeem a reward against the user's spendable balance
    ///
    /// Fails with InsufficientPoints when the balance cannot cover the
    /// reward. Only `total_points` is decremented; `lifetime_points`
    /// records cumulative earnings and is never reduced.
    pub async fn redeem(
        &self,
        user_id: i32,
        reward: &LoyaltyReward,
    ) -> Result<(), LoyaltyError> {
        let balance = self
            .repo
            .balance(user_id)
            .await?
            .ok_or(LoyaltyError::InsufficientPoints)?;

        if balance.total_points < reward.points_required {
            return Err(LoyaltyError::InsufficientPoints);
        }

        self.repo.debit(user_id, reward.points_required).await?;
        let description = format!("Resgatou: {}", reward.name);
        self.repo
            .append_transaction(
                user_id,
                None,
                -reward.points_required,
                TransactionType::Redeemed,
                Some(description.as_str()),
            )
            .await?;

        tracing::info!(
            "User {} redeemed reward {} for {} points",
            user_id,
            reward.id,
            reward.points_required
        );
        Ok(())
    }

    /// Access to the underlying repository for handlers
    pub fn repo(&self) -> &LoyaltyRepository {
        &self.repo
    }
}

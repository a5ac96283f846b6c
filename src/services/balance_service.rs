//! Balance ledger service: summary reads with degraded fallbacks, and the
//! external-adjustment entry points (deposits, withdrawals, bonuses).

use crate::error::{AppError, AppResult};
use crate::models::{BalanceSummary, BalanceTransaction, TransactionType, UserBalance};
use crate::repositories::{BalanceRepository, InvestmentRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

pub struct BalanceService {
    balance_repo: Arc<BalanceRepository>,
    investment_repo: Arc<InvestmentRepository>,
    summary_timeout: Duration,
}

impl BalanceService {
    pub fn new(
        balance_repo: Arc<BalanceRepository>,
        investment_repo: Arc<InvestmentRepository>,
        summary_timeout: Duration,
    ) -> Self {
        Self {
            balance_repo,
            investment_repo,
            summary_timeout,
        }
    }

    /// Aggregate view of a user's funds.
    ///
    /// Fails closed, never loud: if the primary read exceeds the timeout or
    /// errors, the summary is recomputed from the append-only ledger and
    /// the active investments; if that also fails, an all-zero summary is
    /// returned so callers stay non-blocking.
    pub async fn get_balance_summary(&self, user_id: Uuid) -> BalanceSummary {
        match timeout(self.summary_timeout, self.primary_summary(user_id)).await {
            Ok(Ok(summary)) => summary,
            Ok(Err(e)) => {
                warn!("Primary balance read failed for {}: {}; recomputing", user_id, e);
                self.recomputed_summary(user_id).await
            }
            Err(_) => {
                warn!(
                    "Primary balance read for {} exceeded {:?}; recomputing",
                    user_id, self.summary_timeout
                );
                self.recomputed_summary(user_id).await
            }
        }
    }

    async fn primary_summary(&self, user_id: Uuid) -> AppResult<BalanceSummary> {
        let balance = self
            .balance_repo
            .get_or_create_balance(user_id)
            .await
            .map_err(AppError::from)?;
        let aggregates = self
            .investment_repo
            .active_aggregates(user_id)
            .await
            .map_err(AppError::from)?;

        Ok(BalanceSummary {
            available: balance.available_balance,
            invested: balance.invested_balance,
            total: balance.total(),
            active_count: aggregates.active_count,
            total_invested: aggregates.total_invested,
            total_profit: aggregates.total_profit,
        })
    }

    /// Full recomputation from source data: the ledger's signed amounts sum
    /// to the available balance, and active investments carry the invested
    /// value.
    async fn recomputed_summary(&self, user_id: Uuid) -> BalanceSummary {
        let available = self.balance_repo.recompute_available_from_ledger(user_id);
        let aggregates = self.investment_repo.active_aggregates(user_id);

        match tokio::try_join!(available, aggregates) {
            Ok((available, aggregates)) => BalanceSummary {
                available,
                invested: aggregates.current_value,
                total: available + aggregates.current_value,
                active_count: aggregates.active_count,
                total_invested: aggregates.total_invested,
                total_profit: aggregates.total_profit,
            },
            Err(e) => {
                warn!(
                    "Balance recomputation failed for {}: {}; returning zero summary",
                    user_id, e
                );
                BalanceSummary::zero()
            }
        }
    }

    pub async fn has_sufficient_balance(&self, user_id: Uuid, amount: Decimal) -> AppResult<bool> {
        self.balance_repo
            .has_sufficient_balance(user_id, amount)
            .await
            .map_err(AppError::from)
    }

    pub async fn get_balance(&self, user_id: Uuid) -> AppResult<Option<UserBalance>> {
        self.balance_repo
            .get_balance(user_id)
            .await
            .map_err(AppError::from)
    }

    pub async fn get_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<BalanceTransaction>> {
        self.balance_repo
            .get_user_transactions(user_id, limit)
            .await
            .map_err(AppError::from)
    }

    /// Credit an approved deposit
    pub async fn record_deposit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        reference_id: Option<Uuid>,
    ) -> AppResult<Decimal> {
        require_positive(amount)?;
        let new_balance = self
            .balance_repo
            .record_external_adjustment(user_id, amount, TransactionType::Deposit, reference_id)
            .await
            .map_err(AppError::from)?;
        info!("Deposit of {} credited to {}", amount, user_id);
        Ok(new_balance)
    }

    /// Debit a completed wallet withdrawal
    pub async fn record_wallet_withdrawal(
        &self,
        user_id: Uuid,
        amount: Decimal,
        reference_id: Option<Uuid>,
    ) -> AppResult<Decimal> {
        require_positive(amount)?;
        let new_balance = self
            .balance_repo
            .record_external_adjustment(
                user_id,
                -amount,
                TransactionType::Withdrawal,
                reference_id,
            )
            .await
            .map_err(AppError::from)?;
        info!("Withdrawal of {} debited from {}", amount, user_id);
        Ok(new_balance)
    }

    /// Credit a referral commission.
    ///
    /// The commission amount is computed by the referral module from the
    /// rate stored on the referral record; the ledger only records it.
    pub async fn record_referral_bonus(
        &self,
        user_id: Uuid,
        amount: Decimal,
        reference_id: Option<Uuid>,
    ) -> AppResult<Decimal> {
        require_positive(amount)?;
        self.balance_repo
            .record_external_adjustment(
                user_id,
                amount,
                TransactionType::ReferralBonus,
                reference_id,
            )
            .await
            .map_err(AppError::from)
    }

    /// Signed manual correction from the back office
    pub async fn record_admin_adjustment(
        &self,
        user_id: Uuid,
        amount: Decimal,
        reference_id: Option<Uuid>,
    ) -> AppResult<Decimal> {
        if amount == Decimal::ZERO {
            return Err(AppError::Validation("Adjustment must be non-zero".into()));
        }
        let new_balance = self
            .balance_repo
            .record_external_adjustment(
                user_id,
                amount,
                TransactionType::AdminAdjustment,
                reference_id,
            )
            .await
            .map_err(AppError::from)?;
        info!("Admin adjustment of {} applied to {}", amount, user_id);
        Ok(new_balance)
    }
}

fn require_positive(amount: Decimal) -> AppResult<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation("Amount must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive(Decimal::new(1, 2)).is_ok());
        assert!(require_positive(Decimal::ZERO).is_err());
        assert!(require_positive(Decimal::new(-100, 2)).is_err());
    }
}

//! Investment lifecycle engine: creation, compounding, early withdrawal,
//! maturity, and reinvestment.
//!
//! Every lifecycle transition pairs its status update with the matching
//! ledger movement inside a single database transaction, so a failure at
//! any point rolls the whole operation back.

use crate::error::{AppError, AppResult, InvestmentError};
use crate::finance;
use crate::models::{Investment, InvestmentCompound, InvestmentStatus, InvestmentView, UserBalance};
use crate::repositories::{
    BalanceRepository, EarlyWithdrawalCredit, InvestmentRepository, NewInvestment, PlanRepository,
};
use chrono::{Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Longest term we accept, in weeks (10 years). Also keeps the maturity
/// date arithmetic and the iterative projection loop bounded.
const MAX_DURATION_WEEKS: u32 = 520;

/// Which part of a completed investment's final balance to redeploy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReinvestPortion {
    All,
    PrincipalOnly,
    ProfitOnly,
}

/// Result of processing a matured investment
#[derive(Debug, Clone)]
pub struct MaturityPayout {
    pub maturity_amount: Decimal,
    pub balance: UserBalance,
}

/// Outcome of one compounding batch cycle
#[derive(Debug, Clone, Default)]
pub struct CompoundingReport {
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
}

pub struct InvestmentService {
    pool: PgPool,
    plan_repo: Arc<PlanRepository>,
    investment_repo: Arc<InvestmentRepository>,
    balance_repo: Arc<BalanceRepository>,
}

impl InvestmentService {
    pub fn new(
        pool: PgPool,
        plan_repo: Arc<PlanRepository>,
        investment_repo: Arc<InvestmentRepository>,
        balance_repo: Arc<BalanceRepository>,
    ) -> Self {
        Self {
            pool,
            plan_repo,
            investment_repo,
            balance_repo,
        }
    }

    /// Create a new investment funded from the user's available balance.
    ///
    /// The ledger deduction and the investment insert commit together; if
    /// either fails nothing is applied.
    pub async fn create_investment(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        amount: Decimal,
        duration_weeks: u32,
    ) -> AppResult<Investment> {
        validate_duration(duration_weeks)?;
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("Amount must be positive".into()));
        }

        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(AppError::from)?
            .filter(|p| p.is_active)
            .ok_or(InvestmentError::PlanNotFound)?;

        if !plan.accepts_amount(amount) {
            return Err(InvestmentError::BelowMinimumAmount {
                amount,
                minimum: plan.min_amount,
            }
            .into());
        }

        let amount = finance::round_money(amount);
        let now = Utc::now().naive_utc();
        let new = NewInvestment {
            id: Uuid::new_v4(),
            user_id,
            plan_id,
            invested_amount: amount,
            duration_weeks: duration_weeks as i32,
            start_date: now,
            maturity_date: now + Duration::weeks(duration_weeks as i64),
            next_compound_date: now + Duration::weeks(1),
            early_withdrawal_penalty_percent: plan.early_withdrawal_penalty_percent,
            projected_maturity_value: finance::projected_maturity_value(
                amount,
                plan.weekly_profit_percent,
                duration_weeks,
            ),
        };

        let mut tx = self.pool.begin().await.map_err(AppError::Sqlx)?;

        // Debit first; an insufficient balance aborts before any
        // investment row exists
        self.balance_repo
            .deduct_for_investment(&mut tx, user_id, amount, new.id)
            .await
            .map_err(AppError::from)?;

        let investment = match self.investment_repo.insert(&mut tx, &new).await {
            Ok(investment) => investment,
            Err(e) => {
                // Rollback reverses the deduction as well
                error!("Investment insert failed for user {}: {}", user_id, e);
                return Err(InvestmentError::CreationFailed(e.to_string()).into());
            }
        };

        tx.commit()
            .await
            .map_err(|e| InvestmentError::CreationFailed(e.to_string()))?;

        info!(
            "Created investment {} for user {}: {} over {} weeks, projected {}",
            investment.id, user_id, amount, duration_weeks, investment.projected_maturity_value
        );

        Ok(investment)
    }

    /// Apply one compounding period to every eligible investment.
    ///
    /// Eligibility and the per-investment update are both driven by
    /// `next_compound_date`, never by call frequency: a second run before
    /// the date advances skips every investment it touches.
    pub async fn apply_weekly_compounding(&self) -> AppResult<CompoundingReport> {
        let now = Utc::now().naive_utc();
        let due = self
            .investment_repo
            .find_due_for_compounding(now)
            .await
            .map_err(AppError::from)?;

        let mut report = CompoundingReport::default();

        for investment in due {
            let profit = finance::weekly_profit(
                investment.current_balance,
                investment.weekly_profit_percent,
            );

            match self
                .investment_repo
                .apply_compound(investment.id, profit, now)
                .await
            {
                Ok(Some(updated)) => {
                    info!(
                        "Compounded investment {}: +{} -> {}",
                        updated.id, profit, updated.current_balance
                    );
                    report.processed += 1;
                }
                Ok(None) => {
                    // Another run already took this period
                    report.skipped += 1;
                }
                Err(e) => {
                    // One bad row must not abort the batch
                    error!("Compounding failed for investment {}: {}", investment.id, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Terminate an active, non-matured investment early, crediting the
    /// balance net of the penalty fixed at creation time.
    pub async fn process_early_withdrawal(
        &self,
        investment_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<EarlyWithdrawalCredit> {
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await.map_err(AppError::Sqlx)?;

        let investment = self
            .investment_repo
            .lock_by_id(&mut tx, investment_id)
            .await
            .map_err(AppError::from)?
            .filter(|i| i.user_id == user_id)
            .ok_or(InvestmentError::InvestmentNotFound)?;

        ensure_early_withdrawal_allowed(&investment, now)?;

        let transitioned = self
            .investment_repo
            .update_status_guarded(
                &mut tx,
                investment_id,
                InvestmentStatus::Active,
                InvestmentStatus::Cancelled,
            )
            .await
            .map_err(AppError::from)?;
        if !transitioned {
            return Err(InvestmentError::NotActive.into());
        }

        let credit = self
            .balance_repo
            .credit_early_withdrawal(
                &mut tx,
                user_id,
                investment.current_balance,
                investment.early_withdrawal_penalty_percent,
                investment_id,
            )
            .await
            .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::Sqlx)?;

        info!(
            "Early withdrawal of investment {}: credited {}, penalty {}",
            investment_id, credit.withdrawal_amount, credit.penalty_amount
        );

        Ok(credit)
    }

    /// Pay out a matured investment at its full current balance.
    pub async fn process_maturity(
        &self,
        investment_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<MaturityPayout> {
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await.map_err(AppError::Sqlx)?;

        let investment = self
            .investment_repo
            .lock_by_id(&mut tx, investment_id)
            .await
            .map_err(AppError::from)?
            .filter(|i| i.user_id == user_id)
            .ok_or(InvestmentError::InvestmentNotFound)?;

        ensure_maturity_allowed(&investment, now)?;

        let transitioned = self
            .investment_repo
            .update_status_guarded(
                &mut tx,
                investment_id,
                InvestmentStatus::Active,
                InvestmentStatus::Completed,
            )
            .await
            .map_err(AppError::from)?;
        if !transitioned {
            return Err(InvestmentError::NotActive.into());
        }

        let maturity_amount = investment.current_balance;
        let balance = self
            .balance_repo
            .credit_maturity_payout(
                &mut tx,
                user_id,
                maturity_amount,
                investment.invested_amount,
                investment_id,
            )
            .await
            .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::Sqlx)?;

        info!(
            "Matured investment {}: paid out {} to user {}",
            investment_id, maturity_amount, user_id
        );

        Ok(MaturityPayout {
            maturity_amount,
            balance,
        })
    }

    /// Pause accrual on an active investment
    pub async fn pause_investment(&self, investment_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.transition(
            investment_id,
            user_id,
            InvestmentStatus::Active,
            InvestmentStatus::Paused,
        )
        .await
    }

    /// Resume a paused investment
    pub async fn resume_investment(&self, investment_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.transition(
            investment_id,
            user_id,
            InvestmentStatus::Paused,
            InvestmentStatus::Active,
        )
        .await
    }

    async fn transition(
        &self,
        investment_id: Uuid,
        user_id: Uuid,
        expected: InvestmentStatus,
        next: InvestmentStatus,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::Sqlx)?;

        let investment = self
            .investment_repo
            .lock_by_id(&mut tx, investment_id)
            .await
            .map_err(AppError::from)?
            .filter(|i| i.user_id == user_id)
            .ok_or(InvestmentError::InvestmentNotFound)?;

        let current = investment
            .status_enum()
            .ok_or_else(|| AppError::Message(format!("Unknown status: {}", investment.status)))?;
        if !current.can_transition_to(next) {
            return Err(AppError::BusinessLogic(format!(
                "Cannot move investment from {} to {}",
                current.as_str(),
                next.as_str()
            )));
        }

        let transitioned = self
            .investment_repo
            .update_status_guarded(&mut tx, investment_id, expected, next)
            .await
            .map_err(AppError::from)?;
        if !transitioned {
            return Err(InvestmentError::NotActive.into());
        }

        tx.commit().await.map_err(AppError::Sqlx)?;

        info!(
            "Investment {} moved {} -> {}",
            investment_id,
            expected.as_str(),
            next.as_str()
        );
        Ok(())
    }

    /// Redeploy part of a completed investment's final balance as a fresh
    /// investment.
    ///
    /// Not a transfer: the chosen amount is funded from the available
    /// balance, where the maturity payout must already have landed.
    pub async fn reinvest(
        &self,
        user_id: Uuid,
        source_investment_id: Uuid,
        new_plan_id: Uuid,
        portion: ReinvestPortion,
        duration_weeks: u32,
    ) -> AppResult<Investment> {
        let source = self
            .investment_repo
            .find_by_id(source_investment_id)
            .await
            .map_err(AppError::from)?
            .filter(|i| i.user_id == user_id)
            .ok_or(InvestmentError::InvestmentNotFound)?;

        if source.status_enum() != Some(InvestmentStatus::Completed) {
            return Err(InvestmentError::NotCompleted.into());
        }

        let amount = reinvest_amount(&source, portion);
        if amount <= Decimal::ZERO {
            warn!(
                "Reinvest of {:?} from investment {} selects nothing",
                portion, source_investment_id
            );
            return Err(AppError::Validation(
                "Selected portion of the completed investment is zero".into(),
            ));
        }

        self.create_investment(user_id, new_plan_id, amount, duration_weeks)
            .await
    }

    /// A user's investments enriched with derived maturity/progress fields
    pub async fn get_user_investments(&self, user_id: Uuid) -> AppResult<Vec<InvestmentView>> {
        let now = Utc::now().naive_utc();
        let investments = self
            .investment_repo
            .find_by_user(user_id)
            .await
            .map_err(AppError::from)?;

        Ok(investments
            .into_iter()
            .map(|i| InvestmentView::from_investment(i, now))
            .collect())
    }

    /// Compounding history for one of the user's investments
    pub async fn get_compound_history(
        &self,
        investment_id: Uuid,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<InvestmentCompound>> {
        self.investment_repo
            .find_by_id(investment_id)
            .await
            .map_err(AppError::from)?
            .filter(|i| i.user_id == user_id)
            .ok_or(InvestmentError::InvestmentNotFound)?;

        self.investment_repo
            .list_compounds(investment_id, limit)
            .await
            .map_err(AppError::from)
    }
}

/// Terms run from 1 week to `MAX_DURATION_WEEKS`.
fn validate_duration(duration_weeks: u32) -> Result<(), InvestmentError> {
    if duration_weeks < 1 || duration_weeks > MAX_DURATION_WEEKS {
        return Err(InvestmentError::InvalidDuration);
    }
    Ok(())
}

/// Early withdrawal requires an active, not-yet-matured investment.
fn ensure_early_withdrawal_allowed(
    investment: &Investment,
    now: NaiveDateTime,
) -> Result<(), InvestmentError> {
    if !investment.is_active() {
        return Err(InvestmentError::NotActive);
    }
    if investment.is_matured(now) {
        return Err(InvestmentError::AlreadyMatured);
    }
    Ok(())
}

/// Maturity processing requires an active, matured investment.
fn ensure_maturity_allowed(
    investment: &Investment,
    now: NaiveDateTime,
) -> Result<(), InvestmentError> {
    if !investment.is_active() {
        return Err(InvestmentError::NotActive);
    }
    if !investment.is_matured(now) {
        return Err(InvestmentError::NotYetMatured);
    }
    Ok(())
}

/// The amount a reinvestment portion selects from a completed investment.
fn reinvest_amount(source: &Investment, portion: ReinvestPortion) -> Decimal {
    match portion {
        ReinvestPortion::All => source.current_balance,
        ReinvestPortion::PrincipalOnly => source.invested_amount,
        ReinvestPortion::ProfitOnly => source.total_profit_earned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn investment(status: &str, now: NaiveDateTime, matured: bool) -> Investment {
        let start = now - Duration::weeks(2);
        let maturity = if matured {
            now - Duration::days(1)
        } else {
            now + Duration::weeks(2)
        };
        Investment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            invested_amount: Decimal::new(800_00, 2),
            current_balance: Decimal::new(968_00, 2),
            total_profit_earned: Decimal::new(168_00, 2),
            status: status.to_string(),
            start_date: start,
            maturity_date: maturity,
            duration_weeks: 4,
            next_compound_date: now + Duration::weeks(1),
            last_compound_date: Some(now - Duration::weeks(1)),
            early_withdrawal_penalty_percent: Decimal::new(50, 0),
            projected_maturity_value: Decimal::new(1171_28, 2),
            created_at: start,
            updated_at: now,
        }
    }

    #[test]
    fn test_duration_bounds() {
        assert!(matches!(
            validate_duration(0),
            Err(InvestmentError::InvalidDuration)
        ));
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(MAX_DURATION_WEEKS).is_ok());
        // Oversized terms are rejected before any date arithmetic or
        // projection loop can run on them
        assert!(matches!(
            validate_duration(MAX_DURATION_WEEKS + 1),
            Err(InvestmentError::InvalidDuration)
        ));
        assert!(matches!(
            validate_duration(u32::MAX),
            Err(InvestmentError::InvalidDuration)
        ));
    }

    #[test]
    fn test_early_withdrawal_requires_active() {
        let now = Utc::now().naive_utc();
        for status in ["paused", "completed", "cancelled"] {
            let result = ensure_early_withdrawal_allowed(&investment(status, now, false), now);
            assert!(matches!(result, Err(InvestmentError::NotActive)));
        }
        assert!(ensure_early_withdrawal_allowed(&investment("active", now, false), now).is_ok());
    }

    #[test]
    fn test_terminal_paths_are_mutually_exclusive() {
        let now = Utc::now().naive_utc();

        // Matured: early withdrawal refused, maturity allowed
        let matured = investment("active", now, true);
        assert!(matches!(
            ensure_early_withdrawal_allowed(&matured, now),
            Err(InvestmentError::AlreadyMatured)
        ));
        assert!(ensure_maturity_allowed(&matured, now).is_ok());

        // Not matured: the opposite
        let running = investment("active", now, false);
        assert!(ensure_early_withdrawal_allowed(&running, now).is_ok());
        assert!(matches!(
            ensure_maturity_allowed(&running, now),
            Err(InvestmentError::NotYetMatured)
        ));
    }

    #[test]
    fn test_maturity_requires_active() {
        let now = Utc::now().naive_utc();
        let result = ensure_maturity_allowed(&investment("completed", now, true), now);
        assert!(matches!(result, Err(InvestmentError::NotActive)));
    }

    #[test]
    fn test_reinvest_portion_selection() {
        let now = Utc::now().naive_utc();
        let source = investment("completed", now, true);
        assert_eq!(
            reinvest_amount(&source, ReinvestPortion::All),
            Decimal::new(968_00, 2)
        );
        assert_eq!(
            reinvest_amount(&source, ReinvestPortion::PrincipalOnly),
            Decimal::new(800_00, 2)
        );
        assert_eq!(
            reinvest_amount(&source, ReinvestPortion::ProfitOnly),
            Decimal::new(168_00, 2)
        );
    }
}

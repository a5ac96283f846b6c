//! Repository for investment rows and compounding history

use crate::error::RepositoryError;
use crate::models::{Investment, InvestmentCompound, InvestmentStatus};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

const INVESTMENT_COLUMNS: &str = "id, user_id, plan_id, invested_amount, current_balance, \
     total_profit_earned, status, start_date, maturity_date, duration_weeks, \
     next_compound_date, last_compound_date, early_withdrawal_penalty_percent, \
     projected_maturity_value, created_at, updated_at";

pub struct InvestmentRepository {
    pool: PgPool,
}

/// Fields required to insert a new investment row.
///
/// The id is generated by the caller so the ledger deduction can reference
/// the investment before its row exists.
#[derive(Debug, Clone)]
pub struct NewInvestment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub invested_amount: Decimal,
    pub duration_weeks: i32,
    pub start_date: NaiveDateTime,
    pub maturity_date: NaiveDateTime,
    pub next_compound_date: NaiveDateTime,
    pub early_withdrawal_penalty_percent: Decimal,
    pub projected_maturity_value: Decimal,
}

/// Minimal row the compounding batch needs, with the plan rate joined in
#[derive(Debug, Clone, FromRow)]
pub struct DueInvestment {
    pub id: Uuid,
    pub current_balance: Decimal,
    pub weekly_profit_percent: Decimal,
}

/// Per-user aggregates over active investments
#[derive(Debug, Clone, FromRow)]
pub struct ActiveAggregates {
    pub active_count: i64,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
    pub current_value: Decimal,
}

impl InvestmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new investment inside the caller's transaction.
    ///
    /// Callers pair this with the ledger deduction so both commit or
    /// neither does.
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new: &NewInvestment,
    ) -> Result<Investment, RepositoryError> {
        let investment = sqlx::query_as::<_, Investment>(&format!(
            r#"
            INSERT INTO investments
            (id, user_id, plan_id, invested_amount, current_balance, total_profit_earned,
             status, start_date, maturity_date, duration_weeks, next_compound_date,
             early_withdrawal_penalty_percent, projected_maturity_value)
            VALUES ($1, $2, $3, $4, $4, 0, 'active', $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            INVESTMENT_COLUMNS
        ))
        .bind(new.id)
        .bind(new.user_id)
        .bind(new.plan_id)
        .bind(new.invested_amount)
        .bind(new.start_date)
        .bind(new.maturity_date)
        .bind(new.duration_weeks)
        .bind(new.next_compound_date)
        .bind(new.early_withdrawal_penalty_percent)
        .bind(new.projected_maturity_value)
        .fetch_one(&mut *tx)
        .await?;

        Ok(investment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Investment>, RepositoryError> {
        let investment = sqlx::query_as::<_, Investment>(&format!(
            "SELECT {} FROM investments WHERE id = $1",
            INVESTMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(investment)
    }

    /// Lock an investment row inside the caller's transaction.
    ///
    /// Lifecycle transitions read state under this lock so two concurrent
    /// actors cannot both pass the same precondition.
    pub async fn lock_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Investment>, RepositoryError> {
        let investment = sqlx::query_as::<_, Investment>(&format!(
            "SELECT {} FROM investments WHERE id = $1 FOR UPDATE",
            INVESTMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(investment)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Investment>, RepositoryError> {
        let investments = sqlx::query_as::<_, Investment>(&format!(
            "SELECT {} FROM investments WHERE user_id = $1 ORDER BY created_at DESC",
            INVESTMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(investments)
    }

    /// Active investments whose compound date has arrived.
    ///
    /// The schedule itself bounds how many periods ever fire: the final
    /// period falls exactly on `maturity_date`, and once it is applied
    /// `next_compound_date` moves past maturity and the row drops out.
    /// Paused investments accrue nothing.
    pub async fn find_due_for_compounding(
        &self,
        now: NaiveDateTime,
    ) -> Result<Vec<DueInvestment>, RepositoryError> {
        let due = sqlx::query_as::<_, DueInvestment>(
            r#"
            SELECT i.id, i.current_balance, p.weekly_profit_percent
            FROM investments i
            JOIN investment_plans p ON p.id = i.plan_id
            WHERE i.status = 'active'
              AND i.next_compound_date <= $1
              AND i.next_compound_date <= i.maturity_date
            ORDER BY i.next_compound_date ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(due)
    }

    /// Apply one compounding period to an investment.
    ///
    /// Guarded by `next_compound_date <= $now` and by the period falling
    /// within the term: if another scheduler run already compounded this
    /// period, zero rows match and `None` is returned, making the batch
    /// idempotent per period.
    pub async fn apply_compound(
        &self,
        investment_id: Uuid,
        profit: Decimal,
        now: NaiveDateTime,
    ) -> Result<Option<Investment>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Investment>(&format!(
            r#"
            UPDATE investments
            SET current_balance = current_balance + $2,
                total_profit_earned = total_profit_earned + $2,
                last_compound_date = $3,
                next_compound_date = next_compound_date + INTERVAL '7 days',
                updated_at = NOW()
            WHERE id = $1
              AND status = 'active'
              AND next_compound_date <= $3
              AND next_compound_date <= maturity_date
            RETURNING {}
            "#,
            INVESTMENT_COLUMNS
        ))
        .bind(investment_id)
        .bind(profit)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let investment = match updated {
            Some(investment) => investment,
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        sqlx::query(
            r#"
            INSERT INTO investment_compounds
            (investment_id, balance_before, profit_amount, balance_after, compounded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(investment_id)
        .bind(investment.current_balance - profit)
        .bind(profit)
        .bind(investment.current_balance)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(investment))
    }

    /// Guarded status transition: succeeds only if the row still holds the
    /// expected current status. Returns false when zero rows matched.
    pub async fn update_status_guarded(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        investment_id: Uuid,
        expected: InvestmentStatus,
        next: InvestmentStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE investments
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(investment_id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .execute(&mut *tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Aggregates over a user's active investments for the balance summary
    pub async fn active_aggregates(
        &self,
        user_id: Uuid,
    ) -> Result<ActiveAggregates, RepositoryError> {
        let aggregates = sqlx::query_as::<_, ActiveAggregates>(
            r#"
            SELECT COUNT(*) AS active_count,
                   COALESCE(SUM(invested_amount), 0) AS total_invested,
                   COALESCE(SUM(total_profit_earned), 0) AS total_profit,
                   COALESCE(SUM(current_balance), 0) AS current_value
            FROM investments
            WHERE user_id = $1 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(aggregates)
    }

    /// Compounding history for one investment, newest first
    pub async fn list_compounds(
        &self,
        investment_id: Uuid,
        limit: i64,
    ) -> Result<Vec<InvestmentCompound>, RepositoryError> {
        let compounds = sqlx::query_as::<_, InvestmentCompound>(
            r#"
            SELECT id, investment_id, balance_before, profit_amount, balance_after, compounded_at
            FROM investment_compounds
            WHERE investment_id = $1
            ORDER BY compounded_at DESC
            LIMIT $2
            "#,
        )
        .bind(investment_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(compounds)
    }
}

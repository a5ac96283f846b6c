//! Repository for the investment plan catalog

use crate::error::RepositoryError;
use crate::models::InvestmentPlan;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<InvestmentPlan>, RepositoryError> {
        let plan = sqlx::query_as::<_, InvestmentPlan>(
            r#"
            SELECT id, name, weekly_profit_percent, min_amount,
                   early_withdrawal_penalty_percent, is_active, created_at
            FROM investment_plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    /// Plans currently offered to users, cheapest minimum first
    pub async fn find_active(&self) -> Result<Vec<InvestmentPlan>, RepositoryError> {
        let plans = sqlx::query_as::<_, InvestmentPlan>(
            r#"
            SELECT id, name, weekly_profit_percent, min_amount,
                   early_withdrawal_penalty_percent, is_active, created_at
            FROM investment_plans
            WHERE is_active = TRUE
            ORDER BY min_amount ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    pub async fn create(
        &self,
        name: &str,
        weekly_profit_percent: Decimal,
        min_amount: Decimal,
        early_withdrawal_penalty_percent: Decimal,
    ) -> Result<InvestmentPlan, RepositoryError> {
        let plan = sqlx::query_as::<_, InvestmentPlan>(
            r#"
            INSERT INTO investment_plans
            (name, weekly_profit_percent, min_amount, early_withdrawal_penalty_percent)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, weekly_profit_percent, min_amount,
                      early_withdrawal_penalty_percent, is_active, created_at
            "#,
        )
        .bind(name)
        .bind(weekly_profit_percent)
        .bind(min_amount)
        .bind(early_withdrawal_penalty_percent)
        .fetch_one(&self.pool)
        .await?;

        Ok(plan)
    }

    /// Retire or re-offer a plan; running investments are unaffected
    pub async fn set_active(&self, plan_id: Uuid, is_active: bool) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE investment_plans SET is_active = $2 WHERE id = $1")
            .bind(plan_id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

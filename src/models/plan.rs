//! Investment plan catalog model

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Reference/catalog row describing an offered investment product.
///
/// The early-withdrawal penalty lives here (per plan) rather than as a
/// hard-coded constant; it is copied onto each investment at creation so a
/// later plan change never rewrites the terms of running investments.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InvestmentPlan {
    pub id: Uuid,
    pub name: String,
    pub weekly_profit_percent: Decimal,
    pub min_amount: Decimal,
    pub early_withdrawal_penalty_percent: Decimal,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl InvestmentPlan {
    pub fn accepts_amount(&self, amount: Decimal) -> bool {
        amount >= self.min_amount
    }
}

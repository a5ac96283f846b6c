//! Balance and transaction models for fund tracking

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's two-bucket balance: funds free to invest or withdraw, and funds
/// locked inside active investments.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserBalance {
    pub user_id: Uuid,
    pub available_balance: Decimal,
    pub invested_balance: Decimal,
    pub updated_at: NaiveDateTime,
}

impl UserBalance {
    /// Total funds attributed to the user across both buckets
    pub fn total(&self) -> Decimal {
        self.available_balance + self.invested_balance
    }

    pub fn has_sufficient_available(&self, amount: Decimal) -> bool {
        self.available_balance >= amount
    }
}

/// Transaction types for fund movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    InvestmentDeduction,
    MaturityPayout,
    EarlyWithdrawal,
    ReferralBonus,
    AdminAdjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::InvestmentDeduction => "investment_deduction",
            Self::MaturityPayout => "maturity_payout",
            Self::EarlyWithdrawal => "early_withdrawal",
            Self::ReferralBonus => "referral_bonus",
            Self::AdminAdjustment => "admin_adjustment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            "investment_deduction" => Some(Self::InvestmentDeduction),
            "maturity_payout" => Some(Self::MaturityPayout),
            "early_withdrawal" => Some(Self::EarlyWithdrawal),
            "referral_bonus" => Some(Self::ReferralBonus),
            "admin_adjustment" => Some(Self::AdminAdjustment),
            _ => None,
        }
    }
}

/// Append-only ledger row recording one balance mutation.
///
/// `balance_before`/`balance_after` snapshot `available_balance` at the time
/// of the write; together with the signed `amount` they form the audit
/// trail. Rows are created once and never mutated or deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BalanceTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: String,
    /// Signed; negative means a debit from available_balance
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    /// Correlates to the investment/deposit/withdrawal that caused the entry
    pub reference_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

impl BalanceTransaction {
    pub fn tx_type(&self) -> Option<TransactionType> {
        TransactionType::from_str(&self.transaction_type)
    }

    pub fn is_debit(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

/// Aggregate view of a user's funds returned by the summary read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub available: Decimal,
    pub invested: Decimal,
    pub total: Decimal,
    pub active_count: i64,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
}

impl BalanceSummary {
    /// Conservative fallback when both the primary read and the
    /// recomputation fail; keeps callers non-blocking.
    pub fn zero() -> Self {
        Self {
            available: Decimal::ZERO,
            invested: Decimal::ZERO,
            total: Decimal::ZERO,
            active_count: 0,
            total_invested: Decimal::ZERO,
            total_profit: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_round_trip() {
        let all = [
            TransactionType::Deposit,
            TransactionType::Withdrawal,
            TransactionType::InvestmentDeduction,
            TransactionType::MaturityPayout,
            TransactionType::EarlyWithdrawal,
            TransactionType::ReferralBonus,
            TransactionType::AdminAdjustment,
        ];
        for t in all {
            assert_eq!(TransactionType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(TransactionType::from_str("bogus"), None);
    }

    #[test]
    fn test_balance_totals() {
        let balance = UserBalance {
            user_id: Uuid::new_v4(),
            available_balance: Decimal::new(150_00, 2),
            invested_balance: Decimal::new(850_00, 2),
            updated_at: chrono::Utc::now().naive_utc(),
        };
        assert_eq!(balance.total(), Decimal::new(1000_00, 2));
        assert!(balance.has_sufficient_available(Decimal::new(150_00, 2)));
        assert!(!balance.has_sufficient_available(Decimal::new(150_01, 2)));
    }

    #[test]
    fn test_zero_summary() {
        let summary = BalanceSummary::zero();
        assert_eq!(summary.total, Decimal::ZERO);
        assert_eq!(summary.active_count, 0);
    }
}

//! Investment lifecycle models

use crate::finance;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Investment state machine states.
///
/// `active → {paused, cancelled, completed}`, `paused → active`.
/// `cancelled` (early withdrawal) and `completed` (maturity) are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl InvestmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn can_transition_to(&self, next: InvestmentStatus) -> bool {
        match (self, next) {
            (Self::Active, Self::Paused)
            | (Self::Active, Self::Cancelled)
            | (Self::Active, Self::Completed)
            | (Self::Paused, Self::Active) => true,
            _ => false,
        }
    }
}

/// One user commitment to a plan.
///
/// Maturity is never stored as a flag: it is derived from `maturity_date`
/// on every read so it cannot drift stale.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Investment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    /// Principal at creation; never changes
    pub invested_amount: Decimal,
    /// Principal plus compounded profit to date
    pub current_balance: Decimal,
    pub total_profit_earned: Decimal,
    pub status: String,
    pub start_date: NaiveDateTime,
    pub maturity_date: NaiveDateTime,
    pub duration_weeks: i32,
    pub next_compound_date: NaiveDateTime,
    pub last_compound_date: Option<NaiveDateTime>,
    pub early_withdrawal_penalty_percent: Decimal,
    pub projected_maturity_value: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Investment {
    pub fn status_enum(&self) -> Option<InvestmentStatus> {
        InvestmentStatus::from_str(&self.status)
    }

    pub fn is_active(&self) -> bool {
        self.status == InvestmentStatus::Active.as_str()
    }

    /// Derived, never stored
    pub fn is_matured(&self, now: NaiveDateTime) -> bool {
        finance::is_matured(now, self.maturity_date)
    }

    pub fn progress_percent(&self, now: NaiveDateTime) -> Decimal {
        finance::progress_percent(now, self.start_date, self.maturity_date)
    }

    pub fn days_until_maturity(&self, now: NaiveDateTime) -> i64 {
        finance::days_until_maturity(now, self.maturity_date)
    }

    /// Profit component of the current balance
    pub fn accrued_profit(&self) -> Decimal {
        self.current_balance - self.invested_amount
    }
}

/// Historical record of one compounding event. Append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InvestmentCompound {
    pub id: Uuid,
    pub investment_id: Uuid,
    pub balance_before: Decimal,
    pub profit_amount: Decimal,
    pub balance_after: Decimal,
    pub compounded_at: NaiveDateTime,
}

/// Investment enriched with the derived fields UI callers need
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentView {
    #[serde(flatten)]
    pub investment: Investment,
    pub is_matured: bool,
    pub progress_percent: Decimal,
    pub days_until_maturity: i64,
}

impl InvestmentView {
    pub fn from_investment(investment: Investment, now: NaiveDateTime) -> Self {
        let is_matured = investment.is_matured(now);
        let progress_percent = investment.progress_percent(now);
        let days_until_maturity = investment.days_until_maturity(now);
        Self {
            investment,
            is_matured,
            progress_percent,
            days_until_maturity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(now: NaiveDateTime, weeks: i64) -> Investment {
        Investment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            invested_amount: Decimal::new(800_00, 2),
            current_balance: Decimal::new(968_00, 2),
            total_profit_earned: Decimal::new(168_00, 2),
            status: "active".to_string(),
            start_date: now,
            maturity_date: now + Duration::weeks(weeks),
            duration_weeks: weeks as i32,
            next_compound_date: now + Duration::weeks(1),
            last_compound_date: None,
            early_withdrawal_penalty_percent: Decimal::new(50, 0),
            projected_maturity_value: Decimal::new(1171_28, 2),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            InvestmentStatus::Active,
            InvestmentStatus::Paused,
            InvestmentStatus::Completed,
            InvestmentStatus::Cancelled,
        ] {
            assert_eq!(InvestmentStatus::from_str(s.as_str()), Some(s));
        }
        assert_eq!(InvestmentStatus::from_str("unknown"), None);
    }

    #[test]
    fn test_transitions() {
        use InvestmentStatus::*;
        assert!(Active.can_transition_to(Paused));
        assert!(Active.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Completed));
        assert!(Paused.can_transition_to(Active));

        // Terminal states have no exits
        for terminal in [Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Active, Paused, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        // Paused cannot jump straight to a terminal state
        assert!(!Paused.can_transition_to(Completed));
        assert!(!Paused.can_transition_to(Cancelled));
    }

    #[test]
    fn test_derived_maturity() {
        let now = chrono::Utc::now().naive_utc();
        let investment = sample(now, 4);
        assert!(!investment.is_matured(now));
        assert!(investment.is_matured(now + Duration::weeks(4)));
        assert_eq!(investment.days_until_maturity(now), 28);
        assert_eq!(investment.accrued_profit(), Decimal::new(168_00, 2));
    }

    #[test]
    fn test_view_enrichment() {
        let now = chrono::Utc::now().naive_utc();
        let view = InvestmentView::from_investment(sample(now, 2), now + Duration::weeks(1));
        assert!(!view.is_matured);
        assert_eq!(view.progress_percent, Decimal::new(50_00, 2));
        assert_eq!(view.days_until_maturity, 7);
    }
}

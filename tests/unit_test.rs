use rust_decimal::Decimal;
use vestra_backend::error::{AppError, InvestmentError};
use vestra_backend::finance;
use vestra_backend::format::{format_percent, format_usd};
use vestra_backend::models::*;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Unit tests for compound projections
#[test]
fn test_projection_examples() {
    assert_eq!(
        finance::projected_maturity_value(dec("1000"), dec("10"), 1),
        dec("1100.00")
    );
    assert_eq!(
        finance::projected_maturity_value(dec("1000"), dec("10"), 2),
        dec("1210.00")
    );
    assert_eq!(
        finance::projected_maturity_value(dec("800"), dec("10"), 4),
        dec("1171.28")
    );
}

#[test]
fn test_projection_grows_with_weeks() {
    let mut previous = dec("500");
    for weeks in 1..=20 {
        let value = finance::projected_maturity_value(dec("500"), dec("5"), weeks);
        assert!(value > previous, "projection shrank at week {}", weeks);
        previous = value;
    }
}

/// Unit tests for the early-withdrawal split
#[test]
fn test_early_withdrawal_example() {
    let (withdrawal, penalty) = finance::early_withdrawal_split(dec("1000"), dec("50"));
    assert_eq!(withdrawal, dec("500.00"));
    assert_eq!(penalty, dec("500.00"));
    assert_eq!(withdrawal + penalty, dec("1000"));
}

/// Unit tests for Models
#[test]
fn test_investment_status_conversion() {
    assert_eq!(InvestmentStatus::Active.as_str(), "active");
    assert_eq!(InvestmentStatus::Paused.as_str(), "paused");
    assert_eq!(InvestmentStatus::Completed.as_str(), "completed");
    assert_eq!(InvestmentStatus::Cancelled.as_str(), "cancelled");
    assert_eq!(
        InvestmentStatus::from_str("completed"),
        Some(InvestmentStatus::Completed)
    );
}

#[test]
fn test_transaction_type_conversion() {
    assert_eq!(
        TransactionType::InvestmentDeduction.as_str(),
        "investment_deduction"
    );
    assert_eq!(
        TransactionType::from_str("maturity_payout"),
        Some(TransactionType::MaturityPayout)
    );
    assert_eq!(TransactionType::from_str(""), None);
}

#[test]
fn test_terminal_states_have_no_exits() {
    for terminal in [InvestmentStatus::Completed, InvestmentStatus::Cancelled] {
        for next in [
            InvestmentStatus::Active,
            InvestmentStatus::Paused,
            InvestmentStatus::Completed,
            InvestmentStatus::Cancelled,
        ] {
            assert!(!terminal.can_transition_to(next));
        }
    }
}

/// Unit tests for formatting helpers
#[test]
fn test_currency_formatting() {
    assert_eq!(format_usd(dec("1171.28")), "$1,171.28");
    assert_eq!(format_usd(dec("0")), "$0.00");
    assert_eq!(format_percent(dec("10.00")), "10%");
}

/// Unit tests for Error Handling
#[test]
fn test_error_status_codes() {
    assert_eq!(
        AppError::from(InvestmentError::PlanNotFound).status_code(),
        404
    );
    assert_eq!(
        AppError::from(InvestmentError::BalanceConflict).status_code(),
        409
    );
    assert_eq!(
        AppError::from(InvestmentError::NotYetMatured).status_code(),
        422
    );
    assert_eq!(AppError::Validation("bad".into()).status_code(), 400);
}

#[test]
fn test_conflict_is_retryable() {
    assert!(AppError::from(InvestmentError::BalanceConflict).is_retryable());
    assert!(!AppError::from(InvestmentError::NotActive).is_retryable());
    assert!(!AppError::from(InvestmentError::AlreadyMatured).is_retryable());
}

#[test]
fn test_insufficient_funds_error_carries_amounts() {
    let err = AppError::from(InvestmentError::InsufficientBalance {
        available: dec("25"),
        required: dec("100"),
    });
    let message = format!("{}", err);
    assert!(message.contains("25"));
    assert!(message.contains("100"));
}

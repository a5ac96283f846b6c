//! Pure financial formulas for the investment lifecycle.
//!
//! Everything here is deterministic and side-effect free: compound
//! projections, per-period profit, early-withdrawal splits, and the
//! maturity/progress helpers derived from dates. All monetary results are
//! rounded to 2 decimal places per period, matching the ledger's precision.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

const SECONDS_PER_DAY: i64 = 86_400;

/// Round a monetary amount to cents.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Projected value of `amount` after `weeks` weekly compounding periods at
/// `weekly_rate_percent`.
///
/// Iterative rather than closed-form on purpose: each intermediate balance
/// is rounded to cents, exactly as the compounding batch will round when it
/// runs for real, so the projection and the realized balance agree.
pub fn projected_maturity_value(
    amount: Decimal,
    weekly_rate_percent: Decimal,
    weeks: u32,
) -> Decimal {
    let multiplier = Decimal::ONE + weekly_rate_percent / Decimal::ONE_HUNDRED;
    let mut balance = round_money(amount);
    for _ in 0..weeks {
        balance = round_money(balance * multiplier);
    }
    balance
}

/// Profit earned by one compounding period.
pub fn weekly_profit(current_balance: Decimal, weekly_rate_percent: Decimal) -> Decimal {
    round_money(current_balance * weekly_rate_percent / Decimal::ONE_HUNDRED)
}

/// Split an investment balance into (withdrawal, penalty) for an early exit.
///
/// Conservation holds exactly: `withdrawal + penalty == current_balance`
/// because only the penalty is rounded and the withdrawal is the remainder.
pub fn early_withdrawal_split(
    current_balance: Decimal,
    penalty_percent: Decimal,
) -> (Decimal, Decimal) {
    let penalty = round_money(current_balance * penalty_percent / Decimal::ONE_HUNDRED);
    let withdrawal = (current_balance - penalty).max(Decimal::ZERO);
    (withdrawal, penalty)
}

/// Whether an investment has reached its maturity date.
pub fn is_matured(now: NaiveDateTime, maturity_date: NaiveDateTime) -> bool {
    now >= maturity_date
}

/// Whole days remaining until maturity, rounded up, floored at zero.
pub fn days_until_maturity(now: NaiveDateTime, maturity_date: NaiveDateTime) -> i64 {
    let seconds = (maturity_date - now).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

/// Percentage of the investment term elapsed, clamped to [0, 100].
///
/// Exactly 0 at `now == start_date` and exactly 100 once `now` reaches
/// `maturity_date`; non-decreasing as `now` advances.
pub fn progress_percent(
    now: NaiveDateTime,
    start_date: NaiveDateTime,
    maturity_date: NaiveDateTime,
) -> Decimal {
    let total = (maturity_date - start_date).num_seconds();
    if total <= 0 {
        return Decimal::ONE_HUNDRED;
    }
    let elapsed = (now - start_date).num_seconds();
    if elapsed <= 0 {
        return Decimal::ZERO;
    }
    if elapsed >= total {
        return Decimal::ONE_HUNDRED;
    }
    let pct = Decimal::from(elapsed) * Decimal::ONE_HUNDRED / Decimal::from(total);
    pct.round_dp_with_strategy(2, RoundingStrategy::ToZero)
        .min(Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn ts(s: &str) -> NaiveDateTime {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_projected_value_single_week() {
        let v = projected_maturity_value(dec("1000"), dec("10"), 1);
        assert_eq!(v, dec("1100.00"));
    }

    #[test]
    fn test_projected_value_two_weeks() {
        let v = projected_maturity_value(dec("1000"), dec("10"), 2);
        assert_eq!(v, dec("1210.00"));
    }

    #[test]
    fn test_projected_value_four_weeks_with_per_step_rounding() {
        // 800 -> 880 -> 968 -> 1064.80 -> 1171.28
        let v = projected_maturity_value(dec("800"), dec("10"), 4);
        assert_eq!(v, dec("1171.28"));
    }

    #[test]
    fn test_projected_value_zero_weeks_is_principal() {
        let v = projected_maturity_value(dec("123.45"), dec("10"), 0);
        assert_eq!(v, dec("123.45"));
    }

    #[test]
    fn test_projection_matches_repeated_weekly_profit() {
        // The batch applies weekly_profit step by step; the projection must
        // land on the same value.
        let rate = dec("7.5");
        let mut balance = dec("2500");
        for _ in 0..6 {
            balance += weekly_profit(balance, rate);
        }
        assert_eq!(balance, projected_maturity_value(dec("2500"), rate, 6));
    }

    #[test]
    fn test_weekly_profit_rounds_to_cents() {
        assert_eq!(weekly_profit(dec("1000"), dec("10")), dec("100.00"));
        // 333.33 * 0.1 = 33.333 -> 33.33
        assert_eq!(weekly_profit(dec("333.33"), dec("10")), dec("33.33"));
        // 33.335 rounds away from zero
        assert_eq!(weekly_profit(dec("333.35"), dec("10")), dec("33.34"));
    }

    #[test]
    fn test_early_withdrawal_split_half() {
        let (withdrawal, penalty) = early_withdrawal_split(dec("1000"), dec("50"));
        assert_eq!(withdrawal, dec("500.00"));
        assert_eq!(penalty, dec("500.00"));
    }

    #[test]
    fn test_early_withdrawal_conservation() {
        let cases = [
            (dec("1000"), dec("50")),
            (dec("123.45"), dec("37.5")),
            (dec("0.01"), dec("99")),
            (dec("999999.99"), dec("0")),
            (dec("500"), dec("100")),
        ];
        for (balance, pct) in cases {
            let (withdrawal, penalty) = early_withdrawal_split(balance, pct);
            assert_eq!(withdrawal + penalty, balance, "balance={} pct={}", balance, pct);
            assert!(withdrawal >= Decimal::ZERO);
            assert!(penalty >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_early_withdrawal_full_penalty_yields_zero() {
        let (withdrawal, penalty) = early_withdrawal_split(dec("250"), dec("100"));
        assert_eq!(withdrawal, Decimal::ZERO);
        assert_eq!(penalty, dec("250"));
    }

    #[test]
    fn test_is_matured_boundary() {
        let maturity = ts("2025-06-01 00:00:00");
        assert!(!is_matured(ts("2025-05-31 23:59:59"), maturity));
        assert!(is_matured(maturity, maturity));
        assert!(is_matured(ts("2025-06-02 00:00:00"), maturity));
    }

    #[test]
    fn test_days_until_maturity_rounds_up() {
        let maturity = ts("2025-06-08 00:00:00");
        assert_eq!(days_until_maturity(ts("2025-06-01 00:00:00"), maturity), 7);
        // A partial day still counts as a full remaining day
        assert_eq!(days_until_maturity(ts("2025-06-07 12:00:00"), maturity), 1);
        assert_eq!(days_until_maturity(ts("2025-06-08 00:00:00"), maturity), 0);
        // Past maturity is floored at zero
        assert_eq!(days_until_maturity(ts("2025-06-09 00:00:00"), maturity), 0);
    }

    #[test]
    fn test_progress_percent_endpoints() {
        let start = ts("2025-01-01 00:00:00");
        let maturity = ts("2025-01-29 00:00:00");
        assert_eq!(progress_percent(start, start, maturity), Decimal::ZERO);
        assert_eq!(
            progress_percent(maturity, start, maturity),
            Decimal::ONE_HUNDRED
        );
        assert_eq!(
            progress_percent(ts("2025-02-15 00:00:00"), start, maturity),
            Decimal::ONE_HUNDRED
        );
        // Before the start date clamps to zero
        assert_eq!(
            progress_percent(ts("2024-12-25 00:00:00"), start, maturity),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_progress_percent_midpoint() {
        let start = ts("2025-01-01 00:00:00");
        let maturity = ts("2025-01-29 00:00:00");
        let midpoint = start + Duration::days(14);
        assert_eq!(progress_percent(midpoint, start, maturity), dec("50.00"));
    }

    #[test]
    fn test_progress_percent_monotonic() {
        let start = ts("2025-01-01 00:00:00");
        let maturity = ts("2025-01-29 00:00:00");
        let mut previous = Decimal::ZERO;
        for hour in 0..(28 * 24) {
            let now = start + Duration::hours(hour);
            let p = progress_percent(now, start, maturity);
            assert!(p >= previous, "progress regressed at hour {}", hour);
            previous = p;
        }
    }

    #[test]
    fn test_progress_percent_degenerate_term() {
        let start = ts("2025-01-01 00:00:00");
        assert_eq!(
            progress_percent(start, start, start),
            Decimal::ONE_HUNDRED
        );
    }
}

//! Currency and percentage formatting helpers, locale-fixed to en-US/USD.

use crate::finance::round_money;
use rust_decimal::Decimal;

/// Format an amount as US dollars: `$1,234.56`, `-$0.50`.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-${}.{}", int_grouped, frac_part)
    } else {
        format!("${}.{}", int_grouped, frac_part)
    }
}

/// Format a percentage with trailing zeros stripped: `12.5%`, `50%`.
pub fn format_percent(percent: Decimal) -> String {
    format!("{}%", percent.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_usd_grouping() {
        assert_eq!(format_usd(dec("0")), "$0.00");
        assert_eq!(format_usd(dec("5")), "$5.00");
        assert_eq!(format_usd(dec("999.9")), "$999.90");
        assert_eq!(format_usd(dec("1234.56")), "$1,234.56");
        assert_eq!(format_usd(dec("1000000")), "$1,000,000.00");
        assert_eq!(format_usd(dec("1171.28")), "$1,171.28");
    }

    #[test]
    fn test_format_usd_negative() {
        assert_eq!(format_usd(dec("-0.5")), "-$0.50");
        assert_eq!(format_usd(dec("-1234.5")), "-$1,234.50");
    }

    #[test]
    fn test_format_usd_rounds_to_cents() {
        assert_eq!(format_usd(dec("10.005")), "$10.01");
        assert_eq!(format_usd(dec("10.004")), "$10.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec("12.50")), "12.5%");
        assert_eq!(format_percent(dec("50")), "50%");
        assert_eq!(format_percent(dec("0.25")), "0.25%");
    }
}

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::types::Money;

/// Parse a user-entered amount, tolerating thousands separators
/// (`1'250'000`), grouping commas and currency symbols (`CHF 850 000.50`).
///
/// Anything that does not survive as a plain decimal number parses to zero;
/// malformed input is never an error at this boundary.
pub fn parse_amount(raw: &str) -> Money {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Parse an ISO date (`2001-07-24`). Returns None on anything else.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Read access to named form fields. Absent fields read as zero/empty so a
/// partially filled form still produces a usable snapshot.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<String>;

    fn amount(&self, name: &str) -> Money {
        self.field(name)
            .map(|s| parse_amount(&s))
            .unwrap_or(Decimal::ZERO)
    }

    fn count(&self, name: &str) -> u32 {
        self.amount(name).trunc().to_u32().unwrap_or(0)
    }

    fn date(&self, name: &str) -> Option<NaiveDate> {
        self.field(name).and_then(|s| parse_date(&s))
    }

    fn text(&self, name: &str) -> String {
        self.field(name).map(|s| s.trim().to_string()).unwrap_or_default()
    }
}

impl FieldSource for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount_apostrophe_separators() {
        assert_eq!(parse_amount("1'250'000"), dec!(1_250_000));
        assert_eq!(parse_amount("1’250’000"), dec!(1_250_000));
    }

    #[test]
    fn test_parse_amount_currency_symbol_and_spaces() {
        assert_eq!(parse_amount("CHF 850 000.50"), dec!(850_000.50));
    }

    #[test]
    fn test_parse_amount_grouping_commas() {
        assert_eq!(parse_amount("1,000"), dec!(1000));
    }

    #[test]
    fn test_parse_amount_negative() {
        assert_eq!(parse_amount("-2'500"), dec!(-2500));
    }

    #[test]
    fn test_parse_amount_garbage_defaults_to_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("n/a"), Decimal::ZERO);
        assert_eq!(parse_amount("12-34"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(" 1989-03-15 "),
            NaiveDate::from_ymd_opt(1989, 3, 15)
        );
        assert_eq!(parse_date("15.03.1989"), None);
    }

    #[test]
    fn test_field_source_defaults() {
        let mut form = HashMap::new();
        form.insert("property.price".to_string(), "1'000'000".to_string());
        assert_eq!(form.amount("property.price"), dec!(1_000_000));
        assert_eq!(form.amount("property.renovation_cost"), Decimal::ZERO);
        assert_eq!(form.count("borrower1.dependents"), 0);
        assert_eq!(form.text("borrower1.name"), "");
    }
}

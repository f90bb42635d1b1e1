use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::types::Money;

/// How urgently a gap needs covering. Consumed by presentation to pick
/// card styling and to pre-select proposal items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Ok,
    Moderate,
    Critical,
}

impl Severity {
    /// Yearly income gaps: moderate below a share of effective income.
    pub fn of_income_gap(gap: Money, effective_income: Money, config: &LendingConfig) -> Self {
        if gap <= Decimal::ZERO {
            return Severity::Ok;
        }
        if gap < effective_income * config.income_gap_warn_threshold {
            Severity::Moderate
        } else {
            Severity::Critical
        }
    }

    /// Death-capital gaps: moderate below a share of the total investment.
    pub fn of_death_capital(
        capital_needed: Money,
        total_investment: Money,
        config: &LendingConfig,
    ) -> Self {
        if capital_needed <= Decimal::ZERO {
            return Severity::Ok;
        }
        if capital_needed < total_investment * config.death_capital_warn_threshold {
            Severity::Moderate
        } else {
            Severity::Critical
        }
    }

    /// Margin-call exposure graded by how well remaining liquidity covers
    /// it: a 10% buffer clears it, bare coverage is tight, less is not
    /// covered at all.
    pub fn of_margin_call(margin_call: Money, liquidity: Money) -> Self {
        if margin_call <= Decimal::ZERO {
            return Severity::Ok;
        }
        let buffered = margin_call * dec!(1.1);
        if liquidity >= buffered {
            Severity::Ok
        } else if liquidity >= margin_call {
            Severity::Moderate
        } else {
            Severity::Critical
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical)
    }
}

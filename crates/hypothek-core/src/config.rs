use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Regulatory and bank-policy parameters for Swiss residential financing.
///
/// Loaded once and treated as immutable for the lifetime of an analysis.
/// `Default` carries the 2024 values; every rate is a decimal fraction
/// (0.05 = 5%), never a percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingConfig {
    /// Maximum loan-to-value ratio a bank will finance.
    pub max_loan_to_value: Rate,
    /// Maximum sustainable burden: yearly housing cost over effective income.
    pub max_burden_ratio: Rate,
    /// Imputed interest rate for the affordability stress test.
    pub stress_interest_rate: Rate,
    /// Running costs (operating) as a share of total investment per year.
    pub maintenance_operating_rate: Rate,
    /// Renovation reserve as a share of total investment per year.
    pub maintenance_reserve_rate: Rate,
    /// Maximum insured yearly salary for unemployment benefits.
    pub unemployment_insurance_cap: Money,
    /// Statutory retirement age.
    pub pension_age: u32,
    pub min_amortization_years: u32,
    pub default_amortization_years: u32,
    /// Gross-up applied to death-capital needs for estate/payout taxes.
    pub death_capital_tax_markup: Rate,
    /// Minimum share of the investment funded by hard (non-pension) equity.
    pub min_hard_equity_rate: Rate,
    /// Recommended liquidity reserve as a share of total investment.
    pub liquidity_reserve_rate: Rate,
    /// Income gaps below this share of effective income are moderate.
    pub income_gap_warn_threshold: Rate,
    /// Death-capital gaps below this share of total investment are moderate.
    pub death_capital_warn_threshold: Rate,
    /// First mortgage tranche covers up to this share of total investment.
    pub first_mortgage_limit: Rate,
    /// Assumed property value decline in the market-crash scenario.
    pub crash_value_decline: Rate,
    /// Interest level tested in the rate-shock scenario.
    pub rate_shock: Rate,
    /// Spread charged on the unallocated portion of the mortgage.
    pub unallocated_penalty_rate: Rate,
    /// Minimum principal per tranche; smaller non-zero tranches are invalid.
    pub min_tranche_amount: Money,
    /// Rate assumed for a freshly created tranche before the user edits it.
    pub default_tranche_rate: Rate,
    /// Borrower age assumed when no birth date is supplied.
    pub default_age: u32,
    /// Residuals within this many currency units count as fully allocated.
    pub full_allocation_tolerance: Money,
}

impl LendingConfig {
    /// Combined yearly maintenance rate (operating + reserve).
    pub fn maintenance_total_rate(&self) -> Rate {
        self.maintenance_operating_rate + self.maintenance_reserve_rate
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            max_loan_to_value: dec!(0.80),
            max_burden_ratio: dec!(0.3334),
            stress_interest_rate: dec!(0.05),
            maintenance_operating_rate: dec!(0.004),
            maintenance_reserve_rate: dec!(0.006),
            unemployment_insurance_cap: dec!(148_200),
            pension_age: 65,
            min_amortization_years: 1,
            default_amortization_years: 15,
            death_capital_tax_markup: dec!(0.25),
            min_hard_equity_rate: dec!(0.10),
            liquidity_reserve_rate: dec!(0.10),
            income_gap_warn_threshold: dec!(0.10),
            death_capital_warn_threshold: dec!(0.20),
            first_mortgage_limit: dec!(0.65),
            crash_value_decline: dec!(0.20),
            rate_shock: dec!(0.03),
            unallocated_penalty_rate: dec!(0.025),
            min_tranche_amount: dec!(100_000),
            default_tranche_rate: dec!(0.018),
            default_age: 40,
            full_allocation_tolerance: dec!(10),
        }
    }
}

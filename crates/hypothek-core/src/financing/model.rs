use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::snapshot::InputSnapshot;
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Output type
// ---------------------------------------------------------------------------

/// The fully derived financing picture for one snapshot. Immutable once
/// computed; downstream components (validator, risk engine, tranche
/// structuring) only read from it. All values carried unrounded;
/// rounding is a presentation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingModel {
    /// Joint income after debt service and alimony, floored at zero.
    pub effective_income: Money,
    /// Purchase price plus renovation cost.
    pub total_investment: Money,
    /// Capital committed across accounts, pillar 3a and pension fund.
    pub invested_capital: Money,
    /// Effective one-time purchase fees.
    pub purchase_fees: Money,
    /// Cash due at closing: account commitment plus fees.
    pub cash_needed: Money,
    pub mortgage_amount: Money,
    /// Mortgage over total investment; zero for a zero investment.
    pub loan_to_value: Rate,
    /// Portion of the mortgage the 80% ceiling does not cover.
    pub ltv_excess: Money,
    pub first_mortgage: Money,
    pub second_mortgage: Money,
    /// Borrower 1's age at the valuation date.
    pub age: u32,
    /// Years to pay down the second mortgage, bounded by retirement.
    pub amortization_years: u32,
    pub yearly_interest: Money,
    pub yearly_amortization: Money,
    pub yearly_maintenance: Money,
    pub yearly_total_cost: Money,
    pub monthly_interest: Money,
    pub monthly_amortization: Money,
    pub monthly_maintenance: Money,
    pub monthly_total_cost: Money,
    /// Yearly total cost over effective income; zero when income is zero.
    pub burden_ratio: Rate,
    /// Income at which the burden would sit exactly on the ceiling.
    pub minimum_required_income: Money,
    /// Liquid assets left after the account commitment and fees.
    pub liquidity_remaining: Money,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Derive the complete financing model from a snapshot.
///
/// Pure and total: degenerate inputs (zero price, over-committed capital,
/// negative income after deductions) clamp instead of erroring, so the
/// validator can still report shortfall amounts off a finished model.
/// Interest is charged at the flat stress rate on the full mortgage: the
/// conservative affordability test, distinct from the real blended rate the
/// tranche mix produces later.
pub fn compute_financing_model(
    snapshot: &InputSnapshot,
    config: &LendingConfig,
) -> FinancingModel {
    let twelve = Decimal::from(12);

    let effective_income = snapshot.effective_income();

    let total_investment = snapshot.property.total_investment();
    let invested_capital = snapshot.commitment.total();
    let purchase_fees = snapshot.fees.total();
    let cash_needed = snapshot.commitment.from_accounts + purchase_fees;

    let mortgage_amount = (total_investment - invested_capital).max(Decimal::ZERO);
    let loan_to_value = if total_investment > Decimal::ZERO {
        mortgage_amount / total_investment
    } else {
        Decimal::ZERO
    };
    let ltv_excess =
        (mortgage_amount - total_investment * config.max_loan_to_value).max(Decimal::ZERO);

    // Split at the first-mortgage limit; the two parts reassemble the
    // mortgage exactly by construction.
    let first_limit = total_investment * config.first_mortgage_limit;
    let first_mortgage = mortgage_amount.min(first_limit);
    let second_mortgage = (mortgage_amount - first_mortgage).max(Decimal::ZERO);

    let age = snapshot.borrower1_age(config);
    let years_to_retirement = (i64::from(config.pension_age) - i64::from(age))
        .max(i64::from(config.min_amortization_years)) as u32;
    let amortization_years = config.default_amortization_years.min(years_to_retirement);

    let yearly_interest = mortgage_amount * config.stress_interest_rate;
    let yearly_amortization = if second_mortgage > Decimal::ZERO {
        second_mortgage / Decimal::from(amortization_years)
    } else {
        Decimal::ZERO
    };
    let yearly_maintenance = total_investment * config.maintenance_total_rate();
    let yearly_total_cost = yearly_interest + yearly_amortization + yearly_maintenance;

    let burden_ratio = if effective_income > Decimal::ZERO {
        yearly_total_cost / effective_income
    } else {
        Decimal::ZERO
    };
    let minimum_required_income = yearly_total_cost / config.max_burden_ratio;

    let liquidity_remaining = snapshot.liquid_assets() - cash_needed;

    FinancingModel {
        effective_income,
        total_investment,
        invested_capital,
        purchase_fees,
        cash_needed,
        mortgage_amount,
        loan_to_value,
        ltv_excess,
        first_mortgage,
        second_mortgage,
        age,
        amortization_years,
        yearly_interest,
        yearly_amortization,
        yearly_maintenance,
        yearly_total_cost,
        monthly_interest: yearly_interest / twelve,
        monthly_amortization: yearly_amortization / twelve,
        monthly_maintenance: yearly_maintenance / twelve,
        monthly_total_cost: yearly_total_cost / twelve,
        burden_ratio,
        minimum_required_income,
        liquidity_remaining,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::financing::FinancingModel;
use crate::snapshot::{BorrowerProfile, InputSnapshot};
use crate::types::{Money, Rate};

use super::severity::Severity;

// ---------------------------------------------------------------------------
// Scenario records
// ---------------------------------------------------------------------------

/// An income-continuation scenario: what replaces the household income and
/// how far that falls short of the minimum the financing requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeScenario {
    /// Income available in the scenario (substitute + partner income).
    pub available_income: Money,
    /// The minimum required income the scenario is tested against.
    pub target_income: Money,
    /// Yearly shortfall; zero means no gap.
    pub gap: Money,
    pub severity: Severity,
}

/// Death of one borrower: the mortgage the survivor can still carry and
/// the capital needed to extinguish the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathScenario {
    /// Survivor pension plus the partner's own income.
    pub survivor_income: Money,
    /// Mortgage the survivor's income still supports.
    pub affordable_mortgage: Money,
    /// Principal that must be extinguished.
    pub mortgage_gap: Money,
    /// Mortgage gap grossed up for estate/payout taxes.
    pub capital_needed: Money,
    pub severity: Severity,
}

/// All per-borrower scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerRiskGaps {
    pub unemployment: IncomeScenario,
    pub disability: IncomeScenario,
    pub death: DeathScenario,
}

/// Retirement affordability for one constellation of pension incomes,
/// measured against the first mortgage (the second is amortized by then).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementScenario {
    pub available_income: Money,
    pub target_income: Money,
    /// First-mortgage principal that must be paid down before retirement.
    pub gap: Money,
}

/// A 20% property value decline with the bank re-testing the LTV ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashScenario {
    /// Maximum mortgage the devalued property still supports.
    pub affordable_mortgage: Money,
    /// Capital the bank would call in.
    pub margin_call: Money,
    pub severity: Severity,
}

/// Monthly interest at the shock rate vs. the current blended mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateShockScenario {
    pub shock_rate: Rate,
    pub blended_rate: Rate,
    pub shock_monthly_interest: Money,
    pub current_monthly_interest: Money,
    pub monthly_increase: Money,
}

/// The complete risk picture, recomputed on entering the risk phase and
/// whenever the tranche mix (hence the blended rate) changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskGapSet {
    pub borrower1: BorrowerRiskGaps,
    /// None when no second borrower takes part.
    pub borrower2: Option<BorrowerRiskGaps>,
    pub retirement_borrower1: RetirementScenario,
    pub retirement_borrower2: RetirementScenario,
    pub retirement_both: RetirementScenario,
    pub market_crash: CrashScenario,
    pub rate_shock: RateShockScenario,
}

impl RiskGapSet {
    /// Largest of the three retirement gaps: the savings target.
    pub fn max_retirement_gap(&self) -> Money {
        self.retirement_borrower1
            .gap
            .max(self.retirement_borrower2.gap)
            .max(self.retirement_both.gap)
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// The affordability inverse: the largest mortgage a given income carries
/// once maintenance is paid and interest is stressed.
///
///   max(0, (income * max_burden - yearly_maintenance) / stress_rate)
pub fn affordable_mortgage(
    income: Money,
    yearly_maintenance: Money,
    config: &LendingConfig,
) -> Money {
    let available_for_interest = income * config.max_burden_ratio - yearly_maintenance;
    (available_for_interest / config.stress_interest_rate).max(Decimal::ZERO)
}

fn unemployment_scenario(
    borrower: &BorrowerProfile,
    partner_income: Money,
    model: &FinancingModel,
    config: &LendingConfig,
) -> IncomeScenario {
    // 80% of the insured salary with dependents or alimony, 70% otherwise.
    let benefit_rate = if borrower.has_dependents_or_alimony() {
        dec!(0.8)
    } else {
        dec!(0.7)
    };
    let insured = borrower.income.min(config.unemployment_insurance_cap);
    income_scenario(insured * benefit_rate + partner_income, model, config)
}

fn disability_scenario(
    borrower: &BorrowerProfile,
    partner_income: Money,
    model: &FinancingModel,
    config: &LendingConfig,
) -> IncomeScenario {
    income_scenario(borrower.disability_pension + partner_income, model, config)
}

fn income_scenario(
    available_income: Money,
    model: &FinancingModel,
    config: &LendingConfig,
) -> IncomeScenario {
    let target_income = model.minimum_required_income;
    let gap = (target_income - available_income).max(Decimal::ZERO);
    IncomeScenario {
        available_income,
        target_income,
        gap,
        severity: Severity::of_income_gap(gap, model.effective_income, config),
    }
}

fn death_scenario(
    borrower: &BorrowerProfile,
    partner_income: Money,
    model: &FinancingModel,
    config: &LendingConfig,
) -> DeathScenario {
    let survivor_income = borrower.survivor_pension + partner_income;
    let affordable = affordable_mortgage(survivor_income, model.yearly_maintenance, config);
    let mortgage_gap = (model.mortgage_amount - affordable).max(Decimal::ZERO);
    let capital_needed = mortgage_gap * (Decimal::ONE + config.death_capital_tax_markup);
    DeathScenario {
        survivor_income,
        affordable_mortgage: affordable,
        mortgage_gap,
        capital_needed,
        severity: Severity::of_death_capital(capital_needed, model.total_investment, config),
    }
}

fn borrower_gaps(
    borrower: &BorrowerProfile,
    partner_income: Money,
    model: &FinancingModel,
    config: &LendingConfig,
) -> BorrowerRiskGaps {
    BorrowerRiskGaps {
        unemployment: unemployment_scenario(borrower, partner_income, model, config),
        disability: disability_scenario(borrower, partner_income, model, config),
        death: death_scenario(borrower, partner_income, model, config),
    }
}

fn retirement_scenario(
    available_income: Money,
    model: &FinancingModel,
    config: &LendingConfig,
) -> RetirementScenario {
    // By retirement only the first mortgage remains; it sets both the cost
    // level and the principal a gap is measured against.
    let yearly_cost =
        model.first_mortgage * config.stress_interest_rate + model.yearly_maintenance;
    let target_income = yearly_cost / config.max_burden_ratio;

    let gap = if available_income < target_income {
        let affordable = affordable_mortgage(available_income, model.yearly_maintenance, config);
        (model.first_mortgage - affordable).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    RetirementScenario {
        available_income,
        target_income,
        gap,
    }
}

/// Compute every risk gap against the current financing model.
///
/// `blended_rate` is the current tranche-mix rate, carried in from the
/// structuring phase (the configured default before that phase has run);
/// only the rate-shock comparison depends on it.
pub fn compute_risk_gaps(
    model: &FinancingModel,
    snapshot: &InputSnapshot,
    config: &LendingConfig,
    blended_rate: Rate,
) -> RiskGapSet {
    let twelve = Decimal::from(12);
    let b1 = &snapshot.borrower1;
    let b2 = &snapshot.borrower2;

    let borrower1 = borrower_gaps(b1, b2.income, model, config);
    let borrower2 = snapshot
        .has_second_borrower()
        .then(|| borrower_gaps(b2, b1.income, model, config));

    // Retirement constellations: one retired with the partner still
    // working (net of the partner's own deductions), and both retired.
    let retirement_borrower1 = retirement_scenario(
        b1.retirement_pension + b2.working_income(),
        model,
        config,
    );
    let retirement_borrower2 = retirement_scenario(
        b2.retirement_pension + b1.working_income(),
        model,
        config,
    );
    let retirement_both = retirement_scenario(
        b1.retirement_pension + b2.retirement_pension,
        model,
        config,
    );

    let crash_value = model.total_investment * (Decimal::ONE - config.crash_value_decline);
    let crash_affordable = crash_value * config.max_loan_to_value;
    let margin_call = (model.mortgage_amount - crash_affordable).max(Decimal::ZERO);
    let market_crash = CrashScenario {
        affordable_mortgage: crash_affordable,
        margin_call,
        severity: Severity::of_margin_call(margin_call, model.liquidity_remaining),
    };

    let shock_monthly_interest = model.mortgage_amount * config.rate_shock / twelve;
    let current_monthly_interest = model.mortgage_amount * blended_rate / twelve;
    let rate_shock = RateShockScenario {
        shock_rate: config.rate_shock,
        blended_rate,
        shock_monthly_interest,
        current_monthly_interest,
        monthly_increase: shock_monthly_interest - current_monthly_interest,
    };

    RiskGapSet {
        borrower1,
        borrower2,
        retirement_borrower1,
        retirement_borrower2,
        retirement_both,
        market_crash,
        rate_shock,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financing::compute_financing_model;
    use crate::snapshot::{BorrowerProfile, CapitalCommitment, PropertyDeal};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    /// Couple buying a 1m property with 250k down: mortgage 750k,
    /// first mortgage 650k, yearly maintenance 10k, min income ~142.4k.
    fn default_snapshot() -> InputSnapshot {
        InputSnapshot {
            borrower1: BorrowerProfile {
                name: "Anna".to_string(),
                income: dec!(140_000),
                disability_pension: dec!(84_000),
                survivor_pension: dec!(42_000),
                retirement_pension: dec!(80_000),
                bank_balance: dec!(320_000),
                ..Default::default()
            },
            borrower2: BorrowerProfile {
                name: "Luca".to_string(),
                income: dec!(80_000),
                disability_pension: dec!(48_000),
                survivor_pension: dec!(24_000),
                retirement_pension: dec!(45_000),
                ..Default::default()
            },
            property: PropertyDeal {
                price: dec!(1_000_000),
                ..Default::default()
            },
            commitment: CapitalCommitment {
                from_accounts: dec!(250_000),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn gaps_for(snapshot: &InputSnapshot) -> (FinancingModel, RiskGapSet) {
        let config = LendingConfig::default();
        let model = compute_financing_model(snapshot, &config);
        let gaps = compute_risk_gaps(&model, snapshot, &config, config.default_tranche_rate);
        (model, gaps)
    }

    // ---------------------------------------------------------------
    // 1. Affordability inverse round-trips the affordability test
    // ---------------------------------------------------------------
    #[test]
    fn test_affordable_mortgage_inverse() {
        let config = LendingConfig::default();
        let maintenance = dec!(10_000);
        let income = dec!(200_000);

        let mortgage = affordable_mortgage(income, maintenance, &config);
        // At that mortgage, cost exactly exhausts the burden ceiling.
        let cost = mortgage * config.stress_interest_rate + maintenance;
        assert_eq!(cost, income * config.max_burden_ratio);
    }

    #[test]
    fn test_affordable_mortgage_floors_at_zero() {
        let config = LendingConfig::default();
        assert_eq!(
            affordable_mortgage(dec!(10_000), dec!(20_000), &config),
            Decimal::ZERO
        );
    }

    // ---------------------------------------------------------------
    // 2. Unemployment: benefit rate depends on dependents/alimony
    // ---------------------------------------------------------------
    #[test]
    fn test_unemployment_rate_without_dependents() {
        let (model, gaps) = gaps_for(&default_snapshot());
        let expected = dec!(140_000) * dec!(0.7) + dec!(80_000);
        assert_eq!(gaps.borrower1.unemployment.available_income, expected);
        assert_eq!(
            gaps.borrower1.unemployment.gap,
            (model.minimum_required_income - expected).max(Decimal::ZERO)
        );
    }

    #[test]
    fn test_unemployment_rate_with_dependents() {
        let mut snapshot = default_snapshot();
        snapshot.borrower1.dependents = 2;
        let (_, gaps) = gaps_for(&snapshot);
        assert_eq!(
            gaps.borrower1.unemployment.available_income,
            dec!(140_000) * dec!(0.8) + dec!(80_000)
        );
    }

    #[test]
    fn test_unemployment_income_capped() {
        let mut snapshot = default_snapshot();
        snapshot.borrower1.income = dec!(300_000);
        let (_, gaps) = gaps_for(&snapshot);
        assert_eq!(
            gaps.borrower1.unemployment.available_income,
            dec!(148_200) * dec!(0.7) + dec!(80_000)
        );
    }

    // ---------------------------------------------------------------
    // 3. Disability substitutes the pension for the salary
    // ---------------------------------------------------------------
    #[test]
    fn test_disability_scenario() {
        let (model, gaps) = gaps_for(&default_snapshot());
        assert_eq!(
            gaps.borrower1.disability.available_income,
            dec!(84_000) + dec!(80_000)
        );
        assert!(gaps.borrower1.disability.available_income > model.minimum_required_income);
        assert_eq!(gaps.borrower1.disability.gap, Decimal::ZERO);
        assert_eq!(gaps.borrower1.disability.severity, Severity::Ok);
    }

    // ---------------------------------------------------------------
    // 4. Death capital ties to mortgage extinguishment, tax-grossed
    // ---------------------------------------------------------------
    #[test]
    fn test_death_capital_from_affordability_inverse() {
        let config = LendingConfig::default();
        let (model, gaps) = gaps_for(&default_snapshot());

        let survivor_income = dec!(42_000) + dec!(80_000);
        let affordable = affordable_mortgage(survivor_income, model.yearly_maintenance, &config);
        let expected_gap = (model.mortgage_amount - affordable).max(Decimal::ZERO);

        assert_eq!(gaps.borrower1.death.mortgage_gap, expected_gap);
        assert_eq!(
            gaps.borrower1.death.capital_needed,
            expected_gap * dec!(1.25)
        );
        assert!(gaps.borrower1.death.capital_needed > Decimal::ZERO);
    }

    #[test]
    fn test_death_no_gap_with_rich_survivor() {
        let mut snapshot = default_snapshot();
        snapshot.borrower1.survivor_pension = dec!(120_000);
        snapshot.borrower2.income = dec!(200_000);
        let (_, gaps) = gaps_for(&snapshot);
        assert_eq!(gaps.borrower1.death.capital_needed, Decimal::ZERO);
        assert_eq!(gaps.borrower1.death.severity, Severity::Ok);
    }

    // ---------------------------------------------------------------
    // 5. Second borrower present: symmetric scenarios
    // ---------------------------------------------------------------
    #[test]
    fn test_second_borrower_scenarios_present() {
        let (_, gaps) = gaps_for(&default_snapshot());
        let b2 = gaps.borrower2.expect("second borrower takes part");
        assert_eq!(
            b2.unemployment.available_income,
            dec!(80_000) * dec!(0.7) + dec!(140_000)
        );
    }

    #[test]
    fn test_no_second_borrower_no_scenarios() {
        let mut snapshot = default_snapshot();
        snapshot.borrower2 = BorrowerProfile::default();
        let (_, gaps) = gaps_for(&snapshot);
        assert!(gaps.borrower2.is_none());
    }

    // ---------------------------------------------------------------
    // 6. Market crash: 20% decline against the LTV ceiling
    // ---------------------------------------------------------------
    #[test]
    fn test_market_crash_margin_call() {
        let (_, gaps) = gaps_for(&default_snapshot());
        // 1m * 0.8 * 0.8 = 640k supportable; mortgage 750k -> 110k call
        assert_eq!(gaps.market_crash.affordable_mortgage, dec!(640_000));
        assert_eq!(gaps.market_crash.margin_call, dec!(110_000));
    }

    #[test]
    fn test_market_crash_no_call_with_low_ltv() {
        let mut snapshot = default_snapshot();
        snapshot.commitment.from_accounts = dec!(400_000);
        snapshot.borrower1.bank_balance = dec!(500_000);
        let (_, gaps) = gaps_for(&snapshot);
        // Mortgage 600k < 640k supportable after the crash.
        assert_eq!(gaps.market_crash.margin_call, Decimal::ZERO);
        assert_eq!(gaps.market_crash.severity, Severity::Ok);
    }

    // ---------------------------------------------------------------
    // 7. Retirement: gap measured against the first mortgage
    // ---------------------------------------------------------------
    #[test]
    fn test_retirement_target_and_gap() {
        let config = LendingConfig::default();
        let (model, gaps) = gaps_for(&default_snapshot());

        let expected_target = (model.first_mortgage * config.stress_interest_rate
            + model.yearly_maintenance)
            / config.max_burden_ratio;
        assert_eq!(gaps.retirement_both.target_income, expected_target);

        // Both pensions: 125k < target -> a first-mortgage gap remains.
        let affordable =
            affordable_mortgage(dec!(125_000), model.yearly_maintenance, &config);
        assert_eq!(
            gaps.retirement_both.gap,
            (model.first_mortgage - affordable).max(Decimal::ZERO)
        );
        assert!(gaps.retirement_both.gap > Decimal::ZERO);
    }

    #[test]
    fn test_retirement_no_gap_with_sufficient_income() {
        let mut snapshot = default_snapshot();
        snapshot.borrower1.retirement_pension = dec!(120_000);
        snapshot.borrower2.retirement_pension = dec!(60_000);
        let (_, gaps) = gaps_for(&snapshot);
        assert_eq!(gaps.retirement_both.gap, Decimal::ZERO);
    }

    #[test]
    fn test_max_retirement_gap_picks_worst() {
        let (_, gaps) = gaps_for(&default_snapshot());
        let max = gaps.max_retirement_gap();
        assert!(max >= gaps.retirement_borrower1.gap);
        assert!(max >= gaps.retirement_borrower2.gap);
        assert!(max >= gaps.retirement_both.gap);
    }

    // ---------------------------------------------------------------
    // 8. Rate shock compares against the blended mix
    // ---------------------------------------------------------------
    #[test]
    fn test_rate_shock_delta() {
        let config = LendingConfig::default();
        let snapshot = default_snapshot();
        let model = compute_financing_model(&snapshot, &config);
        let gaps = compute_risk_gaps(&model, &snapshot, &config, dec!(0.012));

        // 750k: 3% shock = 1'875/month, 1.2% mix = 750/month
        assert_eq!(gaps.rate_shock.shock_monthly_interest, dec!(1_875));
        assert_eq!(gaps.rate_shock.current_monthly_interest, dec!(750));
        assert_eq!(gaps.rate_shock.monthly_increase, dec!(1_125));
    }

    // ---------------------------------------------------------------
    // 9. More income never worsens any gap
    // ---------------------------------------------------------------
    #[test]
    fn test_gaps_monotone_in_partner_income() {
        let (_, base) = gaps_for(&default_snapshot());

        let mut richer = default_snapshot();
        richer.borrower2.income = dec!(120_000);
        let (_, improved) = gaps_for(&richer);

        assert!(improved.borrower1.unemployment.gap <= base.borrower1.unemployment.gap);
        assert!(improved.borrower1.disability.gap <= base.borrower1.disability.gap);
        assert!(improved.borrower1.death.capital_needed <= base.borrower1.death.capital_needed);
    }
}

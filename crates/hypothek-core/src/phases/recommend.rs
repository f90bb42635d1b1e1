use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::financing::FinancingModel;
use crate::risk::{BorrowerRiskGaps, RiskGapSet, Severity};
use crate::types::Money;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Insurance product family a recommendation points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageKind {
    /// Private earnings-loss cover for unemployment.
    UnemploymentInsurance,
    /// Long-term disability pension.
    DisabilityPension,
    /// Term life cover sized to extinguish unaffordable principal.
    DeathCapital,
}

/// One insurance card for one borrower. The amount is a yearly pension for
/// income covers and a lump sum for death capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceRecommendation {
    pub coverage: CoverageKind,
    pub amount: Money,
    pub severity: Severity,
}

/// Capital-building cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CapitalRecommendation {
    /// Pay the first mortgage down to an affordable level by retirement.
    RetirementSavings {
        target_capital: Money,
        years_to_pension: u32,
        monthly_savings: Money,
    },
    /// Standing reserve against value and rate risks.
    LiquidityReserve {
        recommended: Money,
        shortfall: Money,
    },
    /// Capital the bank would call in after a market crash.
    MarginCallReserve { amount: Money, severity: Severity },
}

/// Everything the recommendation section shows, fully computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub insurance_borrower1: Vec<InsuranceRecommendation>,
    pub insurance_borrower2: Vec<InsuranceRecommendation>,
    pub capital: Vec<CapitalRecommendation>,
}

impl RecommendationSet {
    /// True when no gap asked for action (the standing liquidity-reserve
    /// card does not count as one).
    pub fn all_clear(&self) -> bool {
        self.insurance_borrower1.is_empty()
            && self.insurance_borrower2.is_empty()
            && self
                .capital
                .iter()
                .all(|c| matches!(c, CapitalRecommendation::LiquidityReserve { .. }))
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

fn whole_units(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn insurance_cards(gaps: &BorrowerRiskGaps) -> Vec<InsuranceRecommendation> {
    let mut cards = Vec::new();
    if gaps.unemployment.gap > Decimal::ZERO {
        cards.push(InsuranceRecommendation {
            coverage: CoverageKind::UnemploymentInsurance,
            amount: gaps.unemployment.gap,
            severity: gaps.unemployment.severity,
        });
    }
    if gaps.disability.gap > Decimal::ZERO {
        cards.push(InsuranceRecommendation {
            coverage: CoverageKind::DisabilityPension,
            amount: gaps.disability.gap,
            severity: gaps.disability.severity,
        });
    }
    if gaps.death.capital_needed > Decimal::ZERO {
        cards.push(InsuranceRecommendation {
            coverage: CoverageKind::DeathCapital,
            amount: gaps.death.capital_needed,
            severity: gaps.death.severity,
        });
    }
    cards
}

/// Turn the risk picture into concrete recommendation cards.
pub fn build_recommendations(
    model: &FinancingModel,
    risk: &RiskGapSet,
    config: &LendingConfig,
) -> RecommendationSet {
    let insurance_borrower1 = insurance_cards(&risk.borrower1);
    let insurance_borrower2 = risk
        .borrower2
        .as_ref()
        .map(insurance_cards)
        .unwrap_or_default();

    let mut capital = Vec::new();

    let retirement_gap = risk.max_retirement_gap();
    if retirement_gap > Decimal::ZERO {
        let years_to_pension = (i64::from(config.pension_age) - i64::from(model.age)).max(1) as u32;
        let monthly_savings = whole_units(
            retirement_gap / Decimal::from(years_to_pension) / Decimal::from(12),
        );
        capital.push(CapitalRecommendation::RetirementSavings {
            target_capital: retirement_gap,
            years_to_pension,
            monthly_savings,
        });
    }

    let recommended = model.total_investment * config.liquidity_reserve_rate;
    let shortfall =
        (recommended - model.liquidity_remaining.max(Decimal::ZERO)).max(Decimal::ZERO);
    capital.push(CapitalRecommendation::LiquidityReserve {
        recommended,
        shortfall,
    });

    if risk.market_crash.margin_call > Decimal::ZERO {
        capital.push(CapitalRecommendation::MarginCallReserve {
            amount: risk.market_crash.margin_call,
            severity: risk.market_crash.severity,
        });
    }

    RecommendationSet {
        insurance_borrower1,
        insurance_borrower2,
        capital,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

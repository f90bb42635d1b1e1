use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::financing::FinancingModel;
use crate::types::{Money, Rate};

use super::mix::TrancheMix;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the mandatory amortization is paid. The choice never changes the
/// required amount, only its decomposition into a liquid-account payment
/// and a pillar-3a contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AmortizationMethod {
    /// Paid down directly from a liquid account.
    Direct,
    /// Saved into pillar 3a, pledged against the second mortgage.
    Indirect3a,
    /// User-chosen split between the two channels.
    Mixed { direct: Money, via_3a: Money },
}

impl Default for AmortizationMethod {
    fn default() -> Self {
        AmortizationMethod::Indirect3a
    }
}

/// Monthly amortization decomposed by payment channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSplit {
    pub direct: Money,
    pub via_3a: Money,
}

impl AmortizationMethod {
    pub fn split(&self, monthly_amortization: Money) -> AmortizationSplit {
        match self {
            AmortizationMethod::Direct => AmortizationSplit {
                direct: monthly_amortization,
                via_3a: Decimal::ZERO,
            },
            AmortizationMethod::Indirect3a => AmortizationSplit {
                direct: Decimal::ZERO,
                via_3a: monthly_amortization,
            },
            AmortizationMethod::Mixed { direct, via_3a } => AmortizationSplit {
                direct: *direct,
                via_3a: *via_3a,
            },
        }
    }
}

/// The real monthly housing bill once the tranche mix replaces the stress
/// rate: actual interest, mandatory amortization, maintenance split into
/// its operating and reserve shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCostSummary {
    pub blended_rate: Rate,
    pub monthly_interest: Money,
    pub monthly_amortization: Money,
    pub monthly_operating: Money,
    pub monthly_reserve: Money,
    pub monthly_total: Money,
    /// Burden at real rates; zero when effective income is zero.
    pub real_burden_ratio: Rate,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Re-derive the monthly totals from the blended mix.
pub fn monthly_cost_summary(
    model: &FinancingModel,
    mix: &TrancheMix,
    config: &LendingConfig,
) -> MonthlyCostSummary {
    let twelve = Decimal::from(12);

    let monthly_interest = mix.effective_yearly_interest / twelve;
    let monthly_operating =
        model.total_investment * config.maintenance_operating_rate / twelve;
    let monthly_reserve = model.total_investment * config.maintenance_reserve_rate / twelve;
    let monthly_total =
        monthly_interest + model.monthly_amortization + monthly_operating + monthly_reserve;

    let real_burden_ratio = if model.effective_income > Decimal::ZERO {
        monthly_total * twelve / model.effective_income
    } else {
        Decimal::ZERO
    };

    MonthlyCostSummary {
        blended_rate: mix.blended_rate,
        monthly_interest,
        monthly_amortization: model.monthly_amortization,
        monthly_operating,
        monthly_reserve,
        monthly_total,
        real_burden_ratio,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LendingConfig;
use crate::snapshot::InputSnapshot;
use crate::types::Money;

use super::model::FinancingModel;

/// A business rule the current inputs break. Not a `HypoError`: violations
/// are ordinary values the presentation shows verbatim, and recomputation
/// always completes so the messages can carry computed amounts.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum Violation {
    #[error("Committed account capital of {committed} exceeds the available account and securities balance of {available}")]
    AccountCapitalExceeded { committed: Money, available: Money },

    #[error("Committed pillar 3a capital of {committed} exceeds the available balance of {available}")]
    Pillar3aCapitalExceeded { committed: Money, available: Money },

    #[error("Committed pension-fund capital of {committed} exceeds the available balance of {available}")]
    PensionFundCapitalExceeded { committed: Money, available: Money },

    #[error("Hard equity of {actual} is below the required minimum of {required}")]
    InsufficientHardEquity { required: Money, actual: Money },

    #[error("Total investment must be greater than zero")]
    NonPositiveInvestment,

    #[error("Effective income must be greater than zero")]
    NonPositiveIncome,
}

/// Rounded to whole currency units, half away from zero. Keeps commitments
/// entered as formatted text from tripping rules on sub-unit noise.
fn whole_units(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Check the snapshot and derived model against every feasibility rule.
/// All rules are evaluated, nothing short-circuits, and an empty list
/// means the financing may proceed to the feasibility phase.
pub fn validate(
    model: &FinancingModel,
    snapshot: &InputSnapshot,
    config: &LendingConfig,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let available_accounts = snapshot.liquid_assets();
    let committed_accounts = snapshot.commitment.from_accounts;
    if whole_units(committed_accounts) > whole_units(available_accounts) {
        violations.push(Violation::AccountCapitalExceeded {
            committed: committed_accounts,
            available: available_accounts,
        });
    }

    let available_3a = snapshot.pillar_3a_total();
    let committed_3a = snapshot.commitment.from_pillar_3a;
    if whole_units(committed_3a) > whole_units(available_3a) {
        violations.push(Violation::Pillar3aCapitalExceeded {
            committed: committed_3a,
            available: available_3a,
        });
    }

    let available_pf = snapshot.pension_fund_total();
    let committed_pf = snapshot.commitment.from_pension_fund;
    if whole_units(committed_pf) > whole_units(available_pf) {
        violations.push(Violation::PensionFundCapitalExceeded {
            committed: committed_pf,
            available: available_pf,
        });
    }

    // Pension-fund money does not count toward the hard-equity floor. One
    // unit of tolerance absorbs rounding in user-entered figures.
    let hard_equity = snapshot.commitment.hard_equity();
    let required = model.total_investment * config.min_hard_equity_rate;
    if hard_equity < required - Decimal::ONE {
        violations.push(Violation::InsufficientHardEquity {
            required,
            actual: hard_equity,
        });
    }

    if model.total_investment <= Decimal::ZERO {
        violations.push(Violation::NonPositiveInvestment);
    }

    if model.effective_income <= Decimal::ZERO {
        violations.push(Violation::NonPositiveIncome);
    }

    violations
}

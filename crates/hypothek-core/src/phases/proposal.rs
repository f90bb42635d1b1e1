use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::financing::FinancingModel;
use crate::risk::{RiskGapSet, Severity};
use crate::snapshot::InputSnapshot;
use crate::tranches::{AmortizationMethod, MonthlyCostSummary, TrancheMix};
use crate::types::{Money, Rate};

use super::recommend::CoverageKind;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One tranche offered for signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageOffer {
    pub label: String,
    pub amount: Money,
    pub rate: Rate,
    pub variable_rate: bool,
}

/// One insurance product offered to close a gap. Critical gaps arrive
/// pre-selected; moderate ones are left to the advisor conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceOffer {
    pub coverage: CoverageKind,
    pub borrower: String,
    /// Sum insured for death capital, yearly pension otherwise.
    pub amount: Money,
    pub severity: Severity,
    pub preselected: bool,
}

/// Standing-order rows of the savings plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SavingsPlanKind {
    /// Interest, operating costs and any direct amortization.
    PropertyAccount,
    /// Renovation reserve savings account.
    RenovationReserve,
    /// Pillar-3a contribution funding the indirect amortization.
    Pillar3aContribution,
    /// Securities plan building the retirement pay-down capital.
    RetirementSecuritiesPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsPlanItem {
    pub kind: SavingsPlanKind,
    pub monthly_amount: Money,
    pub preselected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub borrower1: String,
    /// None when no second borrower takes part.
    pub borrower2: Option<String>,
}

/// The final phase: everything the printable proposal carries, assembled
/// from the earlier phase results. Pure data; rendering is someone
/// else's problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalDocument {
    pub mortgage_offers: Vec<MortgageOffer>,
    pub insurance_offers: Vec<InsuranceOffer>,
    pub savings_plan: Vec<SavingsPlanItem>,
    pub signatures: SignatureBlock,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

fn whole_units(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn display_name(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn insurance_offers_for(
    gaps: &crate::risk::BorrowerRiskGaps,
    borrower: &str,
) -> Vec<InsuranceOffer> {
    let mut offers = Vec::new();
    if gaps.death.capital_needed > Decimal::ZERO {
        offers.push(InsuranceOffer {
            coverage: CoverageKind::DeathCapital,
            borrower: borrower.to_string(),
            amount: gaps.death.capital_needed,
            severity: gaps.death.severity,
            preselected: gaps.death.severity.is_critical(),
        });
    }
    if gaps.disability.gap > Decimal::ZERO {
        offers.push(InsuranceOffer {
            coverage: CoverageKind::DisabilityPension,
            borrower: borrower.to_string(),
            amount: gaps.disability.gap,
            severity: gaps.disability.severity,
            preselected: gaps.disability.severity.is_critical(),
        });
    }
    offers
}

/// Assemble the proposal document from all prior phase outputs.
pub fn assemble_proposal(
    model: &FinancingModel,
    snapshot: &InputSnapshot,
    risk: &RiskGapSet,
    mix: &TrancheMix,
    costs: &MonthlyCostSummary,
    amortization: &AmortizationMethod,
    config: &LendingConfig,
) -> ProposalDocument {
    let name1 = display_name(&snapshot.borrower1.name, "Borrower 1");
    let name2 = display_name(&snapshot.borrower2.name, "Borrower 2");

    let mortgage_offers = mix
        .positions
        .iter()
        .map(|p| MortgageOffer {
            label: p.label.clone(),
            amount: p.amount,
            rate: p.rate,
            variable_rate: p.variable_rate,
        })
        .collect();

    let mut insurance_offers = insurance_offers_for(&risk.borrower1, &name1);
    if let Some(gaps2) = &risk.borrower2 {
        insurance_offers.extend(insurance_offers_for(gaps2, &name2));
    }

    let split = amortization.split(costs.monthly_amortization);

    // The property account pays the real tranche interest (penalty spread
    // excluded: it prices an unstructured residual, not a standing order),
    // the running costs, and any direct amortization share.
    let tranche_interest_monthly: Money = mix
        .positions
        .iter()
        .map(|p| p.monthly_interest)
        .sum();
    let mut savings_plan = vec![
        SavingsPlanItem {
            kind: SavingsPlanKind::PropertyAccount,
            monthly_amount: whole_units(
                tranche_interest_monthly + costs.monthly_operating + split.direct,
            ),
            preselected: true,
        },
        SavingsPlanItem {
            kind: SavingsPlanKind::RenovationReserve,
            monthly_amount: whole_units(costs.monthly_reserve),
            preselected: true,
        },
    ];

    if model.second_mortgage > Decimal::ZERO && split.via_3a > Decimal::ZERO {
        savings_plan.push(SavingsPlanItem {
            kind: SavingsPlanKind::Pillar3aContribution,
            monthly_amount: whole_units(split.via_3a),
            preselected: true,
        });
    }

    let retirement_gap = risk.max_retirement_gap();
    if retirement_gap > Decimal::ZERO {
        let years = (i64::from(config.pension_age) - i64::from(model.age)).max(1) as u32;
        savings_plan.push(SavingsPlanItem {
            kind: SavingsPlanKind::RetirementSecuritiesPlan,
            monthly_amount: whole_units(
                retirement_gap / Decimal::from(years) / Decimal::from(12),
            ),
            preselected: false,
        });
    }

    ProposalDocument {
        mortgage_offers,
        insurance_offers,
        savings_plan,
        signatures: SignatureBlock {
            borrower1: name1,
            borrower2: snapshot.has_second_borrower().then_some(name2),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financing::compute_financing_model;
    use crate::risk::compute_risk_gaps;
    use crate::snapshot::{BorrowerProfile, CapitalCommitment, PropertyDeal};
    use crate::tranches::{monthly_cost_summary, TrancheProduct, TrancheSet};
    use rust_decimal_macros::dec;

    struct Fixture {
        model: FinancingModel,
        snapshot: InputSnapshot,
        risk: RiskGapSet,
        mix: TrancheMix,
        costs: MonthlyCostSummary,
        config: LendingConfig,
    }

    fn fixture() -> Fixture {
        let config = LendingConfig::default();
        let snapshot = InputSnapshot {
            borrower1: BorrowerProfile {
                name: "Anna Keller".to_string(),
                income: dec!(140_000),
                disability_pension: dec!(40_000),
                survivor_pension: dec!(20_000),
                retirement_pension: dec!(50_000),
                bank_balance: dec!(300_000),
                ..Default::default()
            },
            borrower2: BorrowerProfile {
                income: dec!(60_000),
                retirement_pension: dec!(30_000),
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
        };
        let model = compute_financing_model(&snapshot, &config);

        let mut set = TrancheSet::balanced_to(model.mortgage_amount, &config);
        set.add(
            TrancheProduct::Saron,
            dec!(250_000),
            dec!(0.012),
            model.mortgage_amount,
        )
        .unwrap();
        let mix = set.recompute(model.mortgage_amount, &config);

        let risk = compute_risk_gaps(&model, &snapshot, &config, mix.blended_rate);
        let costs = monthly_cost_summary(&model, &mix, &config);

        Fixture {
            model,
            snapshot,
            risk,
            mix,
            costs,
            config,
        }
    }

    fn assemble(f: &Fixture, method: AmortizationMethod) -> ProposalDocument {
        assemble_proposal(
            &f.model, &f.snapshot, &f.risk, &f.mix, &f.costs, &method, &f.config,
        )
    }

    #[test]
    fn test_mortgage_offers_mirror_the_mix() {
        let f = fixture();
        let doc = assemble(&f, AmortizationMethod::Indirect3a);

        assert_eq!(doc.mortgage_offers.len(), 2);
        assert_eq!(doc.mortgage_offers[0].label, "Fixed 10y");
        assert_eq!(doc.mortgage_offers[0].amount, dec!(500_000));
        assert_eq!(doc.mortgage_offers[1].label, "SARON");
        assert!(doc.mortgage_offers[1].variable_rate);
    }

    #[test]
    fn test_insurance_offers_preselect_critical_only() {
        let f = fixture();
        let doc = assemble(&f, AmortizationMethod::Indirect3a);

        for offer in &doc.insurance_offers {
            assert_eq!(offer.preselected, offer.severity.is_critical());
            assert!(offer.amount > Decimal::ZERO);
        }
        // Borrower 1's death gap exists in this fixture.
        assert!(doc
            .insurance_offers
            .iter()
            .any(|o| o.coverage == CoverageKind::DeathCapital && o.borrower == "Anna Keller"));
    }

    #[test]
    fn test_savings_plan_indirect_has_3a_row() {
        let f = fixture();
        let doc = assemble(&f, AmortizationMethod::Indirect3a);

        let has_3a = doc
            .savings_plan
            .iter()
            .any(|i| i.kind == SavingsPlanKind::Pillar3aContribution);
        assert!(has_3a);

        let property = doc
            .savings_plan
            .iter()
            .find(|i| i.kind == SavingsPlanKind::PropertyAccount)
            .unwrap();
        // Indirect amortization: the property account pays interest and
        // operating cost only.
        let expected = whole_units(
            f.mix
                .positions
                .iter()
                .map(|p| p.monthly_interest)
                .sum::<Money>()
                + f.costs.monthly_operating,
        );
        assert_eq!(property.monthly_amount, expected);
    }

    #[test]
    fn test_savings_plan_direct_moves_amortization_to_property_account() {
        let f = fixture();
        let doc = assemble(&f, AmortizationMethod::Direct);

        assert!(!doc
            .savings_plan
            .iter()
            .any(|i| i.kind == SavingsPlanKind::Pillar3aContribution));

        let property = doc
            .savings_plan
            .iter()
            .find(|i| i.kind == SavingsPlanKind::PropertyAccount)
            .unwrap();
        let indirect = assemble(&f, AmortizationMethod::Indirect3a);
        let property_indirect = indirect
            .savings_plan
            .iter()
            .find(|i| i.kind == SavingsPlanKind::PropertyAccount)
            .unwrap();
        assert!(property.monthly_amount > property_indirect.monthly_amount);
    }

    #[test]
    fn test_retirement_plan_row_not_preselected() {
        let f = fixture();
        let doc = assemble(&f, AmortizationMethod::Indirect3a);

        let row = doc
            .savings_plan
            .iter()
            .find(|i| i.kind == SavingsPlanKind::RetirementSecuritiesPlan)
            .expect("fixture has a retirement gap");
        assert!(!row.preselected);
        assert!(row.monthly_amount > Decimal::ZERO);
    }

    #[test]
    fn test_signatures_use_names_and_fallbacks() {
        let f = fixture();
        let doc = assemble(&f, AmortizationMethod::Indirect3a);

        assert_eq!(doc.signatures.borrower1, "Anna Keller");
        // Second borrower earns but was never named.
        assert_eq!(doc.signatures.borrower2.as_deref(), Some("Borrower 2"));
    }

    #[test]
    fn test_no_second_borrower_no_signature_block() {
        let mut f = fixture();
        f.snapshot.borrower2 = BorrowerProfile::default();
        f.risk = compute_risk_gaps(&f.model, &f.snapshot, &f.config, f.mix.blended_rate);
        let doc = assemble(&f, AmortizationMethod::Indirect3a);

        assert!(doc.signatures.borrower2.is_none());
        assert!(doc.insurance_offers.iter().all(|o| o.borrower == "Anna Keller"));
    }

    #[test]
    fn test_renovation_reserve_row() {
        let f = fixture();
        let doc = assemble(&f, AmortizationMethod::Indirect3a);

        let reserve = doc
            .savings_plan
            .iter()
            .find(|i| i.kind == SavingsPlanKind::RenovationReserve)
            .unwrap();
        // 1m * 0.6% / 12 = 500
        assert_eq!(reserve.monthly_amount, dec!(500));
        assert!(reserve.preselected);
    }
}

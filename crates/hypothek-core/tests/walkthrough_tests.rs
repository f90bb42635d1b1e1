use chrono::NaiveDate;
use hypothek_core::financing::{compute_financing_model, validate, Violation};
use hypothek_core::phases::{Phase, PhaseController, TransitionBlocked};
use hypothek_core::risk::compute_risk_gaps;
use hypothek_core::snapshot::{
    BorrowerProfile, CapitalCommitment, InputSnapshot, PropertyDeal,
};
use hypothek_core::tranches::{TrancheProduct, TrancheSet};
use hypothek_core::LendingConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Reference scenario: a couple buying a 1m property
// ===========================================================================

fn couple_snapshot() -> InputSnapshot {
    InputSnapshot {
        valuation_date: NaiveDate::from_ymd_opt(2024, 9, 1),
        borrower1: BorrowerProfile {
            name: "Anna Keller".to_string(),
            income: dec!(150_000),
            birth_date: NaiveDate::from_ymd_opt(1984, 4, 12),
            bank_balance: dec!(320_000),
            pillar_3a_balance: dec!(60_000),
            disability_pension: dec!(90_000),
            survivor_pension: dec!(45_000),
            retirement_pension: dec!(85_000),
            ..Default::default()
        },
        borrower2: BorrowerProfile {
            name: "Luca Keller".to_string(),
            income: dec!(80_000),
            disability_pension: dec!(48_000),
            survivor_pension: dec!(24_000),
            retirement_pension: dec!(45_000),
            ..Default::default()
        },
        property: PropertyDeal {
            price: dec!(1_000_000),
            renovation_cost: Decimal::ZERO,
        },
        commitment: CapitalCommitment {
            from_accounts: dec!(250_000),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_quarter_equity_reference_figures() {
    let config = LendingConfig::default();
    let model = compute_financing_model(&couple_snapshot(), &config);

    assert_eq!(model.mortgage_amount, dec!(750_000));
    assert_eq!(model.loan_to_value, dec!(0.75));
    assert_eq!(model.ltv_excess, Decimal::ZERO);
    assert_eq!(
        model.first_mortgage + model.second_mortgage,
        model.mortgage_amount
    );
    assert!(validate(&model, &couple_snapshot(), &config).is_empty());
}

#[test]
fn test_thin_equity_reference_figures() {
    let config = LendingConfig::default();
    let mut snapshot = couple_snapshot();
    snapshot.commitment.from_accounts = dec!(150_000);

    let model = compute_financing_model(&snapshot, &config);
    assert_eq!(model.mortgage_amount, dec!(850_000));
    assert_eq!(model.loan_to_value, dec!(0.85));
    assert_eq!(model.ltv_excess, dec!(50_000));
}

#[test]
fn test_zero_income_still_validates() {
    let config = LendingConfig::default();
    let mut snapshot = couple_snapshot();
    snapshot.borrower1.income = Decimal::ZERO;
    snapshot.borrower2.income = Decimal::ZERO;

    let model = compute_financing_model(&snapshot, &config);
    assert_eq!(model.burden_ratio, Decimal::ZERO);
    assert!(validate(&model, &snapshot, &config).contains(&Violation::NonPositiveIncome));
}

// ===========================================================================
// End-to-end walkthrough
// ===========================================================================

#[test]
fn test_walkthrough_to_proposal() {
    let mut controller = PhaseController::default();
    controller.submit_inputs(couple_snapshot()).unwrap();

    while controller.current_phase() != Some(Phase::Proposal) {
        controller.advance().unwrap();
    }

    let proposal = controller.proposal().unwrap();
    assert_eq!(proposal.signatures.borrower1, "Anna Keller");
    assert_eq!(proposal.signatures.borrower2.as_deref(), Some("Luca Keller"));
    assert_eq!(proposal.mortgage_offers.len(), 1);
    assert_eq!(
        proposal.mortgage_offers[0].amount,
        controller.model().unwrap().mortgage_amount
    );
}

#[test]
fn test_walkthrough_with_restructured_mix() {
    let mut controller = PhaseController::default();
    controller.submit_inputs(couple_snapshot()).unwrap();
    for _ in 0..3 {
        controller.advance().unwrap();
    }
    assert_eq!(controller.current_phase(), Some(Phase::Tranches));

    controller
        .add_tranche(TrancheProduct::Saron, dec!(250_000), dec!(0.011))
        .unwrap();
    controller.set_tranche_rate(0, dec!(0.021)).unwrap();

    let mix = controller.tranche_mix().unwrap().clone();
    assert_eq!(mix.total_allocated, dec!(750_000));
    let expected_blended =
        (dec!(500_000) * dec!(0.021) + dec!(250_000) * dec!(0.011)) / dec!(750_000);
    assert_eq!(mix.blended_rate, expected_blended);

    controller.advance().unwrap();
    assert_eq!(
        controller.monthly_costs().unwrap().monthly_interest,
        mix.effective_yearly_interest / dec!(12)
    );

    controller.advance().unwrap();
    assert_eq!(controller.proposal().unwrap().mortgage_offers.len(), 2);
}

#[test]
fn test_blocked_submission_carries_shortfalls() {
    let mut controller = PhaseController::default();
    let mut snapshot = couple_snapshot();
    snapshot.commitment.from_accounts = dec!(500_000); // more than the 320k balance

    let Err(TransitionBlocked::Validation { violations }) =
        controller.submit_inputs(snapshot)
    else {
        panic!("over-committed accounts must block the submission");
    };
    assert!(violations
        .iter()
        .any(|v| matches!(v, Violation::AccountCapitalExceeded { .. })));
    assert_eq!(controller.current_phase(), None);
}

// ===========================================================================
// Cost properties across component boundaries
// ===========================================================================

#[test]
fn test_underallocated_mix_charges_penalty_spread() {
    let config = LendingConfig::default();
    let model = compute_financing_model(&couple_snapshot(), &config);

    // Two tranches leaving 50k of the 750k mortgage unstructured.
    let mut set = TrancheSet::balanced_to(model.mortgage_amount, &config);
    set.add(
        TrancheProduct::Fixed { years: 5 },
        dec!(300_000),
        dec!(0.016),
        model.mortgage_amount,
    )
    .unwrap();
    set.set_amount(0, dec!(400_000), model.mortgage_amount).unwrap();

    let mix = set.recompute(model.mortgage_amount, &config);
    assert_eq!(mix.residual, dec!(50_000));

    let own_interest = dec!(400_000) * dec!(0.018) + dec!(300_000) * dec!(0.016);
    assert_eq!(mix.effective_yearly_interest, own_interest + dec!(1_250));
}

#[test]
fn test_risk_gaps_never_negative_and_income_monotone() {
    let config = LendingConfig::default();
    let snapshot = couple_snapshot();
    let model = compute_financing_model(&snapshot, &config);
    let gaps = compute_risk_gaps(&model, &snapshot, &config, config.default_tranche_rate);

    let all_gaps = [
        gaps.borrower1.unemployment.gap,
        gaps.borrower1.disability.gap,
        gaps.borrower1.death.capital_needed,
        gaps.retirement_borrower1.gap,
        gaps.retirement_borrower2.gap,
        gaps.retirement_both.gap,
        gaps.market_crash.margin_call,
    ];
    assert!(all_gaps.iter().all(|g| *g >= Decimal::ZERO));

    // Raising income can only shrink gaps.
    let mut richer = couple_snapshot();
    richer.borrower2.income = dec!(140_000);
    let richer_model = compute_financing_model(&richer, &config);
    let richer_gaps =
        compute_risk_gaps(&richer_model, &richer, &config, config.default_tranche_rate);
    assert!(richer_gaps.borrower1.unemployment.gap <= gaps.borrower1.unemployment.gap);
    assert!(
        richer_gaps.borrower1.death.capital_needed <= gaps.borrower1.death.capital_needed
    );
}

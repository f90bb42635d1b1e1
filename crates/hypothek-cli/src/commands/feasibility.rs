use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use hypothek_core::financing::{compute_financing_model, validate};
use hypothek_core::snapshot::{CapitalCommitment, InputSnapshot, PropertyDeal};
use hypothek_core::{with_metadata, LendingConfig};

use crate::input;

/// Arguments for the feasibility check
#[derive(Args)]
pub struct FeasibilityArgs {
    /// Path to a JSON/YAML snapshot file (see also --form and stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a flat form-field map, parsed tolerantly ("CHF 1'000'000")
    #[arg(long)]
    pub form: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Renovation cost added to the investment
    #[arg(long)]
    pub renovation: Option<Decimal>,

    /// Borrower 1 yearly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Borrower 2 yearly income
    #[arg(long)]
    pub partner_income: Option<Decimal>,

    /// Capital committed from accounts and securities
    #[arg(long)]
    pub own_funds: Option<Decimal>,

    /// Available bank/securities balance (defaults to the committed funds)
    #[arg(long)]
    pub liquid_assets: Option<Decimal>,

    /// One-time purchase fees
    #[arg(long)]
    pub fees: Option<Decimal>,
}

/// Build a minimal snapshot from the quick flags.
pub fn snapshot_from_flags(args: &FeasibilityArgs) -> Result<InputSnapshot, Box<dyn std::error::Error>> {
    let price = args
        .price
        .ok_or("--price is required (or provide --input / --form)")?;
    let income = args
        .income
        .ok_or("--income is required (or provide --input / --form)")?;
    let own_funds = args.own_funds.unwrap_or(Decimal::ZERO);

    let mut snapshot = InputSnapshot {
        valuation_date: Some(chrono::Local::now().date_naive()),
        property: PropertyDeal {
            price,
            renovation_cost: args.renovation.unwrap_or(Decimal::ZERO),
        },
        commitment: CapitalCommitment {
            from_accounts: own_funds,
            ..Default::default()
        },
        ..Default::default()
    };
    snapshot.borrower1.income = income;
    snapshot.borrower2.income = args.partner_income.unwrap_or(Decimal::ZERO);
    snapshot.borrower1.bank_balance = args.liquid_assets.unwrap_or(own_funds);
    snapshot.fees.manual_total = args.fees.unwrap_or(Decimal::ZERO);
    Ok(snapshot)
}

pub fn run_feasibility(args: FeasibilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = match input::load_snapshot(&args.input, &args.form)? {
        Some(snapshot) => snapshot,
        None => snapshot_from_flags(&args)?,
    };

    let start = Instant::now();
    let config = LendingConfig::default();
    let model = compute_financing_model(&snapshot, &config);
    let violations = validate(&model, &snapshot, &config);
    let warnings: Vec<String> = violations.iter().map(ToString::to_string).collect();
    let elapsed = start.elapsed().as_micros() as u64;

    let output = with_metadata(
        "Swiss financing feasibility (stress-rate affordability, LTV split at 65%/80%)",
        &serde_json::json!({
            "stress_interest_rate": config.stress_interest_rate.to_string(),
            "max_loan_to_value": config.max_loan_to_value.to_string(),
            "max_burden_ratio": config.max_burden_ratio.to_string(),
            "valuation_date": snapshot.valuation_date,
        }),
        warnings,
        elapsed,
        model,
    );
    Ok(serde_json::to_value(output)?)
}

use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use hypothek_core::financing::compute_financing_model;
use hypothek_core::tranches::{
    monthly_cost_summary, MonthlyCostSummary, Tranche, TrancheMix, TrancheSet,
};
use hypothek_core::{with_metadata, LendingConfig};

use crate::input;

/// Arguments for tranche-mix pricing
#[derive(Args)]
pub struct TranchesArgs {
    /// Path to a JSON/YAML snapshot file
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a flat form-field map
    #[arg(long)]
    pub form: Option<String>,

    /// Path to a JSON/YAML tranche list: [{product, amount, rate}, ...].
    /// Defaults to one tranche carrying the full mortgage.
    #[arg(long)]
    pub tranches: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TrancheReport {
    mix: TrancheMix,
    costs: MonthlyCostSummary,
}

pub fn run_tranches(args: TranchesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = input::load_snapshot(&args.input, &args.form)?
        .ok_or("--input <file> / --form <file> or stdin required for tranche pricing")?;

    let start = Instant::now();
    let config = LendingConfig::default();
    let model = compute_financing_model(&snapshot, &config);

    let set = match &args.tranches {
        Some(path) => {
            let tranches: Vec<Tranche> = input::file::read_input(path)?;
            TrancheSet::from_tranches(tranches)?
        }
        None => TrancheSet::balanced_to(model.mortgage_amount, &config),
    };

    let mix = set.recompute(model.mortgage_amount, &config);
    let costs = monthly_cost_summary(&model, &mix, &config);

    let mut warnings = Vec::new();
    if mix.has_below_minimum() {
        warnings.push(format!(
            "one or more tranches sit below the minimum principal of {}",
            config.min_tranche_amount
        ));
    }
    if !mix.fully_allocated {
        warnings.push(format!(
            "mortgage not fully structured: residual of {}",
            mix.residual
        ));
    }
    let elapsed = start.elapsed().as_micros() as u64;

    let output = with_metadata(
        "Tranche-mix pricing (blended rate, unallocated-residual penalty spread, \
         real monthly costs)",
        &serde_json::json!({
            "mortgage_amount": model.mortgage_amount.to_string(),
            "unallocated_penalty_rate": config.unallocated_penalty_rate.to_string(),
            "min_tranche_amount": config.min_tranche_amount.to_string(),
        }),
        warnings,
        elapsed,
        TrancheReport { mix, costs },
    );
    Ok(serde_json::to_value(output)?)
}

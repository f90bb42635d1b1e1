use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use hypothek_core::financing::{compute_financing_model, validate};
use hypothek_core::risk::compute_risk_gaps;
use hypothek_core::{with_metadata, LendingConfig};

use crate::input;

/// Arguments for the risk-gap analysis
#[derive(Args)]
pub struct RiskArgs {
    /// Path to a JSON/YAML snapshot file
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a flat form-field map
    #[arg(long)]
    pub form: Option<String>,

    /// Blended tranche-mix rate for the rate-shock comparison
    /// (defaults to the configured initial mix rate)
    #[arg(long)]
    pub mix_rate: Option<Decimal>,
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = input::load_snapshot(&args.input, &args.form)?
        .ok_or("--input <file> / --form <file> or stdin required for risk analysis")?;

    let start = Instant::now();
    let config = LendingConfig::default();
    let model = compute_financing_model(&snapshot, &config);
    let warnings: Vec<String> = validate(&model, &snapshot, &config)
        .iter()
        .map(ToString::to_string)
        .collect();

    let blended_rate = args.mix_rate.unwrap_or(config.default_tranche_rate);
    let gaps = compute_risk_gaps(&model, &snapshot, &config, blended_rate);
    let elapsed = start.elapsed().as_micros() as u64;

    let output = with_metadata(
        "Risk-gap analysis (income continuation, affordability-inverse death capital, \
         20% crash LTV re-test, retirement affordability)",
        &serde_json::json!({
            "blended_rate": blended_rate.to_string(),
            "rate_shock": config.rate_shock.to_string(),
            "unemployment_insurance_cap": config.unemployment_insurance_cap.to_string(),
            "death_capital_tax_markup": config.death_capital_tax_markup.to_string(),
        }),
        warnings,
        elapsed,
        gaps,
    );
    Ok(serde_json::to_value(output)?)
}

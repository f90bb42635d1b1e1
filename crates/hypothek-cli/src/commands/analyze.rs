use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use hypothek_core::financing::FinancingModel;
use hypothek_core::phases::{
    PhaseController, ProposalDocument, RecommendationSet, TransitionBlocked,
};
use hypothek_core::risk::RiskGapSet;
use hypothek_core::tranches::{
    AmortizationMethod, MonthlyCostSummary, Tranche, TrancheMix,
};
use hypothek_core::LendingConfig;

use crate::input;

/// Arguments for the full walkthrough
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to a JSON/YAML snapshot file
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a flat form-field map
    #[arg(long)]
    pub form: Option<String>,

    /// Path to a JSON/YAML tranche list applied in the structuring phase.
    /// The lead tranche auto-balances to the residual.
    #[arg(long)]
    pub tranches: Option<String>,

    /// Amortize the second mortgage directly instead of via pillar 3a
    #[arg(long)]
    pub direct_amortization: bool,
}

/// Every phase record of one completed walkthrough.
#[derive(Debug, Serialize)]
struct AnalysisReport {
    model: FinancingModel,
    risk: RiskGapSet,
    mix: TrancheMix,
    costs: MonthlyCostSummary,
    recommendations: RecommendationSet,
    proposal: ProposalDocument,
}

fn blocked_to_error(blocked: TransitionBlocked) -> Box<dyn std::error::Error> {
    match blocked {
        TransitionBlocked::Validation { violations } => {
            let mut message = String::from("feasibility blocked:");
            for violation in violations {
                message.push_str("\n  - ");
                message.push_str(&violation.to_string());
            }
            message.into()
        }
        other => other.to_string().into(),
    }
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = input::load_snapshot(&args.input, &args.form)?
        .ok_or("--input <file> / --form <file> or stdin required for a full analysis")?;

    let start = Instant::now();
    let mut controller = PhaseController::new(LendingConfig::default());
    controller
        .submit_inputs(snapshot)
        .map_err(blocked_to_error)?;

    // Feasibility -> affordability -> risk -> tranches.
    for _ in 0..3 {
        controller.advance().map_err(blocked_to_error)?;
    }

    if let Some(path) = &args.tranches {
        apply_tranche_file(&mut controller, path)?;
    }
    if args.direct_amortization {
        controller.set_amortization_method(AmortizationMethod::Direct);
    }

    // Monthly costs -> proposal.
    for _ in 0..2 {
        controller.advance().map_err(blocked_to_error)?;
    }

    let report = AnalysisReport {
        model: controller.model().cloned().ok_or("missing financing model")?,
        risk: controller.risk_gaps().cloned().ok_or("missing risk gaps")?,
        mix: controller.tranche_mix().cloned().ok_or("missing tranche mix")?,
        costs: controller
            .monthly_costs()
            .cloned()
            .ok_or("missing monthly costs")?,
        recommendations: controller
            .recommendations()
            .cloned()
            .ok_or("missing recommendations")?,
        proposal: controller.proposal().cloned().ok_or("missing proposal")?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let output = hypothek_core::with_metadata(
        "Six-phase walkthrough: feasibility, affordability, risk gaps, tranche \
         structuring, monthly costs, proposal",
        &serde_json::json!({
            "blended_rate": report.mix.blended_rate.to_string(),
            "amortization": if args.direct_amortization { "direct" } else { "indirect_3a" },
        }),
        Vec::new(),
        elapsed,
        report,
    );
    Ok(serde_json::to_value(output)?)
}

/// Replay a tranche list through the controller's edit surface: the lead
/// takes the first entry's product and rate, every further entry is added
/// with its amount, and the lead's amount balances to the residual.
fn apply_tranche_file(
    controller: &mut PhaseController,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let tranches: Vec<Tranche> = input::file::read_input(path)?;
    let Some((lead, rest)) = tranches.split_first() else {
        return Err("tranche file must hold at least one tranche".into());
    };

    controller.set_tranche_product(0, lead.product)?;
    controller.set_tranche_rate(0, lead.rate)?;
    for tranche in rest {
        controller.add_tranche(tranche.product, tranche.amount, tranche.rate)?;
    }
    Ok(())
}

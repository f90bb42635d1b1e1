mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analyze::AnalyzeArgs;
use commands::feasibility::FeasibilityArgs;
use commands::risk::RiskArgs;
use commands::tranches::TranchesArgs;

/// Swiss mortgage affordability and risk analysis
#[derive(Parser)]
#[command(
    name = "hypothek",
    version,
    about = "Swiss mortgage affordability and risk analysis",
    long_about = "A CLI for Swiss residential financing analysis with decimal \
                  precision. Derives the financing model, checks feasibility \
                  rules, computes risk gaps (unemployment, disability, death, \
                  market crash, retirement), prices tranche mixes, and walks \
                  the full six-phase analysis to the final proposal."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive the financing model and check the feasibility rules
    Feasibility(FeasibilityArgs),
    /// Compute risk gaps against the financing model
    Risk(RiskArgs),
    /// Price a tranche mix and re-derive the monthly costs
    Tranches(TranchesArgs),
    /// Run the full six-phase walkthrough to the proposal document
    Analyze(AnalyzeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Feasibility(args) => commands::feasibility::run_feasibility(args),
        Commands::Risk(args) => commands::risk::run_risk(args),
        Commands::Tranches(args) => commands::tranches::run_tranches(args),
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::Version => {
            println!("hypothek {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

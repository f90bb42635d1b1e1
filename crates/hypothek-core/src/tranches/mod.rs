pub mod costs;
pub mod mix;

pub use costs::{monthly_cost_summary, AmortizationMethod, AmortizationSplit, MonthlyCostSummary};
pub use mix::{Tranche, TrancheMix, TranchePosition, TrancheProduct, TrancheSet, MAX_TRANCHES};

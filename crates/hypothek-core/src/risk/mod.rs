pub mod gaps;
pub mod severity;

pub use gaps::{
    affordable_mortgage, compute_risk_gaps, BorrowerRiskGaps, CrashScenario, DeathScenario,
    IncomeScenario, RateShockScenario, RetirementScenario, RiskGapSet,
};
pub use severity::Severity;

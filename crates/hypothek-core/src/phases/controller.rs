use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LendingConfig;
use crate::financing::{compute_financing_model, validate, FinancingModel, Violation};
use crate::risk::{compute_risk_gaps, RiskGapSet};
use crate::snapshot::InputSnapshot;
use crate::tranches::{
    monthly_cost_summary, AmortizationMethod, MonthlyCostSummary, Tranche, TrancheMix,
    TrancheProduct, TrancheSet,
};
use crate::types::{Money, Rate};
use crate::{HypoError, HypoResult};

use super::proposal::{assemble_proposal, ProposalDocument};
use super::recommend::{build_recommendations, RecommendationSet};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The six result phases of an analysis, in walkthrough order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Phase {
    Feasibility,
    Affordability,
    Risk,
    Tranches,
    MonthlyCosts,
    Proposal,
}

impl Phase {
    pub fn index(self) -> u8 {
        match self {
            Phase::Feasibility => 1,
            Phase::Affordability => 2,
            Phase::Risk => 3,
            Phase::Tranches => 4,
            Phase::MonthlyCosts => 5,
            Phase::Proposal => 6,
        }
    }

    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Feasibility => Some(Phase::Affordability),
            Phase::Affordability => Some(Phase::Risk),
            Phase::Risk => Some(Phase::Tranches),
            Phase::Tranches => Some(Phase::MonthlyCosts),
            Phase::MonthlyCosts => Some(Phase::Proposal),
            Phase::Proposal => None,
        }
    }

    pub fn prev(self) -> Option<Phase> {
        match self {
            Phase::Feasibility => None,
            Phase::Affordability => Some(Phase::Feasibility),
            Phase::Risk => Some(Phase::Affordability),
            Phase::Tranches => Some(Phase::Risk),
            Phase::MonthlyCosts => Some(Phase::Tranches),
            Phase::Proposal => Some(Phase::MonthlyCosts),
        }
    }
}

/// Why a phase transition was refused. Never fatal: the controller stays
/// on its current phase and the caller shows the reason.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionBlocked {
    #[error("inputs break {} feasibility rule(s)", .violations.len())]
    Validation { violations: Vec<Violation> },

    #[error("a tranche is below the minimum principal")]
    TrancheBelowMinimum,

    #[error("no analysis has been submitted yet")]
    NotStarted,

    #[error("already at the final phase")]
    AtFinalPhase,

    #[error("already at the first phase")]
    AtFirstPhase,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Sequences the walkthrough and owns the latest immutable result record
/// per phase.
///
/// Forward transitions re-run the target phase's computation; backward
/// transitions only move the cursor. Edits to the tranche mix cascade
/// through the blended rate, the monthly totals, the risk gaps (once the
/// risk phase was visited) and the proposal (while it is showing), so no
/// phase ever shows a stale record.
#[derive(Debug, Clone)]
pub struct PhaseController {
    config: LendingConfig,
    snapshot: InputSnapshot,
    amortization: AmortizationMethod,
    tranches: Option<TrancheSet>,
    phase: Option<Phase>,
    risk_visited: bool,
    model: Option<FinancingModel>,
    risk: Option<RiskGapSet>,
    mix: Option<TrancheMix>,
    costs: Option<MonthlyCostSummary>,
    recommendations: Option<RecommendationSet>,
    proposal: Option<ProposalDocument>,
}

impl PhaseController {
    pub fn new(config: LendingConfig) -> Self {
        Self {
            config,
            snapshot: InputSnapshot::default(),
            amortization: AmortizationMethod::default(),
            tranches: None,
            phase: None,
            risk_visited: false,
            model: None,
            risk: None,
            mix: None,
            costs: None,
            recommendations: None,
            proposal: None,
        }
    }

    // -- navigation ---------------------------------------------------------

    /// Leave the editing state: compute and validate the snapshot, and
    /// enter the feasibility phase. Refused with the full violation list
    /// while any feasibility rule is broken; the controller then stays in
    /// editing with the snapshot retained.
    pub fn submit_inputs(
        &mut self,
        snapshot: InputSnapshot,
    ) -> Result<&FinancingModel, TransitionBlocked> {
        let model = compute_financing_model(&snapshot, &self.config);
        let violations = validate(&model, &snapshot, &self.config);

        // A fresh submission outdates everything downstream either way;
        // the freshly computed model stays readable so blocked submissions
        // can still show derived figures.
        self.snapshot = snapshot;
        self.phase = None;
        self.risk_visited = false;
        self.tranches = None;
        self.risk = None;
        self.mix = None;
        self.costs = None;
        self.recommendations = None;
        self.proposal = None;
        let model = self.model.insert(model);

        if !violations.is_empty() {
            return Err(TransitionBlocked::Validation { violations });
        }
        self.phase = Some(Phase::Feasibility);
        Ok(model)
    }

    /// Back to editing. Visibility only: the latest phase records stay
    /// available until the next submission replaces them.
    pub fn edit_inputs(&mut self) {
        self.phase = None;
    }

    /// Step forward, re-running the computation the target phase shows.
    pub fn advance(&mut self) -> Result<Phase, TransitionBlocked> {
        let current = self.phase.ok_or(TransitionBlocked::NotStarted)?;
        let target = current.next().ok_or(TransitionBlocked::AtFinalPhase)?;

        match target {
            Phase::Feasibility => {}
            Phase::Affordability => {
                self.model = Some(compute_financing_model(&self.snapshot, &self.config));
            }
            Phase::Risk => {
                self.recompute_risk();
                self.risk_visited = true;
            }
            Phase::Tranches => {
                if let Some(model) = &self.model {
                    let set = TrancheSet::balanced_to(model.mortgage_amount, &self.config);
                    let mix = set.recompute(model.mortgage_amount, &self.config);
                    self.tranches = Some(set);
                    self.mix = Some(mix);
                }
                if self.risk_visited {
                    self.recompute_risk();
                }
            }
            Phase::MonthlyCosts => {
                let (Some(model), Some(set)) = (&self.model, &self.tranches) else {
                    return Err(TransitionBlocked::NotStarted);
                };
                let mix = set.recompute(model.mortgage_amount, &self.config);
                if mix.has_below_minimum() {
                    return Err(TransitionBlocked::TrancheBelowMinimum);
                }
                let costs = monthly_cost_summary(model, &mix, &self.config);
                self.mix = Some(mix);
                self.costs = Some(costs);
                self.rebuild_recommendations();
            }
            Phase::Proposal => {
                self.rebuild_recommendations();
                if !self.rebuild_proposal() {
                    return Err(TransitionBlocked::NotStarted);
                }
            }
        }

        self.phase = Some(target);
        Ok(target)
    }

    /// Step backward. Visibility only; nothing is recomputed.
    pub fn back(&mut self) -> Result<Phase, TransitionBlocked> {
        let current = self.phase.ok_or(TransitionBlocked::NotStarted)?;
        let target = current.prev().ok_or(TransitionBlocked::AtFirstPhase)?;
        self.phase = Some(target);
        Ok(target)
    }

    // -- tranche edits ------------------------------------------------------

    pub fn add_tranche(
        &mut self,
        product: TrancheProduct,
        amount: Money,
        rate: Rate,
    ) -> HypoResult<()> {
        let mortgage = self.mortgage_amount()?;
        self.tranche_set_mut()?.add(product, amount, rate, mortgage)?;
        self.cascade_from_tranches();
        Ok(())
    }

    pub fn remove_tranche(&mut self, index: usize) -> HypoResult<()> {
        let mortgage = self.mortgage_amount()?;
        self.tranche_set_mut()?.remove(index, mortgage)?;
        self.cascade_from_tranches();
        Ok(())
    }

    pub fn set_tranche_amount(&mut self, index: usize, amount: Money) -> HypoResult<()> {
        let mortgage = self.mortgage_amount()?;
        self.tranche_set_mut()?.set_amount(index, amount, mortgage)?;
        self.cascade_from_tranches();
        Ok(())
    }

    pub fn set_tranche_rate(&mut self, index: usize, rate: Rate) -> HypoResult<()> {
        self.tranche_set_mut()?.set_rate(index, rate)?;
        self.cascade_from_tranches();
        Ok(())
    }

    pub fn set_tranche_product(
        &mut self,
        index: usize,
        product: TrancheProduct,
    ) -> HypoResult<()> {
        self.tranche_set_mut()?.set_product(index, product)?;
        self.cascade_from_tranches();
        Ok(())
    }

    /// Choose how the amortization is paid. Amounts are untouched; only
    /// the proposal's savings-plan decomposition changes.
    pub fn set_amortization_method(&mut self, method: AmortizationMethod) {
        self.amortization = method;
        if matches!(self.phase, Some(Phase::Proposal)) {
            self.rebuild_proposal();
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn current_phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn config(&self) -> &LendingConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &InputSnapshot {
        &self.snapshot
    }

    pub fn amortization_method(&self) -> &AmortizationMethod {
        &self.amortization
    }

    pub fn model(&self) -> Option<&FinancingModel> {
        self.model.as_ref()
    }

    pub fn risk_gaps(&self) -> Option<&RiskGapSet> {
        self.risk.as_ref()
    }

    pub fn tranches(&self) -> Option<&[Tranche]> {
        self.tranches.as_ref().map(|s| s.tranches())
    }

    pub fn tranche_mix(&self) -> Option<&TrancheMix> {
        self.mix.as_ref()
    }

    pub fn monthly_costs(&self) -> Option<&MonthlyCostSummary> {
        self.costs.as_ref()
    }

    pub fn recommendations(&self) -> Option<&RecommendationSet> {
        self.recommendations.as_ref()
    }

    pub fn proposal(&self) -> Option<&ProposalDocument> {
        self.proposal.as_ref()
    }

    /// The current mix rate: from the tranche mix once structuring ran,
    /// the configured default before.
    pub fn blended_rate(&self) -> Rate {
        self.mix
            .as_ref()
            .map(|m| m.blended_rate)
            .unwrap_or(self.config.default_tranche_rate)
    }

    // -- internals ----------------------------------------------------------

    fn mortgage_amount(&self) -> HypoResult<Money> {
        self.model
            .as_ref()
            .map(|m| m.mortgage_amount)
            .ok_or(HypoError::TranchesNotInitialized)
    }

    fn tranche_set_mut(&mut self) -> HypoResult<&mut TrancheSet> {
        self.tranches
            .as_mut()
            .ok_or(HypoError::TranchesNotInitialized)
    }

    fn recompute_risk(&mut self) {
        let blended = self.blended_rate();
        if let Some(model) = &self.model {
            self.risk = Some(compute_risk_gaps(
                model,
                &self.snapshot,
                &self.config,
                blended,
            ));
        }
    }

    fn rebuild_recommendations(&mut self) {
        if let (Some(model), Some(risk)) = (&self.model, &self.risk) {
            self.recommendations = Some(build_recommendations(model, risk, &self.config));
        }
    }

    fn rebuild_proposal(&mut self) -> bool {
        let (Some(model), Some(risk), Some(mix), Some(costs)) =
            (&self.model, &self.risk, &self.mix, &self.costs)
        else {
            return false;
        };
        self.proposal = Some(assemble_proposal(
            model,
            &self.snapshot,
            risk,
            mix,
            costs,
            &self.amortization,
            &self.config,
        ));
        true
    }

    /// Everything downstream of a tranche edit, in dependency order.
    fn cascade_from_tranches(&mut self) {
        let (Some(model), Some(set)) = (&self.model, &self.tranches) else {
            return;
        };
        let mix = set.recompute(model.mortgage_amount, &self.config);
        let costs = self
            .costs
            .as_ref()
            .map(|_| monthly_cost_summary(model, &mix, &self.config));
        self.mix = Some(mix);
        if costs.is_some() {
            self.costs = costs;
        }
        if self.risk_visited {
            self.recompute_risk();
            if self.recommendations.is_some() {
                self.rebuild_recommendations();
            }
        }
        if matches!(self.phase, Some(Phase::Proposal)) {
            self.rebuild_proposal();
        }
    }
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new(LendingConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

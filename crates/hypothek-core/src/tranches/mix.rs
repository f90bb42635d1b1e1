use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::error::HypoError;
use crate::types::{Money, Rate};
use crate::HypoResult;

/// A mix holds at most this many tranches.
pub const MAX_TRANCHES: usize = 4;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Mortgage product a tranche is written on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrancheProduct {
    /// Fixed-rate mortgage over the given term.
    Fixed { years: u8 },
    /// Money-market mortgage tracking the SARON reference rate.
    Saron,
}

impl TrancheProduct {
    pub fn label(&self) -> String {
        match self {
            TrancheProduct::Fixed { years } => format!("Fixed {years}y"),
            TrancheProduct::Saron => "SARON".to_string(),
        }
    }

    /// Variable-rate products carry repricing risk worth flagging.
    pub fn is_variable(&self) -> bool {
        matches!(self, TrancheProduct::Saron)
    }
}

impl Default for TrancheProduct {
    fn default() -> Self {
        TrancheProduct::Fixed { years: 10 }
    }
}

/// One slice of the mortgage with its own product and rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tranche {
    pub product: TrancheProduct,
    pub amount: Money,
    pub rate: Rate,
}

/// The user-edited list of tranches, 1 to 4 entries.
///
/// The lead (first) tranche absorbs whatever the others leave open: any
/// edit to another tranche resets it to `max(0, mortgage - sum(others))`,
/// keeping the set balanced by construction. Editing the lead itself only
/// shows up as a residual, surfaced rather than silently corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheSet {
    tranches: Vec<Tranche>,
}

/// One tranche priced inside a recomputed mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranchePosition {
    pub label: String,
    pub amount: Money,
    pub rate: Rate,
    pub yearly_interest: Money,
    pub monthly_interest: Money,
    /// Non-zero but under the minimum principal.
    pub below_minimum: bool,
    pub variable_rate: bool,
}

/// Derived pricing of a tranche set against the mortgage amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheMix {
    pub positions: Vec<TranchePosition>,
    pub total_allocated: Money,
    /// Mortgage left unstructured (negative when over-allocated).
    pub residual: Money,
    /// Tranche interest plus the penalty spread on a positive residual.
    pub effective_yearly_interest: Money,
    /// Effective interest over the mortgage; the "current mix rate".
    pub blended_rate: Rate,
    pub fully_allocated: bool,
}

impl TrancheMix {
    /// True while any tranche sits below the minimum principal; blocks the
    /// transition to the monthly-cost phase.
    pub fn has_below_minimum(&self) -> bool {
        self.positions.iter().any(|p| p.below_minimum)
    }
}

// ---------------------------------------------------------------------------
// Tranche set
// ---------------------------------------------------------------------------

impl TrancheSet {
    /// A fresh set: one lead tranche carrying the full mortgage at the
    /// configured default rate.
    pub fn balanced_to(mortgage_amount: Money, config: &LendingConfig) -> Self {
        Self {
            tranches: vec![Tranche {
                product: TrancheProduct::default(),
                amount: mortgage_amount.max(Decimal::ZERO),
                rate: config.default_tranche_rate,
            }],
        }
    }

    /// Take over an externally assembled list as-is (no rebalancing).
    pub fn from_tranches(tranches: Vec<Tranche>) -> HypoResult<Self> {
        if tranches.is_empty() {
            return Err(HypoError::LastTranche);
        }
        if tranches.len() > MAX_TRANCHES {
            return Err(HypoError::TrancheLimitReached { max: MAX_TRANCHES });
        }
        Ok(Self { tranches })
    }

    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }

    pub fn len(&self) -> usize {
        self.tranches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tranches.is_empty()
    }

    /// Append a tranche and rebalance the lead around it.
    pub fn add(
        &mut self,
        product: TrancheProduct,
        amount: Money,
        rate: Rate,
        mortgage_amount: Money,
    ) -> HypoResult<()> {
        if self.tranches.len() >= MAX_TRANCHES {
            return Err(HypoError::TrancheLimitReached { max: MAX_TRANCHES });
        }
        self.tranches.push(Tranche {
            product,
            amount,
            rate,
        });
        self.rebalance_lead(mortgage_amount);
        Ok(())
    }

    /// Remove a tranche; the remaining lead absorbs its amount.
    pub fn remove(&mut self, index: usize, mortgage_amount: Money) -> HypoResult<()> {
        self.check_index(index)?;
        if self.tranches.len() == 1 {
            return Err(HypoError::LastTranche);
        }
        self.tranches.remove(index);
        self.rebalance_lead(mortgage_amount);
        Ok(())
    }

    /// Set a tranche's amount. Edits to any tranche but the lead rebalance
    /// the lead; an edit to the lead itself stands as entered.
    pub fn set_amount(
        &mut self,
        index: usize,
        amount: Money,
        mortgage_amount: Money,
    ) -> HypoResult<()> {
        self.check_index(index)?;
        self.tranches[index].amount = amount;
        if index > 0 {
            self.rebalance_lead(mortgage_amount);
        }
        Ok(())
    }

    pub fn set_rate(&mut self, index: usize, rate: Rate) -> HypoResult<()> {
        self.check_index(index)?;
        self.tranches[index].rate = rate;
        Ok(())
    }

    pub fn set_product(&mut self, index: usize, product: TrancheProduct) -> HypoResult<()> {
        self.check_index(index)?;
        self.tranches[index].product = product;
        Ok(())
    }

    fn check_index(&self, index: usize) -> HypoResult<()> {
        if index >= self.tranches.len() {
            return Err(HypoError::TrancheIndexOutOfRange {
                index,
                count: self.tranches.len(),
            });
        }
        Ok(())
    }

    fn rebalance_lead(&mut self, mortgage_amount: Money) {
        if self.tranches.len() < 2 {
            return;
        }
        let others: Money = self.tranches.iter().skip(1).map(|t| t.amount).sum();
        self.tranches[0].amount = (mortgage_amount - others).max(Decimal::ZERO);
    }

    /// Price the current set against the mortgage.
    ///
    /// A positive residual is charged the penalty spread: leaving part of
    /// the mortgage unstructured is not free. Over-allocation is only
    /// surfaced through the negative residual.
    pub fn recompute(&self, mortgage_amount: Money, config: &LendingConfig) -> TrancheMix {
        let twelve = Decimal::from(12);
        let mut total_allocated = Decimal::ZERO;
        let mut tranche_interest = Decimal::ZERO;

        let positions: Vec<TranchePosition> = self
            .tranches
            .iter()
            .map(|t| {
                let yearly_interest = t.amount * t.rate;
                total_allocated += t.amount;
                tranche_interest += yearly_interest;
                TranchePosition {
                    label: t.product.label(),
                    amount: t.amount,
                    rate: t.rate,
                    yearly_interest,
                    monthly_interest: yearly_interest / twelve,
                    below_minimum: t.amount > Decimal::ZERO
                        && t.amount < config.min_tranche_amount,
                    variable_rate: t.product.is_variable(),
                }
            })
            .collect();

        let residual = mortgage_amount - total_allocated;
        let mut effective_yearly_interest = tranche_interest;
        if residual > Decimal::ZERO {
            effective_yearly_interest += residual * config.unallocated_penalty_rate;
        }

        let blended_rate = if mortgage_amount > Decimal::ZERO {
            effective_yearly_interest / mortgage_amount
        } else {
            Decimal::ZERO
        };

        TrancheMix {
            positions,
            total_allocated,
            residual,
            effective_yearly_interest,
            blended_rate,
            fully_allocated: residual.abs() <= config.full_allocation_tolerance,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

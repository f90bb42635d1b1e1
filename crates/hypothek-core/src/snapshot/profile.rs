use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingConfig;
use crate::types::Money;

use super::fields::FieldSource;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One borrower as entered on the form. All figures are yearly CHF amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowerProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub income: Money,
    /// Existing yearly debt service (leasing, loans).
    #[serde(default)]
    pub debt_service: Money,
    /// Yearly alimony obligations.
    #[serde(default)]
    pub alimony: Money,
    #[serde(default)]
    pub dependents: u32,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub bank_balance: Money,
    #[serde(default)]
    pub securities_balance: Money,
    #[serde(default)]
    pub pillar_3a_balance: Money,
    #[serde(default)]
    pub pension_fund_balance: Money,
    /// Yearly disability pension (state + occupational) if fully disabled.
    #[serde(default)]
    pub disability_pension: Money,
    /// Yearly survivor pension paid to the partner on this borrower's death.
    #[serde(default)]
    pub survivor_pension: Money,
    /// Yearly retirement pension from age `pension_age` on.
    #[serde(default)]
    pub retirement_pension: Money,
}

impl BorrowerProfile {
    /// Income remaining after this borrower's own deductions. Deliberately
    /// unclamped: deductions above income reduce joint scenario income.
    pub fn working_income(&self) -> Money {
        self.income - self.debt_service - self.alimony
    }

    /// Dependents or alimony obligations raise the unemployment benefit rate.
    pub fn has_dependents_or_alimony(&self) -> bool {
        self.dependents > 0 || self.alimony > Decimal::ZERO
    }
}

/// The property under purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeal {
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub renovation_cost: Money,
}

impl PropertyDeal {
    pub fn total_investment(&self) -> Money {
        self.price + self.renovation_cost
    }
}

/// One-time purchase fees. A non-zero manual total overrides the itemization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseFees {
    #[serde(default)]
    pub manual_total: Money,
    #[serde(default)]
    pub transfer_tax: Money,
    #[serde(default)]
    pub notary: Money,
    #[serde(default)]
    pub land_registry: Money,
    #[serde(default)]
    pub mortgage_setup: Money,
    #[serde(default)]
    pub pillar_3a_prefund: Money,
    #[serde(default)]
    pub pension_fund_withdrawal: Money,
}

impl PurchaseFees {
    pub fn total(&self) -> Money {
        if !self.manual_total.is_zero() {
            return self.manual_total;
        }
        self.transfer_tax
            + self.notary
            + self.land_registry
            + self.mortgage_setup
            + self.pillar_3a_prefund
            + self.pension_fund_withdrawal
    }
}

/// Capital the borrowers commit to the purchase, by source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapitalCommitment {
    /// From bank accounts and securities deposits.
    #[serde(default)]
    pub from_accounts: Money,
    #[serde(default)]
    pub from_pillar_3a: Money,
    #[serde(default)]
    pub from_pension_fund: Money,
}

impl CapitalCommitment {
    pub fn total(&self) -> Money {
        self.from_accounts + self.from_pillar_3a + self.from_pension_fund
    }

    /// Equity the bank counts as "hard": everything except pension-fund money.
    pub fn hard_equity(&self) -> Money {
        self.from_accounts + self.from_pillar_3a
    }
}

/// A plain read of every form value at one instant. No derivation beyond
/// summing accessors; rebuilt from scratch on every recomputation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Date the snapshot was taken; age derivation is relative to this so
    /// the whole pipeline stays deterministic. None falls back to the
    /// configured default age.
    #[serde(default)]
    pub valuation_date: Option<NaiveDate>,
    #[serde(default)]
    pub borrower1: BorrowerProfile,
    #[serde(default)]
    pub borrower2: BorrowerProfile,
    #[serde(default)]
    pub property: PropertyDeal,
    #[serde(default)]
    pub fees: PurchaseFees,
    #[serde(default)]
    pub commitment: CapitalCommitment,
}

impl InputSnapshot {
    pub fn total_income(&self) -> Money {
        self.borrower1.income + self.borrower2.income
    }

    pub fn total_deductions(&self) -> Money {
        self.borrower1.debt_service
            + self.borrower2.debt_service
            + self.borrower1.alimony
            + self.borrower2.alimony
    }

    /// Joint income after deductions, floored at zero.
    pub fn effective_income(&self) -> Money {
        (self.total_income() - self.total_deductions()).max(Decimal::ZERO)
    }

    pub fn bank_total(&self) -> Money {
        self.borrower1.bank_balance + self.borrower2.bank_balance
    }

    pub fn securities_total(&self) -> Money {
        self.borrower1.securities_balance + self.borrower2.securities_balance
    }

    /// Bank and securities balances: the pool account commitments draw from.
    pub fn liquid_assets(&self) -> Money {
        self.bank_total() + self.securities_total()
    }

    pub fn pillar_3a_total(&self) -> Money {
        self.borrower1.pillar_3a_balance + self.borrower2.pillar_3a_balance
    }

    pub fn pension_fund_total(&self) -> Money {
        self.borrower1.pension_fund_balance + self.borrower2.pension_fund_balance
    }

    /// A second borrower takes part iff they earn or were named.
    pub fn has_second_borrower(&self) -> bool {
        self.borrower2.income > Decimal::ZERO || !self.borrower2.name.trim().is_empty()
    }

    /// Borrower 1's whole-year age at the valuation date, decremented when
    /// the birthday has not yet occurred that year. Falls back to the
    /// configured default when either date is missing.
    pub fn borrower1_age(&self, config: &LendingConfig) -> u32 {
        match (self.borrower1.birth_date, self.valuation_date) {
            (Some(birth), Some(on)) => age_at(birth, on),
            _ => config.default_age,
        }
    }

    /// Build a snapshot from named form fields, tolerant of absent or
    /// malformed values. `valuation_date` is the caller's "today".
    pub fn from_fields(source: &impl FieldSource, valuation_date: NaiveDate) -> Self {
        Self {
            valuation_date: Some(valuation_date),
            borrower1: read_borrower(source, "borrower1"),
            borrower2: read_borrower(source, "borrower2"),
            property: PropertyDeal {
                price: source.amount("property.price"),
                renovation_cost: source.amount("property.renovation_cost"),
            },
            fees: PurchaseFees {
                manual_total: source.amount("fees.manual_total"),
                transfer_tax: source.amount("fees.transfer_tax"),
                notary: source.amount("fees.notary"),
                land_registry: source.amount("fees.land_registry"),
                mortgage_setup: source.amount("fees.mortgage_setup"),
                pillar_3a_prefund: source.amount("fees.pillar_3a_prefund"),
                pension_fund_withdrawal: source.amount("fees.pension_fund_withdrawal"),
            },
            commitment: CapitalCommitment {
                from_accounts: source.amount("commitment.accounts"),
                from_pillar_3a: source.amount("commitment.pillar_3a"),
                from_pension_fund: source.amount("commitment.pension_fund"),
            },
        }
    }
}

fn read_borrower(source: &impl FieldSource, prefix: &str) -> BorrowerProfile {
    let key = |suffix: &str| format!("{prefix}.{suffix}");
    BorrowerProfile {
        name: source.text(&key("name")),
        income: source.amount(&key("income")),
        debt_service: source.amount(&key("debt_service")),
        alimony: source.amount(&key("alimony")),
        dependents: source.count(&key("dependents")),
        birth_date: source.date(&key("birth_date")),
        bank_balance: source.amount(&key("bank_balance")),
        securities_balance: source.amount(&key("securities_balance")),
        pillar_3a_balance: source.amount(&key("pillar_3a_balance")),
        pension_fund_balance: source.amount(&key("pension_fund_balance")),
        disability_pension: source.amount(&key("disability_pension")),
        survivor_pension: source.amount(&key("survivor_pension")),
        retirement_pension: source.amount(&key("retirement_pension")),
    }
}

/// Whole years between `birth` and `on`, one less while the birthday is
/// still ahead in the year.
fn age_at(birth: NaiveDate, on: NaiveDate) -> u32 {
    let mut age = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

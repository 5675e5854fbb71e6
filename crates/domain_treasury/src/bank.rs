//! Bank registry and ledger counters
//!
//! A "bank" here is an internal account bucket, not an external financial
//! institution. The registry is a fixed set created once at initialization;
//! banks are never deleted, only their cumulative counters move.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Currency, Money};

use crate::error::TreasuryError;

/// Identifier of a bank: a stable, non-empty slug
///
/// Bank documents keep these slugs as their document ids, so every ledger
/// record can point back to its bank without a lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankId(String);

impl BankId {
    /// Creates a bank id, rejecting blank slugs
    pub fn new(slug: impl Into<String>) -> Result<Self, TreasuryError> {
        let slug = slug.into();
        if slug.trim().is_empty() {
            return Err(TreasuryError::validation("bank id must not be blank"));
        }
        Ok(Self(slug))
    }

    /// Returns the slug
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed set of banks the ledger distributes across
///
/// Three buckets receive sale distributions (cost, freight, profit), the
/// reserve vault is funded only by transfers, and the operating banks are
/// the only ones that accept manual deposits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankKind {
    CostVault,
    FreightFund,
    ProfitFund,
    ReserveVault,
    OperatingMain,
    OperatingNorth,
    CashDesk,
}

impl BankKind {
    /// Every bank in the registry, in seeding order
    pub fn all() -> [BankKind; 7] {
        [
            BankKind::CostVault,
            BankKind::FreightFund,
            BankKind::ProfitFund,
            BankKind::ReserveVault,
            BankKind::OperatingMain,
            BankKind::OperatingNorth,
            BankKind::CashDesk,
        ]
    }

    /// The stable slug this bank is stored under
    pub fn slug(&self) -> &'static str {
        match self {
            BankKind::CostVault => "cost_vault",
            BankKind::FreightFund => "freight_fund",
            BankKind::ProfitFund => "profit_fund",
            BankKind::ReserveVault => "reserve_vault",
            BankKind::OperatingMain => "operating_main",
            BankKind::OperatingNorth => "operating_north",
            BankKind::CashDesk => "cash_desk",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            BankKind::CostVault => "Cost Vault",
            BankKind::FreightFund => "Freight Fund",
            BankKind::ProfitFund => "Profit Fund",
            BankKind::ReserveVault => "Reserve Vault",
            BankKind::OperatingMain => "Operating Main",
            BankKind::OperatingNorth => "Operating North",
            BankKind::CashDesk => "Cash Desk",
        }
    }

    /// Returns true for the banks that accept manual deposits
    pub fn is_operating(&self) -> bool {
        matches!(
            self,
            BankKind::OperatingMain | BankKind::OperatingNorth | BankKind::CashDesk
        )
    }

    /// The bank id for this kind
    pub fn id(&self) -> BankId {
        BankId(self.slug().to_string())
    }

    /// Looks a registry bank up by slug
    pub fn from_slug(slug: &str) -> Option<BankKind> {
        BankKind::all().into_iter().find(|kind| kind.slug() == slug)
    }
}

/// A bank's ledger state
///
/// `total_inflow` and `total_outflow` are monotonic non-decreasing for the
/// bank's lifetime. Every balance decrease is an outflow increment; the
/// counters themselves are never decremented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    /// Stable slug identifier, also the document id
    pub id: BankId,
    /// Display name
    pub name: String,
    /// Currency all postings against this bank must carry
    pub currency: Currency,
    /// Cumulative historical inflow
    pub total_inflow: Money,
    /// Cumulative historical outflow
    pub total_outflow: Money,
    /// When the bank was seeded
    pub created_at: DateTime<Utc>,
    /// Last counter mutation
    pub updated_at: DateTime<Utc>,
}

impl Bank {
    /// Creates a bank with zeroed counters
    pub fn new(id: BankId, name: impl Into<String>, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            currency,
            total_inflow: Money::zero(currency),
            total_outflow: Money::zero(currency),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived current balance: inflow minus outflow, may be negative
    pub fn balance(&self) -> Money {
        // Counters always share the bank's currency.
        self.total_inflow - self.total_outflow
    }

    /// Increments the inflow counter
    ///
    /// The amount must be strictly positive; the counter never moves down.
    pub fn credit(&mut self, amount: Money) -> Result<(), TreasuryError> {
        Self::require_positive(amount)?;
        self.total_inflow = self.total_inflow.checked_add(&amount)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Increments the outflow counter
    ///
    /// No sufficient-funds check happens here: expenses are allowed to
    /// drive a bank negative. Callers that must not overdraw (transfers)
    /// check the balance before debiting.
    pub fn debit(&mut self, amount: Money) -> Result<(), TreasuryError> {
        Self::require_positive(amount)?;
        self.total_outflow = self.total_outflow.checked_add(&amount)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn require_positive(amount: Money) -> Result<(), TreasuryError> {
        if !amount.is_positive() {
            return Err(TreasuryError::invalid_amount(format!(
                "ledger amount must be positive, got {}",
                amount.amount()
            )));
        }
        Ok(())
    }
}

/// Builds the seven registry banks with zeroed MXN counters
pub fn standard_banks() -> Vec<Bank> {
    BankKind::all()
        .into_iter()
        .map(|kind| Bank::new(kind.id(), kind.display_name(), Currency::Mxn))
        .collect()
}

//! Sale entity and payment lifecycle
//!
//! A sale's three-way split is fixed at creation; payments advance the
//! paid/remaining amounts and the derived payment state. The entity never
//! talks to the store itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, Money, SaleId};

use crate::allocation::{allocate, PaymentAllocation};
use crate::distribution::{distribute, SaleDistribution};
use crate::error::SalesError;

/// Payment state, derived from the paid amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Nothing paid yet
    Pending,
    /// Partially paid
    Partial,
    /// Fully paid
    Complete,
}

impl PaymentState {
    /// Classifies the state from the amounts
    pub fn from_amounts(paid: &Money, total: &Money) -> Self {
        if paid.is_zero() {
            PaymentState::Pending
        } else if paid.amount() < total.amount() {
            PaymentState::Partial
        } else {
            PaymentState::Complete
        }
    }
}

/// A sale with its fixed split and running payment position
///
/// Two invariants hold at all times: the three shares partition the total
/// exactly, and `amount_paid + amount_remaining == total` exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier
    pub id: SaleId,
    /// Buying client, when known
    pub client_id: Option<ClientId>,
    /// Units sold
    pub quantity: u32,
    /// Sale price per unit
    pub unit_sale_price: Money,
    /// Cost price per unit
    pub unit_cost_price: Money,
    /// Freight price per unit
    pub unit_freight_price: Money,
    /// Total sale amount
    pub total: Money,
    /// Share of the total owed to the cost vault
    pub cost_share: Money,
    /// Share of the total owed to the freight fund
    pub freight_share: Money,
    /// Share of the total owed to the profit fund
    pub profit_share: Money,
    /// Amount received so far
    pub amount_paid: Money,
    /// Amount still outstanding
    pub amount_remaining: Money,
    /// Derived payment state
    pub state: PaymentState,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Creates a sale with its split computed and nothing paid
    pub fn new(
        client_id: Option<ClientId>,
        quantity: u32,
        unit_sale_price: Money,
        unit_cost_price: Money,
        unit_freight_price: Money,
    ) -> Result<Self, SalesError> {
        let split = distribute(quantity, unit_sale_price, unit_cost_price, unit_freight_price)?;
        let currency = split.currency();
        let now = Utc::now();

        Ok(Self {
            id: SaleId::new(),
            client_id,
            quantity,
            unit_sale_price,
            unit_cost_price,
            unit_freight_price,
            total: split.total,
            cost_share: split.cost_share,
            freight_share: split.freight_share,
            profit_share: split.profit_share,
            amount_paid: Money::zero(currency),
            amount_remaining: split.total,
            state: PaymentState::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// The sale's fixed split as a distribution value
    pub fn distribution(&self) -> SaleDistribution {
        SaleDistribution {
            total: self.total,
            cost_share: self.cost_share,
            freight_share: self.freight_share,
            profit_share: self.profit_share,
        }
    }

    /// True once the full total has been received
    pub fn is_settled(&self) -> bool {
        self.state == PaymentState::Complete
    }

    /// Applies a payment and returns its three-way allocation
    ///
    /// Rejects non-positive amounts and anything above the outstanding
    /// remainder; a rejected payment leaves the sale untouched. The
    /// allocation is computed before any field moves, so a failure cannot
    /// leave the sale half-updated.
    pub fn record_payment(&mut self, amount: Money) -> Result<PaymentAllocation, SalesError> {
        if !amount.is_positive() {
            return Err(SalesError::invalid_allocation(format!(
                "payment must be positive, got {}",
                amount.amount()
            )));
        }
        let remaining_after = self.amount_remaining.checked_sub(&amount)?;
        if remaining_after.is_negative() {
            return Err(SalesError::Overpayment {
                remaining: self.amount_remaining.amount(),
                attempted: amount.amount(),
            });
        }

        let allocation = allocate(amount, &self.distribution())?;

        self.amount_paid = self.amount_paid.checked_add(&amount)?;
        self.amount_remaining = remaining_after;
        self.state = PaymentState::from_amounts(&self.amount_paid, &self.total);
        self.updated_at = Utc::now();

        Ok(allocation)
    }
}

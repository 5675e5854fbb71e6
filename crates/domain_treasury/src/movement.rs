//! Ledger postings
//!
//! A movement is one immutable credit or debit against exactly one bank.
//! Movements are append-only; a bank's cumulative counters are the fold of
//! every movement posted against it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Money, MovementId, SaleId, TransferId};

use crate::bank::BankId;
use crate::error::TreasuryError;

/// Direction of a movement relative to the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// Increments the bank's inflow counter
    Inflow,
    /// Increments the bank's outflow counter
    Outflow,
}

/// What produced a movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementCategory {
    /// Cost bucket's share of a sale payment
    SaleCostShare,
    /// Freight bucket's share of a sale payment
    SaleFreightShare,
    /// Profit bucket's share of a sale payment
    SaleProfitShare,
    /// Receiving side of an inter-bank transfer
    TransferIn,
    /// Sending side of an inter-bank transfer
    TransferOut,
    /// Manual income recorded against an operating bank
    ManualDeposit,
    /// Manual expense, allowed against any bank
    ManualExpense,
}

impl MovementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementCategory::SaleCostShare => "sale_cost_share",
            MovementCategory::SaleFreightShare => "sale_freight_share",
            MovementCategory::SaleProfitShare => "sale_profit_share",
            MovementCategory::TransferIn => "transfer_in",
            MovementCategory::TransferOut => "transfer_out",
            MovementCategory::ManualDeposit => "manual_deposit",
            MovementCategory::ManualExpense => "manual_expense",
        }
    }
}

impl fmt::Display for MovementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Back-reference to the record that produced a movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MovementReference {
    Sale(SaleId),
    Transfer(TransferId),
}

/// One immutable ledger posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    /// Unique identifier, also the document id
    pub id: MovementId,
    /// Bank this movement is posted against
    pub bank_id: BankId,
    /// Whether the bank's inflow or outflow counter absorbs the amount
    pub direction: MovementDirection,
    /// What produced the movement
    pub category: MovementCategory,
    /// Posted amount, strictly positive
    pub amount: Money,
    /// Free-text note (required for manual adjustments and transfers)
    pub memo: Option<String>,
    /// Back-reference to the producing sale or transfer
    pub reference: Option<MovementReference>,
    /// When the movement was recorded
    pub occurred_at: DateTime<Utc>,
}

impl Movement {
    /// Creates an inflow posting
    pub fn inflow(
        bank_id: BankId,
        amount: Money,
        category: MovementCategory,
    ) -> Result<Self, TreasuryError> {
        Self::new(bank_id, amount, MovementDirection::Inflow, category)
    }

    /// Creates an outflow posting
    pub fn outflow(
        bank_id: BankId,
        amount: Money,
        category: MovementCategory,
    ) -> Result<Self, TreasuryError> {
        Self::new(bank_id, amount, MovementDirection::Outflow, category)
    }

    fn new(
        bank_id: BankId,
        amount: Money,
        direction: MovementDirection,
        category: MovementCategory,
    ) -> Result<Self, TreasuryError> {
        if !amount.is_positive() {
            return Err(TreasuryError::invalid_amount(format!(
                "movement amount must be positive, got {}",
                amount.amount()
            )));
        }
        Ok(Self {
            id: MovementId::new(),
            bank_id,
            direction,
            category,
            amount,
            memo: None,
            reference: None,
            occurred_at: Utc::now(),
        })
    }

    /// Attaches a memo
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Attaches a back-reference to the producing record
    pub fn with_reference(mut self, reference: MovementReference) -> Self {
        self.reference = Some(reference);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::BankKind;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_inflow_movement() {
        let movement = Movement::inflow(
            BankKind::CostVault.id(),
            Money::new(dec!(63000), Currency::Mxn),
            MovementCategory::SaleCostShare,
        )
        .unwrap();

        assert_eq!(movement.direction, MovementDirection::Inflow);
        assert_eq!(movement.category.as_str(), "sale_cost_share");
        assert!(movement.reference.is_none());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let result = Movement::inflow(
            BankKind::FreightFund.id(),
            Money::zero(Currency::Mxn),
            MovementCategory::SaleFreightShare,
        );

        assert!(matches!(result, Err(TreasuryError::InvalidAmount(_))));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let result = Movement::outflow(
            BankKind::CashDesk.id(),
            Money::new(dec!(-10), Currency::Mxn),
            MovementCategory::ManualExpense,
        );

        assert!(matches!(result, Err(TreasuryError::InvalidAmount(_))));
    }

    #[test]
    fn test_builders_attach_memo_and_reference() {
        let sale_id = SaleId::new();
        let movement = Movement::inflow(
            BankKind::ProfitFund.id(),
            Money::new(dec!(16000), Currency::Mxn),
            MovementCategory::SaleProfitShare,
        )
        .unwrap()
        .with_memo("second installment")
        .with_reference(MovementReference::Sale(sale_id));

        assert_eq!(movement.memo.as_deref(), Some("second installment"));
        assert_eq!(movement.reference, Some(MovementReference::Sale(sale_id)));
    }

    #[test]
    fn test_movement_serializes_with_snake_case_tags() {
        let movement = Movement::outflow(
            BankKind::OperatingMain.id(),
            Money::new(dec!(500), Currency::Mxn),
            MovementCategory::TransferOut,
        )
        .unwrap()
        .with_reference(MovementReference::Transfer(TransferId::new()));

        let value = serde_json::to_value(&movement).unwrap();
        assert_eq!(value["direction"], "outflow");
        assert_eq!(value["category"], "transfer_out");
        assert_eq!(value["reference"]["kind"], "transfer");
    }
}

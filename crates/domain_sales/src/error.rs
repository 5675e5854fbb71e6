//! Sales domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{MoneyError, StoreError};
use domain_treasury::TreasuryError;

/// Errors that can occur in the sales domain
#[derive(Debug, Error)]
pub enum SalesError {
    /// Sale input failed validation before anything was persisted
    #[error("Invalid sale input: {0}")]
    InvalidSaleInput(String),

    /// Payment allocation preconditions violated
    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    /// Payment exceeds the sale's outstanding remainder
    #[error("Overpayment: {remaining} remaining, {attempted} attempted")]
    Overpayment {
        remaining: Decimal,
        attempted: Decimal,
    },

    /// Sale not found
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Money arithmetic failed
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Ledger posting failed
    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    /// Store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SalesError {
    /// Creates an InvalidSaleInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SalesError::InvalidSaleInput(message.into())
    }

    /// Creates an InvalidAllocation error
    pub fn invalid_allocation(message: impl Into<String>) -> Self {
        SalesError::InvalidAllocation(message.into())
    }
}

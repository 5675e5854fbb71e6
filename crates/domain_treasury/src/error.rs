//! Treasury domain errors

use thiserror::Error;

use core_kernel::{MoneyError, StoreError};

/// Errors that can occur in the treasury domain
#[derive(Debug, Error)]
pub enum TreasuryError {
    /// A ledger amount was zero or negative
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transfer source and destination are the same bank
    #[error("Transfer source and destination are the same bank: {0}")]
    SameBank(String),

    /// Source balance does not cover the requested transfer
    #[error("Insufficient funds in {bank_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        bank_id: String,
        balance: rust_decimal::Decimal,
        requested: rust_decimal::Decimal,
    },

    /// Manual deposits only target operating banks
    #[error("Bank {0} does not accept manual deposits")]
    DepositNotAllowed(String),

    /// Bank not found in the registry
    #[error("Bank not found: {0}")]
    BankNotFound(String),

    /// A required field failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Money arithmetic failed (currency mismatch)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// The document store rejected or lost the operation
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl TreasuryError {
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        TreasuryError::InvalidAmount(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TreasuryError::Validation(message.into())
    }

    pub fn bank_not_found(id: impl Into<String>) -> Self {
        TreasuryError::BankNotFound(id.into())
    }
}

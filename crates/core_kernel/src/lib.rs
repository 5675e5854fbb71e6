//! Core Kernel - Foundational types for the distribution ledger
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money types with precise two-decimal commercial arithmetic
//! - Strongly-typed identifiers
//! - The document-store port every ledger operation persists through

pub mod error;
pub mod identifiers;
pub mod money;
pub mod store;

pub use error::CoreError;
pub use identifiers::{ClientId, MovementId, SaleId, TransferId};
pub use money::{Currency, Money, MoneyError};
pub use store::{
    AtomicOperation, DocumentStore, StoreConfig, StoreError, StoredDocument, ID_FIELD,
};

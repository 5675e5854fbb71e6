//! Treasury Domain
//!
//! This crate implements the bank ledger: a fixed registry of seven banks,
//! append-only movements against their inflow/outflow counters, and atomic
//! transfers between them.
//!
//! # Posting Flow
//!
//! ```text
//! credit/debit -> load bank -> bump counter -> movement record
//!                 (one atomic batch, version-pinned)
//! ```
//!
//! Balances are never stored; they are derived as inflow minus outflow.

pub mod bank;
pub mod error;
pub mod movement;
pub mod service;
pub mod transfer;

pub use bank::{standard_banks, Bank, BankId, BankKind};
pub use error::TreasuryError;
pub use movement::{Movement, MovementCategory, MovementDirection, MovementReference};
pub use service::{collections, TreasuryService, VersionedBank};
pub use transfer::TransferRecord;

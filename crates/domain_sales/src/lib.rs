//! Sales Domain
//!
//! This crate implements the sale lifecycle: a fixed three-way split of
//! every sale's total (cost / freight / profit), proportional allocation of
//! each payment against that split, and the atomic ledger postings that
//! feed the treasury's banks.
//!
//! # Payment Flow
//!
//! ```text
//! create_sale -> validate -> distribute -> Pending
//! record_payment -> allocate -> Partial/Complete
//!                   (sale update + bank postings, one atomic batch)
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub mod allocation;
pub mod distribution;
pub mod error;
pub mod sale;
pub mod service;
pub mod validation;

/// Default freight price per unit, applied when a sale omits one
pub const DEFAULT_UNIT_FREIGHT: Decimal = dec!(500);

pub use allocation::{allocate, PaymentAllocation};
pub use distribution::{distribute, SaleDistribution};
pub use error::SalesError;
pub use sale::{PaymentState, Sale};
pub use service::{collections, NewSale, SaleService};
pub use validation::{validate_new_sale, validate_sale};

//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! distribution ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data and seeded in-memory services
//! - `builders`: Builder patterns for test data construction
//! - `assertions`: Custom assertion helpers for domain types
//! - `telemetry`: Tracing initialization for test runs

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod telemetry;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use telemetry::*;

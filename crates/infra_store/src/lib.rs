//! Store Infrastructure
//!
//! This crate provides document store adapters behind the
//! [`core_kernel::DocumentStore`] port. The in-memory adapter is the
//! reference implementation of the port's contract and the backing store
//! for tests; the domain crates never depend on a concrete adapter.

pub mod memory;

pub use memory::MemoryStore;

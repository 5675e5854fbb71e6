//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the ledger,
//! plus seeded in-memory services for integration-style tests. Fixtures are
//! designed to be consistent and predictable for unit tests.

use std::sync::Arc;

use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{ClientId, Currency, Money, MovementId, SaleId, StoreConfig, TransferId};
use domain_sales::SaleService;
use domain_treasury::TreasuryService;
use infra_store::MemoryStore;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Creates an MXN amount
    pub fn mxn(amount: Decimal) -> Money {
        Money::new(amount, Currency::Mxn)
    }

    /// Creates an MXN amount from minor units (cents)
    pub fn mxn_cents(cents: i64) -> Money {
        Money::from_minor(cents, Currency::Mxn)
    }

    /// Creates a zero MXN amount
    pub fn mxn_zero() -> Money {
        Money::zero(Currency::Mxn)
    }

    /// Creates a USD amount for currency mismatch tests
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::Usd)
    }

    /// Standard unit sale price
    pub fn unit_sale_price() -> Money {
        Self::mxn(dec!(10000))
    }

    /// Standard unit cost price
    pub fn unit_cost_price() -> Money {
        Self::mxn(dec!(6300))
    }

    /// Standard unit freight price
    pub fn unit_freight_price() -> Money {
        Self::mxn(dec!(500))
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic sale ID for testing
    pub fn sale_id() -> SaleId {
        SaleId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic client ID for testing
    pub fn client_id() -> ClientId {
        ClientId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic movement ID for testing
    pub fn movement_id() -> MovementId {
        MovementId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic transfer ID for testing
    pub fn transfer_id() -> TransferId {
        TransferId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Standard memo for manual deposits
    pub fn deposit_memo() -> &'static str {
        "opening cash float"
    }

    /// Standard memo for transfers
    pub fn transfer_memo() -> &'static str {
        "monthly rebalance"
    }

    /// Generated company-style client name
    pub fn client_name() -> String {
        CompanyName().fake()
    }

    /// Generated free-text memo
    pub fn random_memo() -> String {
        Sentence(3..8).fake()
    }
}

/// Retry configuration with a short backoff so retry paths run fast in tests
pub fn fast_retry() -> StoreConfig {
    StoreConfig {
        max_retries: 3,
        retry_delay_ms: 1,
    }
}

/// Builds a treasury service over a fresh in-memory store with the bank
/// registry seeded
///
/// The returned store handle shares state with the service, so tests can
/// inspect raw documents or inject failures.
pub async fn seeded_treasury() -> (MemoryStore, TreasuryService<MemoryStore>) {
    let store = MemoryStore::new();
    let service = TreasuryService::with_config(Arc::new(store.clone()), fast_retry());
    service
        .initialize_banks()
        .await
        .expect("bank seeding failed");
    (store, service)
}

/// Builds a sale service over a fresh in-memory store with the bank
/// registry seeded
pub async fn seeded_sales() -> (MemoryStore, SaleService<MemoryStore>) {
    let store = MemoryStore::new();
    let service = SaleService::with_config(Arc::new(store.clone()), fast_retry());
    service
        .treasury()
        .initialize_banks()
        .await
        .expect("bank seeding failed");
    (store, service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_treasury::BankKind;

    #[test]
    fn test_money_fixtures_currencies_match() {
        assert_eq!(MoneyFixtures::mxn(dec!(100)).currency(), Currency::Mxn);
        assert_eq!(MoneyFixtures::usd(dec!(100)).currency(), Currency::Usd);
        assert_eq!(MoneyFixtures::mxn_cents(10050).amount(), dec!(100.50));
    }

    #[test]
    fn test_id_fixtures_are_deterministic() {
        assert_eq!(IdFixtures::sale_id(), IdFixtures::sale_id());
        assert_eq!(IdFixtures::client_id(), IdFixtures::client_id());
    }

    #[test]
    fn test_string_fixtures_generate_content() {
        assert!(!StringFixtures::client_name().is_empty());
        assert!(!StringFixtures::random_memo().is_empty());
    }

    #[tokio::test]
    async fn test_seeded_treasury_starts_zeroed() {
        let (_store, treasury) = seeded_treasury().await;
        for kind in BankKind::all() {
            let balance = treasury.current_balance(&kind.id()).await.unwrap();
            assert!(balance.is_zero());
        }
    }
}

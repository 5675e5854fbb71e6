//! Sale service
//!
//! Orchestrates the sale lifecycle against the document store: validation,
//! distribution, payment allocation, and the three-way ledger postings.
//! A payment's sale update and its bank postings form one atomic batch;
//! they are never observable partially applied.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use core_kernel::{AtomicOperation, DocumentStore, Money, SaleId, StoreConfig};
use domain_treasury::collections as treasury_collections;
use domain_treasury::{
    BankKind, Movement, MovementCategory, MovementReference, TreasuryError, TreasuryService,
    VersionedBank,
};

use crate::allocation::PaymentAllocation;
use crate::error::SalesError;
use crate::sale::Sale;
use crate::validation::{validate_new_sale, validate_sale};
use crate::DEFAULT_UNIT_FREIGHT;

/// Collection names the sales domain persists under
pub mod collections {
    pub const SALES: &str = "sales";
}

/// Input for creating a sale
///
/// Freight defaults to [`DEFAULT_UNIT_FREIGHT`] per unit in the sale's
/// currency when not given. An initial payment, when present and non-zero,
/// is applied through the same path as any later payment.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub client_id: Option<core_kernel::ClientId>,
    pub quantity: u32,
    pub unit_sale_price: Money,
    pub unit_cost_price: Money,
    pub unit_freight_price: Option<Money>,
    pub initial_payment: Option<Money>,
}

/// Service for sale creation, payment recording, and lookup
pub struct SaleService<S> {
    store: Arc<S>,
    treasury: TreasuryService<S>,
    config: StoreConfig,
}

impl<S: DocumentStore> SaleService<S> {
    /// Creates a service with default retry configuration
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, StoreConfig::default())
    }

    /// Creates a service with explicit retry configuration
    pub fn with_config(store: Arc<S>, config: StoreConfig) -> Self {
        let treasury = TreasuryService::with_config(Arc::clone(&store), config.clone());
        Self {
            store,
            treasury,
            config,
        }
    }

    /// The treasury service sharing this service's store
    pub fn treasury(&self) -> &TreasuryService<S> {
        &self.treasury
    }

    /// Creates a sale, applying any initial payment and its postings
    ///
    /// Validation and distribution happen before anything is written. With
    /// an initial payment, the sale document and the payment's ledger
    /// postings land in one atomic batch; without one, only the sale
    /// document is created and the sale stays pending.
    #[instrument(skip(self, input), fields(quantity = input.quantity))]
    pub async fn create_sale(&self, input: NewSale) -> Result<Sale, SalesError> {
        validate_new_sale(&input)?;

        let currency = input.unit_sale_price.currency();
        let freight = input
            .unit_freight_price
            .unwrap_or_else(|| Money::new(DEFAULT_UNIT_FREIGHT, currency));

        let mut sale = Sale::new(
            input.client_id,
            input.quantity,
            input.unit_sale_price,
            input.unit_cost_price,
            freight,
        )?;
        validate_sale(&sale)?;

        let allocation = match input.initial_payment {
            Some(payment) if !payment.is_zero() => {
                let allocation = sale.record_payment(payment)?;
                validate_sale(&sale)?;
                Some(allocation)
            }
            _ => None,
        };

        let mut attempt = 0;
        loop {
            let outcome = self.try_create_sale(&sale, allocation.as_ref()).await;
            match outcome {
                Err(e) if self.should_retry(&e, attempt) => {
                    debug!(attempt, error = %e, "retrying sale creation");
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                    attempt += 1;
                }
                Ok(()) => {
                    info!(sale = %sale.id, state = ?sale.state, total = %sale.total.amount(), "sale created");
                    return Ok(sale);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Records a payment against a sale and posts its allocation
    ///
    /// The sale update (version-checked) and one inflow movement per
    /// non-zero portion apply atomically; a rejected payment changes
    /// nothing anywhere.
    #[instrument(skip(self, amount), fields(sale = %sale_id, amount = %amount.amount()))]
    pub async fn record_payment(&self, sale_id: SaleId, amount: Money) -> Result<Sale, SalesError> {
        let mut attempt = 0;
        loop {
            let outcome = self.try_record_payment(sale_id, amount).await;
            match outcome {
                Err(e) if self.should_retry(&e, attempt) => {
                    debug!(attempt, error = %e, "retrying payment");
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                    attempt += 1;
                }
                Ok(sale) => {
                    info!(sale = %sale.id, state = ?sale.state, remaining = %sale.amount_remaining.amount(), "payment recorded");
                    return Ok(sale);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Reads a sale back from the store
    pub async fn sale(&self, sale_id: SaleId) -> Result<Sale, SalesError> {
        let doc = self
            .store
            .get(collections::SALES, &sale_id.as_uuid().to_string())
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    SalesError::SaleNotFound(sale_id.to_string())
                } else {
                    SalesError::from(e)
                }
            })?;
        Ok(doc.decode()?)
    }

    async fn try_create_sale(
        &self,
        sale: &Sale,
        allocation: Option<&PaymentAllocation>,
    ) -> Result<(), SalesError> {
        let mut operations = vec![AtomicOperation::create(collections::SALES, sale)?];
        if let Some(allocation) = allocation {
            operations.extend(self.allocation_operations(sale.id, allocation).await?);
        }
        self.store.run_atomic(operations).await?;
        Ok(())
    }

    async fn try_record_payment(
        &self,
        sale_id: SaleId,
        amount: Money,
    ) -> Result<Sale, SalesError> {
        let doc = self
            .store
            .get(collections::SALES, &sale_id.as_uuid().to_string())
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    SalesError::SaleNotFound(sale_id.to_string())
                } else {
                    SalesError::from(e)
                }
            })?;
        let mut sale: Sale = doc.decode()?;

        let allocation = sale.record_payment(amount)?;
        validate_sale(&sale)?;

        let mut operations = vec![AtomicOperation::update(
            collections::SALES,
            sale.id.as_uuid(),
            &sale,
            doc.version,
        )?];
        operations.extend(self.allocation_operations(sale.id, &allocation).await?);
        self.store.run_atomic(operations).await?;

        Ok(sale)
    }

    /// Builds the bank updates and movements for one allocation
    ///
    /// Zero portions post nothing: a zero-freight sale produces no freight
    /// movement at all.
    async fn allocation_operations(
        &self,
        sale_id: SaleId,
        allocation: &PaymentAllocation,
    ) -> Result<Vec<AtomicOperation>, SalesError> {
        let portions = [
            (
                BankKind::CostVault,
                allocation.cost_portion,
                MovementCategory::SaleCostShare,
            ),
            (
                BankKind::FreightFund,
                allocation.freight_portion,
                MovementCategory::SaleFreightShare,
            ),
            (
                BankKind::ProfitFund,
                allocation.profit_portion,
                MovementCategory::SaleProfitShare,
            ),
        ];

        let mut operations = Vec::with_capacity(portions.len() * 2);
        for (kind, portion, category) in portions {
            if portion.is_zero() {
                continue;
            }
            let bank_id = kind.id();
            let VersionedBank { mut bank, version } = self.treasury.load_bank(&bank_id).await?;
            bank.credit(portion)?;
            let movement = Movement::inflow(bank_id.clone(), portion, category)?
                .with_reference(MovementReference::Sale(sale_id));

            operations.push(AtomicOperation::update(
                treasury_collections::BANKS,
                &bank_id,
                &bank,
                version,
            )?);
            operations.push(AtomicOperation::create(
                treasury_collections::MOVEMENTS,
                &movement,
            )?);
        }
        Ok(operations)
    }

    fn should_retry(&self, error: &SalesError, attempt: u32) -> bool {
        let store_error = match error {
            SalesError::Store(e) => e,
            SalesError::Treasury(TreasuryError::Store(e)) => e,
            _ => return false,
        };
        self.config.should_retry(store_error, attempt)
    }
}

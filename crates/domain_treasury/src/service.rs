//! Treasury service
//!
//! All treasury mutations run as one atomic batch against the injected
//! document store: the bank counter update (version-pinned) plus the
//! movement records it produces. Version conflicts and transient store
//! failures retry the whole read-compute-write unit, bounded by
//! [`StoreConfig`]; everything else surfaces before anything persists.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use core_kernel::{AtomicOperation, DocumentStore, Money, StoreConfig, StoreError};

use crate::bank::{standard_banks, Bank, BankId, BankKind};
use crate::error::TreasuryError;
use crate::movement::{Movement, MovementCategory, MovementDirection, MovementReference};
use crate::transfer::TransferRecord;

/// Collection names the treasury persists under
pub mod collections {
    pub const BANKS: &str = "banks";
    pub const MOVEMENTS: &str = "movements";
    pub const TRANSFERS: &str = "transfers";
}

/// A bank together with the document version it was read at
///
/// The version pins the optimistic update; if another writer moves the bank
/// first, the batch fails with a conflict and the caller re-reads.
#[derive(Debug, Clone)]
pub struct VersionedBank {
    pub bank: Bank,
    pub version: u64,
}

/// Service for bank reads, postings, transfers, and manual adjustments
pub struct TreasuryService<S> {
    store: Arc<S>,
    config: StoreConfig,
}

impl<S: DocumentStore> TreasuryService<S> {
    /// Creates a service with default retry configuration
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, StoreConfig::default())
    }

    /// Creates a service with explicit retry configuration
    pub fn with_config(store: Arc<S>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// Seeds the fixed bank registry, skipping banks that already exist
    ///
    /// Safe to call at every startup; counters of existing banks are never
    /// touched.
    #[instrument(skip(self))]
    pub async fn initialize_banks(&self) -> Result<(), TreasuryError> {
        for bank in standard_banks() {
            match self.store.get(collections::BANKS, bank.id.as_str()).await {
                Ok(_) => continue,
                Err(e) if e.is_not_found() => {
                    let data = serde_json::to_value(&bank).map_err(StoreError::from)?;
                    self.store.create(collections::BANKS, data).await?;
                    info!(bank = %bank.id, "seeded bank");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Reads a bank's current state
    pub async fn bank(&self, bank_id: &BankId) -> Result<Bank, TreasuryError> {
        Ok(self.load_bank(bank_id).await?.bank)
    }

    /// Derived current balance: inflow minus outflow, may be negative
    pub async fn current_balance(&self, bank_id: &BankId) -> Result<Money, TreasuryError> {
        Ok(self.bank(bank_id).await?.balance())
    }

    /// Reads a bank plus the version to pin its next update against
    pub async fn load_bank(&self, bank_id: &BankId) -> Result<VersionedBank, TreasuryError> {
        let doc = self
            .store
            .get(collections::BANKS, bank_id.as_str())
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    TreasuryError::bank_not_found(bank_id.as_str())
                } else {
                    TreasuryError::from(e)
                }
            })?;
        Ok(VersionedBank {
            bank: doc.decode()?,
            version: doc.version,
        })
    }

    /// Credits a bank: increments its inflow counter and appends a movement
    ///
    /// The amount must be strictly positive.
    pub async fn credit(
        &self,
        bank_id: &BankId,
        amount: Money,
        category: MovementCategory,
        reference: Option<MovementReference>,
        memo: Option<String>,
    ) -> Result<Movement, TreasuryError> {
        self.post(bank_id, amount, MovementDirection::Inflow, category, reference, memo)
            .await
    }

    /// Debits a bank: increments its outflow counter and appends a movement
    ///
    /// No sufficient-funds check happens here; callers that must not
    /// overdraw (transfers) check the balance first.
    pub async fn debit(
        &self,
        bank_id: &BankId,
        amount: Money,
        category: MovementCategory,
        reference: Option<MovementReference>,
        memo: Option<String>,
    ) -> Result<Movement, TreasuryError> {
        self.post(bank_id, amount, MovementDirection::Outflow, category, reference, memo)
            .await
    }

    /// Moves an amount between two distinct banks as one atomic unit
    ///
    /// The source must cover the amount; a rejected transfer leaves both
    /// banks' counters untouched.
    #[instrument(skip(self, amount, memo), fields(amount = %amount.amount()))]
    pub async fn transfer(
        &self,
        source_id: &BankId,
        dest_id: &BankId,
        amount: Money,
        memo: &str,
    ) -> Result<TransferRecord, TreasuryError> {
        if source_id == dest_id {
            return Err(TreasuryError::SameBank(source_id.to_string()));
        }
        if !amount.is_positive() {
            return Err(TreasuryError::invalid_amount(format!(
                "transfer amount must be positive, got {}",
                amount.amount()
            )));
        }
        require_memo(memo, "transfer")?;

        let mut attempt = 0;
        loop {
            match self.try_transfer(source_id, dest_id, amount, memo).await {
                Err(TreasuryError::Store(e)) if self.config.should_retry(&e, attempt) => {
                    debug!(attempt, error = %e, "retrying transfer");
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Records manual income against an operating bank
    ///
    /// Only operating banks take direct deposits; the vaults and funds are
    /// fed exclusively by sale distributions and transfers.
    pub async fn record_deposit(
        &self,
        bank_id: &BankId,
        amount: Money,
        memo: &str,
    ) -> Result<Movement, TreasuryError> {
        require_memo(memo, "deposit")?;
        let kind = BankKind::from_slug(bank_id.as_str())
            .ok_or_else(|| TreasuryError::bank_not_found(bank_id.as_str()))?;
        if !kind.is_operating() {
            return Err(TreasuryError::DepositNotAllowed(bank_id.to_string()));
        }
        self.credit(
            bank_id,
            amount,
            MovementCategory::ManualDeposit,
            None,
            Some(memo.to_string()),
        )
        .await
    }

    /// Records a manual expense against any bank
    ///
    /// Expenses may drive the balance negative.
    pub async fn record_expense(
        &self,
        bank_id: &BankId,
        amount: Money,
        memo: &str,
    ) -> Result<Movement, TreasuryError> {
        require_memo(memo, "expense")?;
        self.debit(
            bank_id,
            amount,
            MovementCategory::ManualExpense,
            None,
            Some(memo.to_string()),
        )
        .await
    }

    #[instrument(skip(self, amount, reference, memo), fields(amount = %amount.amount()))]
    async fn post(
        &self,
        bank_id: &BankId,
        amount: Money,
        direction: MovementDirection,
        category: MovementCategory,
        reference: Option<MovementReference>,
        memo: Option<String>,
    ) -> Result<Movement, TreasuryError> {
        if !amount.is_positive() {
            return Err(TreasuryError::invalid_amount(format!(
                "ledger amount must be positive, got {}",
                amount.amount()
            )));
        }

        let mut attempt = 0;
        loop {
            let outcome = self
                .try_post(bank_id, amount, direction, category, reference, memo.as_deref())
                .await;
            match outcome {
                Err(TreasuryError::Store(e)) if self.config.should_retry(&e, attempt) => {
                    debug!(attempt, error = %e, "retrying posting");
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn try_post(
        &self,
        bank_id: &BankId,
        amount: Money,
        direction: MovementDirection,
        category: MovementCategory,
        reference: Option<MovementReference>,
        memo: Option<&str>,
    ) -> Result<Movement, TreasuryError> {
        let VersionedBank { mut bank, version } = self.load_bank(bank_id).await?;

        let mut movement = match direction {
            MovementDirection::Inflow => {
                bank.credit(amount)?;
                Movement::inflow(bank_id.clone(), amount, category)?
            }
            MovementDirection::Outflow => {
                bank.debit(amount)?;
                Movement::outflow(bank_id.clone(), amount, category)?
            }
        };
        if let Some(memo) = memo {
            movement = movement.with_memo(memo);
        }
        if let Some(reference) = reference {
            movement = movement.with_reference(reference);
        }

        let operations = vec![
            AtomicOperation::update(collections::BANKS, bank_id, &bank, version)?,
            AtomicOperation::create(collections::MOVEMENTS, &movement)?,
        ];
        self.store.run_atomic(operations).await?;

        debug!(bank = %bank_id, category = %category, "movement posted");
        Ok(movement)
    }

    async fn try_transfer(
        &self,
        source_id: &BankId,
        dest_id: &BankId,
        amount: Money,
        memo: &str,
    ) -> Result<TransferRecord, TreasuryError> {
        let VersionedBank {
            bank: mut source,
            version: source_version,
        } = self.load_bank(source_id).await?;
        let VersionedBank {
            bank: mut dest,
            version: dest_version,
        } = self.load_bank(dest_id).await?;

        let source_balance = source.balance();
        let remaining = source_balance.checked_sub(&amount)?;
        if remaining.is_negative() {
            return Err(TreasuryError::InsufficientFunds {
                bank_id: source_id.to_string(),
                balance: source_balance.amount(),
                requested: amount.amount(),
            });
        }
        let dest_balance = dest.balance();

        let record = TransferRecord::new(
            source_id.clone(),
            dest_id.clone(),
            amount,
            memo,
            source_balance,
            dest_balance,
        );
        source.debit(amount)?;
        dest.credit(amount)?;

        let outgoing = Movement::outflow(source_id.clone(), amount, MovementCategory::TransferOut)?
            .with_memo(memo)
            .with_reference(MovementReference::Transfer(record.id));
        let incoming = Movement::inflow(dest_id.clone(), amount, MovementCategory::TransferIn)?
            .with_memo(memo)
            .with_reference(MovementReference::Transfer(record.id));

        let operations = vec![
            AtomicOperation::update(collections::BANKS, source_id, &source, source_version)?,
            AtomicOperation::update(collections::BANKS, dest_id, &dest, dest_version)?,
            AtomicOperation::create(collections::MOVEMENTS, &outgoing)?,
            AtomicOperation::create(collections::MOVEMENTS, &incoming)?,
            AtomicOperation::create(collections::TRANSFERS, &record)?,
        ];
        self.store.run_atomic(operations).await?;

        info!(transfer = %record.id, source = %source_id, dest = %dest_id, "transfer applied");
        Ok(record)
    }
}

fn require_memo(memo: &str, operation: &str) -> Result<(), TreasuryError> {
    if memo.trim().is_empty() {
        return Err(TreasuryError::validation(format!(
            "{operation} memo must not be blank"
        )));
    }
    Ok(())
}

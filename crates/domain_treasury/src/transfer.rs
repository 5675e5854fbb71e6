//! Inter-bank transfers
//!
//! A transfer pairs one outflow on the source bank with one inflow on the
//! destination bank. The pair is applied as a single atomic unit; a rejected
//! transfer leaves both banks' counters untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, TransferId};

use crate::bank::BankId;

/// The persisted record of a completed transfer
///
/// Balance snapshots capture both banks immediately before and after the
/// paired postings, so each transfer documents its own effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Unique identifier, also the document id
    pub id: TransferId,
    /// Bank the amount left
    pub source_bank_id: BankId,
    /// Bank the amount entered
    pub dest_bank_id: BankId,
    /// Transferred amount, strictly positive
    pub amount: Money,
    /// Why the transfer happened
    pub memo: String,
    /// Source balance before the outflow posted
    pub source_balance_before: Money,
    /// Source balance after the outflow posted
    pub source_balance_after: Money,
    /// Destination balance before the inflow posted
    pub dest_balance_before: Money,
    /// Destination balance after the inflow posted
    pub dest_balance_after: Money,
    /// When the transfer was recorded
    pub occurred_at: DateTime<Utc>,
}

impl TransferRecord {
    /// Builds the record from the two banks' pre-transfer balances
    pub fn new(
        source_bank_id: BankId,
        dest_bank_id: BankId,
        amount: Money,
        memo: impl Into<String>,
        source_balance_before: Money,
        dest_balance_before: Money,
    ) -> Self {
        Self {
            id: TransferId::new(),
            source_bank_id,
            dest_bank_id,
            amount,
            memo: memo.into(),
            source_balance_before,
            source_balance_after: source_balance_before - amount,
            dest_balance_before,
            dest_balance_after: dest_balance_before + amount,
            occurred_at: Utc::now(),
        }
    }
}

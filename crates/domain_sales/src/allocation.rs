//! Proportional payment allocation
//!
//! Splits a payment across the sale's three fixed shares in proportion to
//! the payment's size. Cost and freight portions are rounded commercially
//! at two decimals; the profit portion absorbs the remainder, so the three
//! portions always reassemble the payment to the cent.

use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::distribution::SaleDistribution;
use crate::error::SalesError;

/// A payment divided across the three ledger buckets
///
/// `cost_portion + freight_portion + profit_portion` equals the allocated
/// payment exactly, and every portion is non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub cost_portion: Money,
    pub freight_portion: Money,
    pub profit_portion: Money,
}

impl PaymentAllocation {
    /// Sum of the three portions
    pub fn total(&self) -> Money {
        self.cost_portion + self.freight_portion + self.profit_portion
    }
}

/// Allocates a payment proportionally against a sale's split
///
/// The proportion is the full-precision quotient `payment / total`; only
/// the cost and freight portions are rounded. A sub-cent overshoot (both
/// roundings landing on a midpoint) is pulled back from the larger of the
/// two rounded portions, keeping everything non-negative.
pub fn allocate(
    payment_amount: Money,
    split: &SaleDistribution,
) -> Result<PaymentAllocation, SalesError> {
    if !payment_amount.is_positive() {
        return Err(SalesError::invalid_allocation(format!(
            "payment must be positive, got {}",
            payment_amount.amount()
        )));
    }
    if !split.total.is_positive() {
        return Err(SalesError::invalid_allocation(format!(
            "sale total must be positive, got {}",
            split.total.amount()
        )));
    }
    if split.cost_share.is_negative()
        || split.freight_share.is_negative()
        || split.profit_share.is_negative()
    {
        return Err(SalesError::invalid_allocation(
            "sale shares must all be non-negative",
        ));
    }

    let proportion = payment_amount.ratio_to(&split.total)?;
    if payment_amount.amount() > split.total.amount() {
        return Err(SalesError::invalid_allocation(format!(
            "payment {} exceeds sale total {}",
            payment_amount.amount(),
            split.total.amount()
        )));
    }

    let mut cost_portion = split.cost_share.multiply(proportion);
    let mut freight_portion = split.freight_share.multiply(proportion);
    let mut profit_portion = payment_amount
        .checked_sub(&cost_portion)?
        .checked_sub(&freight_portion)?;

    // Rounding can overshoot the payment by at most one cent; take it back
    // from the larger rounded portion so the partition stays non-negative.
    if profit_portion.is_negative() {
        let deficit = profit_portion.abs();
        if cost_portion.amount() >= freight_portion.amount() {
            cost_portion = cost_portion.checked_sub(&deficit)?;
        } else {
            freight_portion = freight_portion.checked_sub(&deficit)?;
        }
        profit_portion = Money::zero(payment_amount.currency());
    }

    Ok(PaymentAllocation {
        cost_portion,
        freight_portion,
        profit_portion,
    })
}

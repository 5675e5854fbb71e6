//! Distribution calculation
//!
//! Splits a sale's total into its three fixed shares at creation time:
//! cost, freight, and profit. The split never changes once computed; every
//! later payment is allocated against it proportionally.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};

use crate::error::SalesError;

/// The fixed three-way split of a sale's total
///
/// `cost_share + freight_share + profit_share == total` holds exactly: the
/// profit share is the residual after cost and freight, never an
/// independently computed figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDistribution {
    pub total: Money,
    pub cost_share: Money,
    pub freight_share: Money,
    pub profit_share: Money,
}

impl SaleDistribution {
    /// Currency shared by all four amounts
    pub fn currency(&self) -> Currency {
        self.total.currency()
    }
}

/// Computes the three-way split for a sale
///
/// `total = quantity x unit_sale_price`, cost and freight scale the same
/// way, and profit is the residual. The profit share may come out negative
/// when unit cost plus freight exceeds the sale price; rejecting such sales
/// is the validation layer's job, not the calculator's.
pub fn distribute(
    quantity: u32,
    unit_sale_price: Money,
    unit_cost_price: Money,
    unit_freight_price: Money,
) -> Result<SaleDistribution, SalesError> {
    if quantity == 0 {
        return Err(SalesError::invalid_input("quantity must be at least 1"));
    }
    if !unit_sale_price.is_positive() {
        return Err(SalesError::invalid_input(format!(
            "unit_sale_price must be positive, got {}",
            unit_sale_price.amount()
        )));
    }
    if unit_cost_price.is_negative() {
        return Err(SalesError::invalid_input(format!(
            "unit_cost_price must not be negative, got {}",
            unit_cost_price.amount()
        )));
    }
    if unit_freight_price.is_negative() {
        return Err(SalesError::invalid_input(format!(
            "unit_freight_price must not be negative, got {}",
            unit_freight_price.amount()
        )));
    }
    let currency = unit_sale_price.currency();
    if unit_cost_price.currency() != currency || unit_freight_price.currency() != currency {
        return Err(SalesError::invalid_input(
            "unit prices must share one currency",
        ));
    }

    let quantity = Decimal::from(quantity);
    let total = unit_sale_price.multiply(quantity);
    let cost_share = unit_cost_price.multiply(quantity);
    let freight_share = unit_freight_price.multiply(quantity);
    let profit_share = total.checked_sub(&cost_share)?.checked_sub(&freight_share)?;

    Ok(SaleDistribution {
        total,
        cost_share,
        freight_share,
        profit_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn mxn(amount: Decimal) -> Money {
        Money::new(amount, Currency::Mxn)
    }

    #[test]
    fn test_distribute_standard_sale() {
        let split = distribute(10, mxn(dec!(10000)), mxn(dec!(6300)), mxn(dec!(500))).unwrap();

        assert_eq!(split.total.amount(), dec!(100000));
        assert_eq!(split.cost_share.amount(), dec!(63000));
        assert_eq!(split.freight_share.amount(), dec!(5000));
        assert_eq!(split.profit_share.amount(), dec!(32000));
    }

    #[test]
    fn test_distribute_zero_freight() {
        let split = distribute(4, mxn(dec!(250)), mxn(dec!(100)), mxn(dec!(0))).unwrap();

        assert_eq!(split.total.amount(), dec!(1000));
        assert!(split.freight_share.is_zero());
        assert_eq!(split.profit_share.amount(), dec!(600));
    }

    #[test]
    fn test_distribute_fractional_prices() {
        let split = distribute(3, mxn(dec!(19.99)), mxn(dec!(12.50)), mxn(dec!(1.25))).unwrap();

        assert_eq!(split.total.amount(), dec!(59.97));
        assert_eq!(split.cost_share.amount(), dec!(37.50));
        assert_eq!(split.freight_share.amount(), dec!(3.75));
        assert_eq!(split.profit_share.amount(), dec!(18.72));
    }

    #[test]
    fn test_distribute_allows_negative_profit() {
        // Unit cost above sale price: the calculator reports the loss,
        // the validation layer rejects it.
        let split = distribute(2, mxn(dec!(100)), mxn(dec!(150)), mxn(dec!(0))).unwrap();
        assert_eq!(split.profit_share.amount(), dec!(-100));
    }

    #[test]
    fn test_distribute_rejects_zero_quantity() {
        let err = distribute(0, mxn(dec!(100)), mxn(dec!(50)), mxn(dec!(5))).unwrap_err();
        assert!(matches!(err, SalesError::InvalidSaleInput(_)));
    }

    #[test]
    fn test_distribute_rejects_non_positive_sale_price() {
        let err = distribute(1, mxn(dec!(0)), mxn(dec!(0)), mxn(dec!(0))).unwrap_err();
        assert!(matches!(err, SalesError::InvalidSaleInput(_)));
    }

    #[test]
    fn test_distribute_rejects_negative_cost_or_freight() {
        let err = distribute(1, mxn(dec!(100)), mxn(dec!(-1)), mxn(dec!(0))).unwrap_err();
        assert!(matches!(err, SalesError::InvalidSaleInput(_)));

        let err = distribute(1, mxn(dec!(100)), mxn(dec!(50)), mxn(dec!(-1))).unwrap_err();
        assert!(matches!(err, SalesError::InvalidSaleInput(_)));
    }

    #[test]
    fn test_distribute_rejects_mixed_currencies() {
        let err = distribute(
            1,
            mxn(dec!(100)),
            Money::new(dec!(50), Currency::Usd),
            mxn(dec!(5)),
        )
        .unwrap_err();
        assert!(matches!(err, SalesError::InvalidSaleInput(_)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn cents(range: std::ops::RangeInclusive<i64>) -> impl Strategy<Value = Money> {
        range.prop_map(|c| Money::from_minor(c, Currency::Mxn))
    }

    proptest! {
        #[test]
        fn distribution_partitions_total_exactly(
            quantity in 1u32..=5000,
            sale in cents(1..=50_000_000),
            cost in cents(0..=80_000_000),
            freight in cents(0..=5_000_000),
        ) {
            let split = distribute(quantity, sale, cost, freight).unwrap();
            let reassembled = split.cost_share + split.freight_share + split.profit_share;
            prop_assert_eq!(reassembled, split.total);
        }

        #[test]
        fn distribution_shares_scale_with_quantity(
            quantity in 1u32..=1000,
            sale in cents(1..=10_000_000),
            cost in cents(0..=10_000_000),
            freight in cents(0..=1_000_000),
        ) {
            let split = distribute(quantity, sale, cost, freight).unwrap();
            let q = Decimal::from(quantity);
            prop_assert_eq!(split.total.amount(), sale.amount() * q);
            prop_assert_eq!(split.cost_share.amount(), cost.amount() * q);
            prop_assert_eq!(split.freight_share.amount(), freight.amount() * q);
        }
    }
}

//! Sale validation
//!
//! Schema-level rules checked before anything persists. `validate_new_sale`
//! screens raw input; `validate_sale` checks a built sale document against
//! its own invariants right before it is written.

use crate::error::SalesError;
use crate::sale::{PaymentState, Sale};
use crate::service::NewSale;

/// Validates raw sale input ahead of the distribution computation
pub fn validate_new_sale(input: &NewSale) -> Result<(), SalesError> {
    if input.quantity == 0 {
        return Err(SalesError::invalid_input("quantity must be at least 1"));
    }
    if !input.unit_sale_price.is_positive() {
        return Err(SalesError::invalid_input(format!(
            "unit_sale_price must be positive, got {}",
            input.unit_sale_price.amount()
        )));
    }
    if input.unit_cost_price.is_negative() {
        return Err(SalesError::invalid_input(format!(
            "unit_cost_price must not be negative, got {}",
            input.unit_cost_price.amount()
        )));
    }

    let currency = input.unit_sale_price.currency();
    if input.unit_cost_price.currency() != currency {
        return Err(SalesError::invalid_input(
            "unit_cost_price currency must match unit_sale_price",
        ));
    }
    // No-loss rule: selling at or below unit cost is rejected outright.
    if input.unit_sale_price.amount() <= input.unit_cost_price.amount() {
        return Err(SalesError::invalid_input(format!(
            "unit_sale_price {} must exceed unit_cost_price {}",
            input.unit_sale_price.amount(),
            input.unit_cost_price.amount()
        )));
    }

    if let Some(freight) = input.unit_freight_price {
        if freight.is_negative() {
            return Err(SalesError::invalid_input(format!(
                "unit_freight_price must not be negative, got {}",
                freight.amount()
            )));
        }
        if freight.currency() != currency {
            return Err(SalesError::invalid_input(
                "unit_freight_price currency must match unit_sale_price",
            ));
        }
    }

    if let Some(payment) = input.initial_payment {
        if payment.is_negative() {
            return Err(SalesError::invalid_input(format!(
                "initial_payment must not be negative, got {}",
                payment.amount()
            )));
        }
        if payment.currency() != currency {
            return Err(SalesError::invalid_input(
                "initial_payment currency must match unit_sale_price",
            ));
        }
    }

    Ok(())
}

/// Validates a sale document's invariants before it is written
pub fn validate_sale(sale: &Sale) -> Result<(), SalesError> {
    if sale.quantity == 0 {
        return Err(SalesError::invalid_input("quantity must be at least 1"));
    }
    if !sale.unit_sale_price.is_positive() {
        return Err(SalesError::invalid_input("unit_sale_price must be positive"));
    }
    if sale.unit_sale_price.amount() <= sale.unit_cost_price.amount() {
        return Err(SalesError::invalid_input(
            "unit_sale_price must exceed unit_cost_price",
        ));
    }

    // Freight can push the profit share negative even when the no-loss rule
    // passes on the unit prices alone.
    if sale.cost_share.is_negative()
        || sale.freight_share.is_negative()
        || sale.profit_share.is_negative()
    {
        return Err(SalesError::invalid_input(format!(
            "sale shares must all be non-negative (cost {}, freight {}, profit {})",
            sale.cost_share.amount(),
            sale.freight_share.amount(),
            sale.profit_share.amount()
        )));
    }

    let reassembled = sale
        .cost_share
        .checked_add(&sale.freight_share)?
        .checked_add(&sale.profit_share)?;
    if reassembled != sale.total {
        return Err(SalesError::invalid_input(format!(
            "shares sum to {} but the total is {}",
            reassembled.amount(),
            sale.total.amount()
        )));
    }

    if sale.amount_paid.is_negative() || sale.amount_remaining.is_negative() {
        return Err(SalesError::invalid_input(
            "amount_paid and amount_remaining must not be negative",
        ));
    }
    let position = sale.amount_paid.checked_add(&sale.amount_remaining)?;
    if position != sale.total {
        return Err(SalesError::invalid_input(format!(
            "amount_paid {} plus amount_remaining {} must equal the total {}",
            sale.amount_paid.amount(),
            sale.amount_remaining.amount(),
            sale.total.amount()
        )));
    }

    let expected = PaymentState::from_amounts(&sale.amount_paid, &sale.total);
    if sale.state != expected {
        return Err(SalesError::invalid_input(format!(
            "state {:?} does not match the amounts (expected {:?})",
            sale.state, expected
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, Money};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn mxn(amount: Decimal) -> Money {
        Money::new(amount, Currency::Mxn)
    }

    fn valid_input() -> NewSale {
        NewSale {
            client_id: None,
            quantity: 10,
            unit_sale_price: mxn(dec!(10000)),
            unit_cost_price: mxn(dec!(6300)),
            unit_freight_price: Some(mxn(dec!(500))),
            initial_payment: None,
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate_new_sale(&valid_input()).is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let input = NewSale {
            quantity: 0,
            ..valid_input()
        };
        assert!(matches!(
            validate_new_sale(&input).unwrap_err(),
            SalesError::InvalidSaleInput(_)
        ));
    }

    #[test]
    fn test_no_loss_rule_rejects_sale_at_or_below_cost() {
        let at_cost = NewSale {
            unit_sale_price: mxn(dec!(6300)),
            ..valid_input()
        };
        assert!(validate_new_sale(&at_cost).is_err());

        let below_cost = NewSale {
            unit_sale_price: mxn(dec!(6000)),
            ..valid_input()
        };
        assert!(validate_new_sale(&below_cost).is_err());
    }

    #[test]
    fn test_negative_freight_rejected() {
        let input = NewSale {
            unit_freight_price: Some(mxn(dec!(-1))),
            ..valid_input()
        };
        assert!(validate_new_sale(&input).is_err());
    }

    #[test]
    fn test_negative_initial_payment_rejected() {
        let input = NewSale {
            initial_payment: Some(mxn(dec!(-100))),
            ..valid_input()
        };
        assert!(validate_new_sale(&input).is_err());
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let input = NewSale {
            unit_cost_price: Money::new(dec!(6300), Currency::Usd),
            ..valid_input()
        };
        assert!(validate_new_sale(&input).is_err());
    }

    #[test]
    fn test_consistent_sale_document_passes() {
        let mut sale =
            Sale::new(None, 10, mxn(dec!(10000)), mxn(dec!(6300)), mxn(dec!(500))).unwrap();
        assert!(validate_sale(&sale).is_ok());

        sale.record_payment(mxn(dec!(40000))).unwrap();
        assert!(validate_sale(&sale).is_ok());
    }

    #[test]
    fn test_freight_driven_loss_caught_at_document_level() {
        // Passes the unit-level no-loss rule, but freight pushes the
        // profit share negative.
        let sale = Sale::new(None, 2, mxn(dec!(100)), mxn(dec!(99)), mxn(dec!(5))).unwrap();
        assert!(matches!(
            validate_sale(&sale).unwrap_err(),
            SalesError::InvalidSaleInput(_)
        ));
    }

    #[test]
    fn test_tampered_state_detected() {
        let mut sale =
            Sale::new(None, 1, mxn(dec!(100)), mxn(dec!(60)), mxn(dec!(0))).unwrap();
        sale.state = PaymentState::Complete;
        assert!(validate_sale(&sale).is_err());
    }

    #[test]
    fn test_tampered_amounts_detected() {
        let mut sale =
            Sale::new(None, 1, mxn(dec!(100)), mxn(dec!(60)), mxn(dec!(0))).unwrap();
        sale.amount_remaining = mxn(dec!(50));
        assert!(validate_sale(&sale).is_err());
    }
}

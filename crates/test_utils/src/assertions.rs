//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_sales::{PaymentState, Sale};

/// Asserts that two Money values are exactly equal
///
/// # Panics
///
/// Panics if the currencies or the amounts differ
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Money amounts differ: actual={}, expected={}",
        actual.amount(),
        expected.amount()
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is negative
pub fn assert_money_negative(money: &Money) {
    assert!(
        money.is_negative(),
        "Expected negative money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that money values sum to a total
///
/// # Panics
///
/// Panics if the sum doesn't equal the total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = parts.iter().fold(Money::zero(total.currency()), |acc, m| {
        acc.checked_add(m).expect("Currency mismatch in sum")
    });

    assert_eq!(
        sum.amount(),
        total.amount(),
        "Sum of parts ({}) doesn't equal total ({})",
        sum.amount(),
        total.amount()
    );
}

/// Asserts that a sale's stored amounts are internally consistent
///
/// Checks that the three shares partition the total, that paid plus
/// remaining equals the total, and that the stored state matches the
/// amounts.
pub fn assert_sale_position(sale: &Sale) {
    assert_money_sum_equals(
        &[sale.cost_share, sale.freight_share, sale.profit_share],
        &sale.total,
    );

    let position = sale
        .amount_paid
        .checked_add(&sale.amount_remaining)
        .expect("Currency mismatch in sale position");
    assert_eq!(
        position.amount(),
        sale.total.amount(),
        "Paid ({}) plus remaining ({}) doesn't equal total ({})",
        sale.amount_paid.amount(),
        sale.amount_remaining.amount(),
        sale.total.amount()
    );

    let expected_state = PaymentState::from_amounts(&sale.amount_paid, &sale.total);
    assert_eq!(
        sale.state, expected_state,
        "Sale state {:?} doesn't match its amounts (expected {:?})",
        sale.state, expected_state
    );
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!(
                "Expected Err matching {}, got Ok({:?})",
                stringify!($pattern),
                value
            ),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn mxn(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::Mxn)
    }

    #[test]
    fn test_assert_money_eq_passes() {
        assert_money_eq(&mxn(dec!(100.00)), &mxn(dec!(100)));
    }

    #[test]
    #[should_panic(expected = "Currency mismatch")]
    fn test_assert_money_eq_currency_mismatch() {
        let usd = Money::new(dec!(100.00), Currency::Usd);
        assert_money_eq(&mxn(dec!(100.00)), &usd);
    }

    #[test]
    fn test_assert_money_signs() {
        assert_money_positive(&mxn(dec!(100.00)));
        assert_money_negative(&mxn(dec!(-0.01)));
        assert_money_zero(&Money::zero(Currency::Mxn));
    }

    #[test]
    #[should_panic(expected = "Expected positive money")]
    fn test_assert_money_positive_fails_for_zero() {
        assert_money_positive(&Money::zero(Currency::Mxn));
    }

    #[test]
    fn test_assert_money_sum_equals() {
        let parts = vec![mxn(dec!(33.34)), mxn(dec!(33.33)), mxn(dec!(33.33))];
        assert_money_sum_equals(&parts, &mxn(dec!(100.00)));
    }

    #[test]
    fn test_assert_sale_position_on_fresh_sale() {
        let sale = Sale::new(None, 10, mxn(dec!(10000)), mxn(dec!(6300)), mxn(dec!(500))).unwrap();
        assert_sale_position(&sale);
    }

    #[test]
    #[should_panic(expected = "doesn't match its amounts")]
    fn test_assert_sale_position_catches_stale_state() {
        let mut sale =
            Sale::new(None, 10, mxn(dec!(10000)), mxn(dec!(6300)), mxn(dec!(500))).unwrap();
        sale.record_payment(mxn(dec!(50000))).unwrap();
        sale.state = PaymentState::Pending;
        assert_sale_position(&sale);
    }

    #[test]
    fn test_assert_ok_returns_value() {
        let result: Result<u32, String> = Ok(7);
        assert_eq!(assert_ok!(result), 7);
    }

    #[test]
    fn test_assert_err_returns_error() {
        let result: Result<u32, String> = Err("boom".to_string());
        assert_eq!(assert_err!(result), "boom");
    }
}

//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use rust_decimal::Decimal;

use core_kernel::{ClientId, Money};
use domain_sales::NewSale;

use crate::fixtures::MoneyFixtures;

/// Builder for constructing sale requests
///
/// Defaults describe the canonical worked example: 10 units at $10,000
/// against $6,300 cost and $500 freight, no client, no initial payment.
pub struct SaleRequestBuilder {
    client_id: Option<ClientId>,
    quantity: u32,
    unit_sale_price: Money,
    unit_cost_price: Money,
    unit_freight_price: Option<Money>,
    initial_payment: Option<Money>,
}

impl Default for SaleRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SaleRequestBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            client_id: None,
            quantity: 10,
            unit_sale_price: MoneyFixtures::unit_sale_price(),
            unit_cost_price: MoneyFixtures::unit_cost_price(),
            unit_freight_price: Some(MoneyFixtures::unit_freight_price()),
            initial_payment: None,
        }
    }

    /// Sets the client
    pub fn with_client(mut self, id: ClientId) -> Self {
        self.client_id = Some(id);
        self
    }

    /// Sets the quantity
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the unit sale price
    pub fn with_unit_sale_price(mut self, price: Money) -> Self {
        self.unit_sale_price = price;
        self
    }

    /// Sets the unit cost price
    pub fn with_unit_cost_price(mut self, price: Money) -> Self {
        self.unit_cost_price = price;
        self
    }

    /// Sets an explicit unit freight price
    pub fn with_unit_freight_price(mut self, price: Money) -> Self {
        self.unit_freight_price = Some(price);
        self
    }

    /// Omits the freight price so the service applies its default
    pub fn without_freight(mut self) -> Self {
        self.unit_freight_price = None;
        self
    }

    /// Sets the freight price to zero
    pub fn with_zero_freight(self) -> Self {
        let currency = self.unit_sale_price.currency();
        self.with_unit_freight_price(Money::zero(currency))
    }

    /// Sets an initial payment applied at creation
    pub fn with_initial_payment(mut self, amount: Money) -> Self {
        self.initial_payment = Some(amount);
        self
    }

    /// Sets the initial payment to the full sale total, computed from the
    /// quantity and sale price currently on the builder
    pub fn paid_in_full(self) -> Self {
        let total = self.unit_sale_price.multiply(Decimal::from(self.quantity));
        self.with_initial_payment(total)
    }

    /// Builds the sale request
    pub fn build(self) -> NewSale {
        NewSale {
            client_id: self.client_id,
            quantity: self.quantity,
            unit_sale_price: self.unit_sale_price,
            unit_cost_price: self.unit_cost_price,
            unit_freight_price: self.unit_freight_price,
            initial_payment: self.initial_payment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_sales::validate_new_sale;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_defaults_pass_validation() {
        let request = SaleRequestBuilder::new().build();
        assert_eq!(request.quantity, 10);
        assert!(validate_new_sale(&request).is_ok());
    }

    #[test]
    fn test_builder_customization() {
        let request = SaleRequestBuilder::new()
            .with_quantity(3)
            .with_unit_sale_price(MoneyFixtures::mxn(dec!(19.99)))
            .with_unit_cost_price(MoneyFixtures::mxn(dec!(12.50)))
            .without_freight()
            .build();

        assert_eq!(request.quantity, 3);
        assert!(request.unit_freight_price.is_none());
    }

    #[test]
    fn test_paid_in_full_matches_total() {
        let request = SaleRequestBuilder::new()
            .with_quantity(4)
            .paid_in_full()
            .build();

        assert_eq!(request.initial_payment.unwrap().amount(), dec!(40000));
    }
}

//! A single line of an order.

use serde::Serialize;

use super::{Money, OrderError, ProductSnapshot};

/// An item in an order.
///
/// The line total is derived and kept in sync on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    product: ProductSnapshot,
    quantity: u32,
    unit_price: Money,
    addons_value: Money,
    note: Option<String>,
    line_total: Money,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(
        product: ProductSnapshot,
        quantity: u32,
        unit_price: Money,
        addons_value: Money,
        note: Option<String>,
    ) -> Result<Self, OrderError> {
        let line_total = validate(quantity, unit_price, addons_value)?;

        Ok(Self {
            product,
            quantity,
            unit_price,
            addons_value,
            note,
            line_total,
        })
    }

    /// Replaces the mutable fields and recomputes the line total.
    ///
    /// On error the item is left untouched.
    pub fn update(
        &mut self,
        quantity: u32,
        unit_price: Money,
        addons_value: Money,
        note: Option<String>,
    ) -> Result<(), OrderError> {
        let line_total = validate(quantity, unit_price, addons_value)?;

        self.quantity = quantity;
        self.unit_price = unit_price;
        self.addons_value = addons_value;
        self.note = note;
        self.line_total = line_total;
        Ok(())
    }

    pub fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    pub fn product_id(&self) -> &str {
        self.product.id()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn addons_value(&self) -> Money {
        self.addons_value
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns quantity × unit price + add-ons value.
    pub fn line_total(&self) -> Money {
        self.line_total
    }
}

/// Validates the inputs and returns the line total.
fn validate(quantity: u32, unit_price: Money, addons_value: Money) -> Result<Money, OrderError> {
    if quantity == 0 {
        return Err(OrderError::InvalidQuantity { quantity });
    }
    if unit_price.is_negative() {
        return Err(OrderError::NegativeAmount {
            field: "unit price",
            amount: unit_price,
        });
    }
    if addons_value.is_negative() {
        return Err(OrderError::NegativeAmount {
            field: "addons value",
            amount: addons_value,
        });
    }

    unit_price
        .checked_multiply(quantity)
        .and_then(|subtotal| subtotal.checked_add(addons_value))
        .ok_or(OrderError::AmountOverflow {
            field: "line total",
        })
}

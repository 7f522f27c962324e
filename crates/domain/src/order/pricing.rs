//! Order pricing.
//!
//! ```text
//! items_subtotal = Σ line_total
//! discount       = 0                                              (no coupon)
//!                  round(10% × (items_subtotal + delivery_fee))   (coupon present)
//! total          = max(0, items_subtotal + delivery_fee − discount)
//! ```

use serde::Serialize;

use super::{Coupon, Money, OrderError, OrderItem};

/// Percentage taken off `items_subtotal + delivery_fee` when a coupon is present.
pub const COUPON_DISCOUNT_PERCENT: i64 = 10;

/// Monetary summary of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PriceBreakdown {
    pub items_subtotal: Money,
    pub delivery_fee: Money,
    pub discount: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// Computes the breakdown for a set of items, a delivery fee and an optional coupon.
    ///
    /// Fails with [`OrderError::AmountOverflow`] when a sum leaves the `i64` cent range.
    pub fn calculate(
        items: &[OrderItem],
        delivery_fee: Money,
        coupon: Option<&Coupon>,
    ) -> Result<Self, OrderError> {
        let items_subtotal = Money::checked_sum(items.iter().map(OrderItem::line_total))
            .ok_or(OrderError::AmountOverflow {
                field: "items subtotal",
            })?;
        let base = items_subtotal
            .checked_add(delivery_fee)
            .ok_or(OrderError::AmountOverflow {
                field: "order total",
            })?;

        let discount = match coupon {
            Some(coupon) if !coupon.code().is_empty() => base
                .percent(COUPON_DISCOUNT_PERCENT)
                .ok_or(OrderError::AmountOverflow { field: "discount" })?,
            _ => Money::zero(),
        };
        let total = base
            .checked_sub(discount)
            .ok_or(OrderError::AmountOverflow {
                field: "order total",
            })?;

        Ok(Self {
            items_subtotal,
            delivery_fee,
            discount,
            total: total.max_zero(),
        })
    }
}

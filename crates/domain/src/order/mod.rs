//! Order aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod item;
pub mod pricing;
mod service;
mod status;
mod value_objects;

pub use aggregate::{Order, OrderChange, OrderDetails};
pub use commands::*;
pub use events::{ItemRemovedData, OrderEvent, OrderEventData, OrderSummary, StatusChangedData};
pub use item::OrderItem;
pub use pricing::PriceBreakdown;
pub use service::OrderService;
pub use status::{OrderStatus, OrderType};
pub use value_objects::{Coupon, CustomerSnapshot, Money, ProductSnapshot, RestaurantSnapshot};

use common::{ErrorKind, Version};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// A required field is missing or blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// A monetary input is below zero.
    #[error("{field} must be non-negative (got {amount})")]
    NegativeAmount { field: &'static str, amount: Money },

    /// A monetary amount does not fit in the supported range.
    #[error("{field} exceeds the supported amount")]
    AmountOverflow { field: &'static str },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Order has no items.
    #[error("Order must contain at least one item")]
    NoItems,

    /// Stored version is negative.
    #[error("Version must be non-negative (got {version})")]
    NegativeVersion { version: Version },

    /// Target status is not reachable from the current status.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Removing the item would leave the order empty.
    #[error("Order cannot have zero items")]
    LastItem,

    /// No item matches the product.
    #[error("Item not found for product {product_id}")]
    ItemNotFound { product_id: String },

    /// Order is in a terminal status.
    #[error("{status} orders cannot be modified")]
    NotModifiable { status: OrderStatus },

    /// Delivered orders cannot be cancelled.
    #[error("Delivered orders cannot be cancelled")]
    CannotCancelDelivered,
}

impl OrderError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::Required(_)
            | OrderError::NegativeAmount { .. }
            | OrderError::AmountOverflow { .. }
            | OrderError::InvalidQuantity { .. }
            | OrderError::NoItems
            | OrderError::NegativeVersion { .. } => ErrorKind::Validation,
            OrderError::InvalidStatusTransition { .. }
            | OrderError::LastItem
            | OrderError::ItemNotFound { .. }
            | OrderError::NotModifiable { .. }
            | OrderError::CannotCancelDelivered => ErrorKind::BusinessRule,
        }
    }
}

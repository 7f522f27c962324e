//! Order commands.

use common::{OrderId, Version};

use crate::command::Command;

use super::{
    Coupon, CustomerSnapshot, Money, OrderDetails, OrderItem, OrderStatus, OrderType,
    RestaurantSnapshot,
};

/// Command to place a new order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The fields of the new order.
    pub details: OrderDetails,
}

impl CreateOrder {
    /// Creates a new CreateOrder command.
    pub fn new(details: OrderDetails) -> Self {
        Self { details }
    }
}

/// Command to overwrite the caller-editable fields of an order.
///
/// The id, code, placement time and status of the stored order are kept.
#[derive(Debug, Clone)]
pub struct ReplaceOrder {
    pub order_id: OrderId,
    pub expected_version: Version,
    pub customer: CustomerSnapshot,
    pub restaurant: RestaurantSnapshot,
    pub order_type: OrderType,
    pub delivery_fee: Money,
    pub items: Vec<OrderItem>,
    pub coupon: Option<Coupon>,
}

impl Command for ReplaceOrder {
    fn order_id(&self) -> OrderId {
        self.order_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

/// Command to move an order to another status.
#[derive(Debug, Clone)]
pub struct ChangeStatus {
    /// The order to update.
    pub order_id: OrderId,

    /// The version the caller last read.
    pub expected_version: Version,

    /// The target status.
    pub status: OrderStatus,
}

impl ChangeStatus {
    /// Creates a new ChangeStatus command.
    pub fn new(order_id: OrderId, expected_version: Version, status: OrderStatus) -> Self {
        Self {
            order_id,
            expected_version,
            status,
        }
    }
}

impl Command for ChangeStatus {
    fn order_id(&self) -> OrderId {
        self.order_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

/// Command to cancel an order.
#[derive(Debug, Clone)]
pub struct CancelOrder {
    /// The order to cancel.
    pub order_id: OrderId,

    /// The version the caller last read.
    pub expected_version: Version,
}

impl CancelOrder {
    /// Creates a new CancelOrder command.
    pub fn new(order_id: OrderId, expected_version: Version) -> Self {
        Self {
            order_id,
            expected_version,
        }
    }
}

impl Command for CancelOrder {
    fn order_id(&self) -> OrderId {
        self.order_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

/// Command to add an item to an order.
#[derive(Debug, Clone)]
pub struct AddItem {
    /// The order to add the item to.
    pub order_id: OrderId,

    /// The version the caller last read.
    pub expected_version: Version,

    /// The item to add.
    pub item: OrderItem,
}

impl AddItem {
    /// Creates a new AddItem command.
    pub fn new(order_id: OrderId, expected_version: Version, item: OrderItem) -> Self {
        Self {
            order_id,
            expected_version,
            item,
        }
    }
}

impl Command for AddItem {
    fn order_id(&self) -> OrderId {
        self.order_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

/// Command to remove an item from an order.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    /// The order to remove the item from.
    pub order_id: OrderId,

    /// The version the caller last read.
    pub expected_version: Version,

    /// The product whose first line is removed.
    pub product_id: String,
}

impl RemoveItem {
    /// Creates a new RemoveItem command.
    pub fn new(order_id: OrderId, expected_version: Version, product_id: impl Into<String>) -> Self {
        Self {
            order_id,
            expected_version,
            product_id: product_id.into(),
        }
    }
}

impl Command for RemoveItem {
    fn order_id(&self) -> OrderId {
        self.order_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

/// Command to attach a coupon to an order.
#[derive(Debug, Clone)]
pub struct ApplyCoupon {
    pub order_id: OrderId,
    pub expected_version: Version,
    pub coupon: Coupon,
}

impl ApplyCoupon {
    /// Creates a new ApplyCoupon command.
    pub fn new(order_id: OrderId, expected_version: Version, coupon: Coupon) -> Self {
        Self {
            order_id,
            expected_version,
            coupon,
        }
    }
}

impl Command for ApplyCoupon {
    fn order_id(&self) -> OrderId {
        self.order_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

/// Command to change the delivery fee of an order.
#[derive(Debug, Clone)]
pub struct UpdateDeliveryFee {
    pub order_id: OrderId,
    pub expected_version: Version,
    pub delivery_fee: Money,
}

impl UpdateDeliveryFee {
    /// Creates a new UpdateDeliveryFee command.
    pub fn new(order_id: OrderId, expected_version: Version, delivery_fee: Money) -> Self {
        Self {
            order_id,
            expected_version,
            delivery_fee,
        }
    }
}

impl Command for UpdateDeliveryFee {
    fn order_id(&self) -> OrderId {
        self.order_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

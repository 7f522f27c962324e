//! Order domain events.
//!
//! Events are in-memory notifications returned alongside the new order
//! state. They are not a durable log.

use chrono::{DateTime, Utc};
use common::{OrderId, Version};
use serde::Serialize;

use crate::aggregate::DomainEvent;

use super::{
    CustomerSnapshot, Money, Order, OrderStatus, OrderType, ProductSnapshot, RestaurantSnapshot,
};

/// Events that can occur on an order aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was created.
    OrderCreated(OrderEventData),

    /// Order changed in some way.
    OrderUpdated(OrderEventData),

    /// Item was removed from the order.
    ItemRemoved(ItemRemovedData),

    /// Order moved from one status to another.
    StatusChanged(StatusChangedData),

    /// Order reached the Confirmed status.
    OrderConfirmed(OrderEventData),

    /// Order was cancelled.
    OrderCancelled(OrderEventData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "OrderCreated",
            OrderEvent::OrderUpdated(_) => "OrderUpdated",
            OrderEvent::ItemRemoved(_) => "ItemRemoved",
            OrderEvent::StatusChanged(_) => "StatusChanged",
            OrderEvent::OrderConfirmed(_) => "OrderConfirmed",
            OrderEvent::OrderCancelled(_) => "OrderCancelled",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.summary_and_time().1
    }
}

impl OrderEvent {
    /// Returns the order state captured when the event was raised.
    pub fn summary(&self) -> &OrderSummary {
        self.summary_and_time().0
    }

    fn summary_and_time(&self) -> (&OrderSummary, DateTime<Utc>) {
        match self {
            OrderEvent::OrderCreated(data)
            | OrderEvent::OrderUpdated(data)
            | OrderEvent::OrderConfirmed(data)
            | OrderEvent::OrderCancelled(data) => (&data.summary, data.occurred_at),
            OrderEvent::ItemRemoved(data) => (&data.summary, data.occurred_at),
            OrderEvent::StatusChanged(data) => (&data.summary, data.occurred_at),
        }
    }
}

/// The order fields captured in every event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub order_code: String,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub order_total: Money,
    pub version: Version,
    pub customer: CustomerSnapshot,
    pub restaurant: RestaurantSnapshot,
}

impl OrderSummary {
    pub fn of(order: &Order) -> Self {
        Self {
            order_id: order.id(),
            order_code: order.code().to_string(),
            status: order.status(),
            order_type: order.order_type(),
            order_total: order.order_total(),
            version: order.version(),
            customer: order.customer().clone(),
            restaurant: order.restaurant().clone(),
        }
    }
}

/// Data for events that only carry the order summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderEventData {
    pub summary: OrderSummary,
    pub occurred_at: DateTime<Utc>,
}

/// Data for ItemRemoved event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRemovedData {
    pub summary: OrderSummary,

    /// The product whose line was removed.
    pub product: ProductSnapshot,

    pub occurred_at: DateTime<Utc>,
}

/// Data for StatusChanged event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChangedData {
    pub summary: OrderSummary,
    pub previous_status: OrderStatus,
    pub current_status: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl OrderEvent {
    /// Creates an OrderCreated event.
    pub fn order_created(order: &Order) -> Self {
        OrderEvent::OrderCreated(OrderEventData::now(order))
    }

    /// Creates an OrderUpdated event.
    pub fn order_updated(order: &Order) -> Self {
        OrderEvent::OrderUpdated(OrderEventData::now(order))
    }

    /// Creates an ItemRemoved event.
    pub fn item_removed(order: &Order, product: ProductSnapshot) -> Self {
        OrderEvent::ItemRemoved(ItemRemovedData {
            summary: OrderSummary::of(order),
            product,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a StatusChanged event.
    pub fn status_changed(order: &Order, previous_status: OrderStatus) -> Self {
        OrderEvent::StatusChanged(StatusChangedData {
            summary: OrderSummary::of(order),
            previous_status,
            current_status: order.status(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates an OrderConfirmed event.
    pub fn order_confirmed(order: &Order) -> Self {
        OrderEvent::OrderConfirmed(OrderEventData::now(order))
    }

    /// Creates an OrderCancelled event.
    pub fn order_cancelled(order: &Order) -> Self {
        OrderEvent::OrderCancelled(OrderEventData::now(order))
    }
}

impl OrderEventData {
    fn now(order: &Order) -> Self {
        Self {
            summary: OrderSummary::of(order),
            occurred_at: Utc::now(),
        }
    }
}

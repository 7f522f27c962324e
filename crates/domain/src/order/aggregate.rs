//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, Version};
use serde::Serialize;

use crate::aggregate::Change;

use super::{
    Coupon, CustomerSnapshot, Money, OrderError, OrderEvent, OrderItem, OrderStatus, OrderType,
    PriceBreakdown, RestaurantSnapshot,
};

/// Outcome of a mutating order operation: the new order plus its events.
pub type OrderChange = Change<Order, OrderEvent>;

/// The caller-supplied fields of an order, shared by creation and rehydration.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub customer: CustomerSnapshot,
    pub restaurant: RestaurantSnapshot,
    pub order_type: OrderType,
    pub delivery_fee: Money,
    pub items: Vec<OrderItem>,
    pub coupon: Option<Coupon>,
}

impl OrderDetails {
    fn validate(mut self) -> Result<Self, OrderError> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(OrderError::Required("order code"));
        }
        self.code = code.to_string();

        if self.delivery_fee.is_negative() {
            return Err(OrderError::NegativeAmount {
                field: "delivery fee",
                amount: self.delivery_fee,
            });
        }

        // An order must always carry at least one item.
        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        Ok(self)
    }
}

/// Order aggregate root.
///
/// Represents a food order from placement to delivery or cancellation.
/// Every operation takes `&self` and returns an [`OrderChange`]; a failed
/// operation leaves nothing behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    id: OrderId,
    code: String,
    created_at: DateTime<Utc>,
    customer: CustomerSnapshot,
    restaurant: RestaurantSnapshot,
    order_type: OrderType,
    delivery_fee: Money,
    coupon: Option<Coupon>,
    items: Vec<OrderItem>,
    status: OrderStatus,

    /// Current version for optimistic concurrency.
    version: Version,

    pricing: PriceBreakdown,
}

// Construction
impl Order {
    /// Places a new order: fresh id, status Pending, version 0.
    pub fn create(details: OrderDetails) -> Result<OrderChange, OrderError> {
        let details = details.validate()?;
        let order = Self::assemble(
            OrderId::new(),
            details,
            OrderStatus::Pending,
            Version::initial(),
        )?;

        let events = vec![OrderEvent::order_created(&order)];
        Ok(Change::new(order, events))
    }

    /// Rebuilds an order loaded from storage. Raises no events.
    pub fn rehydrate(
        id: OrderId,
        details: OrderDetails,
        status: OrderStatus,
        version: Version,
    ) -> Result<Self, OrderError> {
        if id.is_nil() {
            return Err(OrderError::Required("order id"));
        }
        if !version.is_valid() {
            return Err(OrderError::NegativeVersion { version });
        }
        let details = details.validate()?;

        Self::assemble(id, details, status, version)
    }

    fn assemble(
        id: OrderId,
        details: OrderDetails,
        status: OrderStatus,
        version: Version,
    ) -> Result<Self, OrderError> {
        let pricing = PriceBreakdown::calculate(
            &details.items,
            details.delivery_fee,
            details.coupon.as_ref(),
        )?;

        Ok(Self {
            id,
            code: details.code,
            created_at: details.created_at,
            customer: details.customer,
            restaurant: details.restaurant,
            order_type: details.order_type,
            delivery_fee: details.delivery_fee,
            coupon: details.coupon,
            items: details.items,
            status,
            version,
            pricing,
        })
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn customer(&self) -> &CustomerSnapshot {
        &self.customer
    }

    pub fn restaurant(&self) -> &RestaurantSnapshot {
        &self.restaurant
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn delivery_fee(&self) -> Money {
        self.delivery_fee
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon.as_ref().map(Coupon::code)
    }

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn pricing(&self) -> &PriceBreakdown {
        &self.pricing
    }

    pub fn items_subtotal(&self) -> Money {
        self.pricing.items_subtotal
    }

    pub fn discount_value(&self) -> Money {
        self.pricing.discount
    }

    pub fn order_total(&self) -> Money {
        self.pricing.total
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods (return the new state and its events)
impl Order {
    /// Appends an item.
    pub fn add_item(&self, item: OrderItem) -> Result<OrderChange, OrderError> {
        self.ensure_modifiable()?;

        let order = self.committed(|order| order.items.push(item))?;
        let events = vec![OrderEvent::order_updated(&order)];
        Ok(Change::new(order, events))
    }

    /// Removes the first item whose product matches `product_id`.
    ///
    /// Fails when the order holds a single item, since an order may never be
    /// left without items.
    pub fn remove_item_by_product_id(&self, product_id: &str) -> Result<OrderChange, OrderError> {
        if product_id.trim().is_empty() {
            return Err(OrderError::Required("product id"));
        }
        self.ensure_modifiable()?;

        let position = self
            .items
            .iter()
            .position(|item| item.product_id() == product_id);

        let position = match position {
            Some(_) if self.items.len() == 1 => return Err(OrderError::LastItem),
            Some(position) => position,
            None => {
                return Err(OrderError::ItemNotFound {
                    product_id: product_id.to_string(),
                });
            }
        };

        let removed = self.items[position].product().clone();
        let order = self.committed(|order| {
            order.items.remove(position);
        })?;

        let events = vec![
            OrderEvent::item_removed(&order, removed),
            OrderEvent::order_updated(&order),
        ];
        Ok(Change::new(order, events))
    }

    /// Attaches a coupon, replacing any previous one.
    pub fn apply_coupon(&self, coupon: Coupon) -> Result<OrderChange, OrderError> {
        self.ensure_modifiable()?;

        let order = self.committed(|order| order.coupon = Some(coupon))?;
        let events = vec![OrderEvent::order_updated(&order)];
        Ok(Change::new(order, events))
    }

    /// Moves the order to `new_status` following the transition table.
    ///
    /// Moving to the current status is a no-op.
    pub fn change_status(&self, new_status: OrderStatus) -> Result<OrderChange, OrderError> {
        if new_status == self.status {
            return Ok(Change::unchanged(self.clone()));
        }

        if !self.status.can_transition_to(new_status) {
            return Err(OrderError::InvalidStatusTransition {
                from: self.status,
                to: new_status,
            });
        }

        let previous = self.status;
        let order = self.committed(|order| order.status = new_status)?;

        let mut events = vec![OrderEvent::status_changed(&order, previous)];
        if new_status == OrderStatus::Confirmed {
            events.push(OrderEvent::order_confirmed(&order));
        }
        events.push(OrderEvent::order_updated(&order));

        Ok(Change::new(order, events))
    }

    /// Cancels the order.
    pub fn cancel(&self) -> Result<OrderChange, OrderError> {
        if self.status == OrderStatus::Delivered {
            return Err(OrderError::CannotCancelDelivered);
        }
        self.ensure_modifiable()?;

        let mut change = self.change_status(OrderStatus::Cancelled)?;
        change
            .events
            .push(OrderEvent::order_cancelled(&change.aggregate));
        Ok(change)
    }

    /// Sets a new delivery fee. Setting the current fee is a no-op.
    pub fn update_delivery_fee(&self, delivery_fee: Money) -> Result<OrderChange, OrderError> {
        if delivery_fee.is_negative() {
            return Err(OrderError::NegativeAmount {
                field: "delivery fee",
                amount: delivery_fee,
            });
        }
        self.ensure_modifiable()?;

        if delivery_fee == self.delivery_fee {
            return Ok(Change::unchanged(self.clone()));
        }

        let order = self.committed(|order| order.delivery_fee = delivery_fee)?;
        let events = vec![OrderEvent::order_updated(&order)];
        Ok(Change::new(order, events))
    }

    /// Signals that the order was updated without changing any field.
    ///
    /// Used after a full field replacement built through [`Order::rehydrate`].
    pub fn mark_updated(&self) -> OrderChange {
        let order = self.clone();
        let events = vec![OrderEvent::order_updated(&order)];
        Change::new(order, events)
    }
}

// Helpers
impl Order {
    fn ensure_modifiable(&self) -> Result<(), OrderError> {
        if !self.status.is_modifiable() {
            return Err(OrderError::NotModifiable {
                status: self.status,
            });
        }
        Ok(())
    }

    /// Clones the order, applies `mutate`, reprices and bumps the version.
    fn committed(&self, mutate: impl FnOnce(&mut Order)) -> Result<Order, OrderError> {
        let mut order = self.clone();
        mutate(&mut order);
        order.pricing =
            PriceBreakdown::calculate(&order.items, order.delivery_fee, order.coupon.as_ref())?;
        order.version = order.version.next();
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DomainEvent;
    use crate::order::ProductSnapshot;

    fn item(product_id: &str, quantity: u32, unit_cents: i64) -> OrderItem {
        OrderItem::new(
            ProductSnapshot::new(product_id, product_id).unwrap(),
            quantity,
            Money::from_cents(unit_cents),
            Money::zero(),
            None,
        )
        .unwrap()
    }

    fn details(items: Vec<OrderItem>) -> OrderDetails {
        OrderDetails {
            code: "ORD-001".to_string(),
            created_at: Utc::now(),
            customer: CustomerSnapshot::new("cust-1", "Alice").unwrap(),
            restaurant: RestaurantSnapshot::new("rest-1", "Main Street").unwrap(),
            order_type: OrderType::Delivery,
            delivery_fee: Money::from_units(5),
            items,
            coupon: None,
        }
    }

    fn create_order() -> Order {
        Order::create(details(vec![item("prod-1", 1, 1000), item("prod-2", 1, 500)]))
            .unwrap()
            .aggregate
    }

    fn event_types(change: &OrderChange) -> Vec<&'static str> {
        change.events.iter().map(|e| e.event_type()).collect()
    }

    #[test]
    fn test_create_order() {
        let change = Order::create(details(vec![item("prod-1", 2, 1000)])).unwrap();
        let order = &change.aggregate;

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.version(), Version::initial());
        assert_eq!(order.order_total(), Money::from_units(25));
        assert_eq!(event_types(&change), vec!["OrderCreated"]);
    }

    #[test]
    fn test_create_trims_code() {
        let mut d = details(vec![item("prod-1", 1, 100)]);
        d.code = "  ORD-9  ".to_string();
        let order = Order::create(d).unwrap().aggregate;
        assert_eq!(order.code(), "ORD-9");
    }

    #[test]
    fn test_create_without_items_fails() {
        let result = Order::create(details(vec![]));
        assert!(matches!(result, Err(OrderError::NoItems)));
    }

    #[test]
    fn test_create_with_blank_code_fails() {
        let mut d = details(vec![item("prod-1", 1, 100)]);
        d.code = "   ".to_string();
        assert!(matches!(
            Order::create(d),
            Err(OrderError::Required("order code"))
        ));
    }

    #[test]
    fn test_create_with_negative_fee_fails() {
        let mut d = details(vec![item("prod-1", 1, 100)]);
        d.delivery_fee = Money::from_cents(-1);
        assert!(matches!(
            Order::create(d),
            Err(OrderError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_rehydrate_keeps_status_and_version() {
        let id = OrderId::new();
        let order = Order::rehydrate(
            id,
            details(vec![item("prod-1", 1, 100)]),
            OrderStatus::Ready,
            Version::new(7),
        )
        .unwrap();

        assert_eq!(order.id(), id);
        assert_eq!(order.status(), OrderStatus::Ready);
        assert_eq!(order.version(), Version::new(7));
    }

    #[test]
    fn test_rehydrate_rejects_nil_id_and_negative_version() {
        let nil = OrderId::from_uuid(uuid::Uuid::nil());
        assert!(matches!(
            Order::rehydrate(
                nil,
                details(vec![item("p", 1, 1)]),
                OrderStatus::Pending,
                Version::initial()
            ),
            Err(OrderError::Required("order id"))
        ));
        assert!(matches!(
            Order::rehydrate(
                OrderId::new(),
                details(vec![item("p", 1, 1)]),
                OrderStatus::Pending,
                Version::new(-1)
            ),
            Err(OrderError::NegativeVersion { .. })
        ));
    }

    #[test]
    fn test_add_item_bumps_version_and_reprices() {
        let order = create_order();
        let change = order.add_item(item("prod-3", 2, 250)).unwrap();

        assert_eq!(change.aggregate.item_count(), 3);
        assert_eq!(change.aggregate.version(), Version::new(1));
        assert_eq!(change.aggregate.order_total(), Money::from_units(25));
        assert_eq!(event_types(&change), vec!["OrderUpdated"]);

        // The original is untouched.
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.version(), Version::initial());
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let order = create_order()
            .add_item(item("prod-3", 1, 100))
            .unwrap()
            .aggregate;
        let ids: Vec<_> = order.items().iter().map(OrderItem::product_id).collect();
        assert_eq!(ids, vec!["prod-1", "prod-2", "prod-3"]);
    }

    #[test]
    fn test_remove_item_emits_item_removed_then_updated() {
        let change = create_order().remove_item_by_product_id("prod-1").unwrap();

        assert_eq!(change.aggregate.item_count(), 1);
        assert_eq!(change.aggregate.items()[0].product_id(), "prod-2");
        assert_eq!(event_types(&change), vec!["ItemRemoved", "OrderUpdated"]);
    }

    #[test]
    fn test_remove_only_first_duplicate() {
        let order = Order::create(details(vec![item("dup", 1, 100), item("dup", 2, 100)]))
            .unwrap()
            .aggregate;
        let order = order.remove_item_by_product_id("dup").unwrap().aggregate;

        assert_eq!(order.item_count(), 1);
        assert_eq!(order.items()[0].quantity(), 2);

        let result = order.remove_item_by_product_id("dup");
        assert!(matches!(result, Err(OrderError::LastItem)));
    }

    #[test]
    fn test_remove_unknown_item_fails() {
        let result = create_order().remove_item_by_product_id("nope");
        assert!(matches!(result, Err(OrderError::ItemNotFound { .. })));
    }

    #[test]
    fn test_remove_with_blank_product_id_fails() {
        let result = create_order().remove_item_by_product_id(" ");
        assert!(matches!(result, Err(OrderError::Required("product id"))));
    }

    #[test]
    fn test_single_item_order_reports_missing_product_as_not_found() {
        let order = Order::create(details(vec![item("prod-1", 1, 100)]))
            .unwrap()
            .aggregate;
        let result = order.remove_item_by_product_id("other");
        assert!(matches!(result, Err(OrderError::ItemNotFound { .. })));
    }

    #[test]
    fn test_apply_coupon_discounts_ten_percent() {
        let change = create_order()
            .apply_coupon(Coupon::with_code("OFF10").unwrap())
            .unwrap();
        let order = change.aggregate;

        assert_eq!(order.coupon_code(), Some("OFF10"));
        assert_eq!(order.discount_value(), Money::from_cents(200));
        assert_eq!(order.order_total(), Money::from_units(18));
        assert_eq!(order.version(), Version::new(1));
    }

    #[test]
    fn test_confirm_emits_status_confirmed_and_updated() {
        let change = create_order()
            .change_status(OrderStatus::Confirmed)
            .unwrap();

        assert_eq!(change.aggregate.status(), OrderStatus::Confirmed);
        assert_eq!(
            event_types(&change),
            vec!["StatusChanged", "OrderConfirmed", "OrderUpdated"]
        );
        match &change.events[0] {
            OrderEvent::StatusChanged(data) => {
                assert_eq!(data.previous_status, OrderStatus::Pending);
                assert_eq!(data.current_status, OrderStatus::Confirmed);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_same_status_is_noop() {
        let order = create_order();
        let change = order.change_status(OrderStatus::Pending).unwrap();

        assert!(change.is_noop());
        assert_eq!(change.aggregate, order);
    }

    #[test]
    fn test_illegal_transition_names_both_statuses() {
        let err = create_order()
            .change_status(OrderStatus::Delivered)
            .unwrap_err();

        assert_eq!(
            err,
            OrderError::InvalidStatusTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid status transition from Pending to Delivered"
        );
    }

    #[test]
    fn test_cancel_emits_cancelled_last() {
        let change = create_order().cancel().unwrap();

        assert_eq!(change.aggregate.status(), OrderStatus::Cancelled);
        assert_eq!(change.aggregate.version(), Version::new(1));
        assert_eq!(
            event_types(&change),
            vec!["StatusChanged", "OrderUpdated", "OrderCancelled"]
        );
    }

    #[test]
    fn test_cannot_cancel_delivered_order() {
        let mut order = create_order();
        for status in [
            OrderStatus::Confirmed,
            OrderStatus::InPreparation,
            OrderStatus::Ready,
            OrderStatus::Delivered,
        ] {
            order = order.change_status(status).unwrap().aggregate;
        }

        assert!(matches!(order.cancel(), Err(OrderError::CannotCancelDelivered)));
    }

    #[test]
    fn test_cannot_cancel_twice() {
        let order = create_order().cancel().unwrap().aggregate;
        assert!(matches!(
            order.cancel(),
            Err(OrderError::NotModifiable {
                status: OrderStatus::Cancelled
            })
        ));
    }

    #[test]
    fn test_terminal_order_rejects_mutations() {
        let order = create_order().cancel().unwrap().aggregate;

        assert!(matches!(
            order.add_item(item("prod-9", 1, 100)),
            Err(OrderError::NotModifiable { .. })
        ));
        assert!(matches!(
            order.remove_item_by_product_id("prod-1"),
            Err(OrderError::NotModifiable { .. })
        ));
        assert!(matches!(
            order.apply_coupon(Coupon::with_code("X").unwrap()),
            Err(OrderError::NotModifiable { .. })
        ));
        assert!(matches!(
            order.update_delivery_fee(Money::from_units(1)),
            Err(OrderError::NotModifiable { .. })
        ));
    }

    #[test]
    fn test_update_delivery_fee() {
        let order = create_order();

        let same = order.update_delivery_fee(Money::from_units(5)).unwrap();
        assert!(same.is_noop());
        assert_eq!(same.aggregate.version(), Version::initial());

        let change = order.update_delivery_fee(Money::from_units(8)).unwrap();
        assert_eq!(change.aggregate.delivery_fee(), Money::from_units(8));
        assert_eq!(change.aggregate.order_total(), Money::from_units(23));
        assert_eq!(change.aggregate.version(), Version::new(1));

        assert!(matches!(
            order.update_delivery_fee(Money::from_cents(-100)),
            Err(OrderError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_create_rejects_total_overflow() {
        let mut d = details(vec![item("prod-1", 1, i64::MAX)]);
        d.delivery_fee = Money::from_cents(1);

        assert!(matches!(
            Order::create(d),
            Err(OrderError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_overflowing_mutations_leave_order_untouched() {
        let order = Order::create(details(vec![item("prod-1", 1, i64::MAX - 1000)]))
            .unwrap()
            .aggregate;
        let before = order.clone();

        assert!(matches!(
            order.add_item(item("prod-2", 1, 1000)),
            Err(OrderError::AmountOverflow { .. })
        ));
        assert!(matches!(
            order.update_delivery_fee(Money::from_cents(i64::MAX)),
            Err(OrderError::AmountOverflow { .. })
        ));
        assert_eq!(order, before);
        assert_eq!(order.version(), Version::initial());
    }

    #[test]
    fn test_mark_updated_keeps_version() {
        let order = create_order();
        let change = order.mark_updated();

        assert_eq!(change.aggregate.version(), order.version());
        assert_eq!(event_types(&change), vec!["OrderUpdated"]);
    }

    #[test]
    fn test_event_summary_reflects_new_state() {
        let change = create_order()
            .change_status(OrderStatus::Confirmed)
            .unwrap();
        for event in &change.events {
            assert_eq!(event.summary().status, OrderStatus::Confirmed);
            assert_eq!(event.summary().version, Version::new(1));
        }
    }
}

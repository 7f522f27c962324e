//! Persisted shape of an order.

use chrono::{DateTime, Utc};
use common::{OrderId, Version};
use domain::{
    Coupon, CustomerSnapshot, Money, Order, OrderDetails, OrderError, OrderItem, OrderStatus,
    OrderType, ProductSnapshot, RepositoryError, RestaurantSnapshot,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Storage document for an order.
///
/// Derived values (line totals, discount, total) are stored for readers of
/// the raw document but are recomputed when the record is turned back into
/// an [`Order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Uuid,
    pub code: String,
    pub ordered_at: DateTime<Utc>,
    pub customer: PartyRecord,
    pub restaurant: PartyRecord,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub items: Vec<ItemRecord>,
    pub delivery_fee_cents: i64,
    #[serde(default)]
    pub coupon: Option<CouponRecord>,
    pub discount_value_cents: i64,
    pub total_cents: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub product_id: String,
    pub product_description: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub addons_value_cents: i64,
    #[serde(default)]
    pub note: Option<String>,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponRecord {
    pub code: String,
    pub discount_cents: i64,
}

impl OrderRecord {
    /// Captures the current state of an order.
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().as_uuid(),
            code: order.code().to_string(),
            ordered_at: order.created_at(),
            customer: PartyRecord {
                id: order.customer().id().to_string(),
                name: order.customer().name().to_string(),
            },
            restaurant: PartyRecord {
                id: order.restaurant().id().to_string(),
                name: order.restaurant().name().to_string(),
            },
            order_type: order.order_type(),
            status: order.status(),
            items: order.items().iter().map(ItemRecord::from_item).collect(),
            delivery_fee_cents: order.delivery_fee().cents(),
            coupon: order.coupon().map(|coupon| CouponRecord {
                code: coupon.code().to_string(),
                discount_cents: coupon.discount().cents(),
            }),
            discount_value_cents: order.discount_value().cents(),
            total_cents: order.order_total().cents(),
            version: order.version().as_i64(),
        }
    }

    /// Sets the stored version.
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version.as_i64();
        self
    }

    pub fn order_id(&self) -> OrderId {
        OrderId::from_uuid(self.id)
    }

    /// Rebuilds the order, revalidating every field.
    pub fn into_order(self) -> Result<Order> {
        let order_id = self.order_id();
        self.rehydrate()
            .map_err(|source| RepositoryError::CorruptRecord { order_id, source })
    }

    fn rehydrate(self) -> std::result::Result<Order, OrderError> {
        let items = self
            .items
            .into_iter()
            .map(ItemRecord::into_item)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let coupon = self
            .coupon
            .map(|c| Coupon::new(c.code, Money::from_cents(c.discount_cents)))
            .transpose()?;

        let details = OrderDetails {
            code: self.code,
            created_at: self.ordered_at,
            customer: CustomerSnapshot::new(self.customer.id, self.customer.name)?,
            restaurant: RestaurantSnapshot::new(self.restaurant.id, self.restaurant.name)?,
            order_type: self.order_type,
            delivery_fee: Money::from_cents(self.delivery_fee_cents),
            items,
            coupon,
        };

        Order::rehydrate(
            OrderId::from_uuid(self.id),
            details,
            self.status,
            Version::new(self.version),
        )
    }
}

impl ItemRecord {
    fn from_item(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id().to_string(),
            product_description: item.product().description().to_string(),
            quantity: item.quantity(),
            unit_price_cents: item.unit_price().cents(),
            addons_value_cents: item.addons_value().cents(),
            note: item.note().map(str::to_string),
            line_total_cents: item.line_total().cents(),
        }
    }

    fn into_item(self) -> std::result::Result<OrderItem, OrderError> {
        OrderItem::new(
            ProductSnapshot::new(self.product_id, self.product_description)?,
            self.quantity,
            Money::from_cents(self.unit_price_cents),
            Money::from_cents(self.addons_value_cents),
            self.note,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order::create(OrderDetails {
            code: "ORD-001".to_string(),
            created_at: Utc::now(),
            customer: CustomerSnapshot::new("cust-1", "Alice").unwrap(),
            restaurant: RestaurantSnapshot::new("rest-1", "Main Street").unwrap(),
            order_type: OrderType::Delivery,
            delivery_fee: Money::from_units(4),
            items: vec![
                OrderItem::new(
                    ProductSnapshot::new("prod-1", "Burger").unwrap(),
                    2,
                    Money::from_units(10),
                    Money::from_units(1),
                    Some("no onions".to_string()),
                )
                .unwrap(),
            ],
            coupon: Some(Coupon::new("OFF10", Money::from_units(20)).unwrap()),
        })
        .unwrap()
        .aggregate
    }

    #[test]
    fn test_record_rebuilds_same_order() {
        let order = sample_order();
        let rebuilt = OrderRecord::from_order(&order).into_order().unwrap();
        assert_eq!(rebuilt, order);
    }

    #[test]
    fn test_record_stores_derived_amounts() {
        let record = OrderRecord::from_order(&sample_order());

        assert_eq!(record.items[0].line_total_cents, 2100);
        assert_eq!(record.discount_value_cents, 250);
        assert_eq!(record.total_cents, 2250);
        assert_eq!(record.coupon.as_ref().unwrap().discount_cents, 2000);
    }

    #[test]
    fn test_record_json_shape() {
        let record = OrderRecord::from_order(&sample_order()).with_version(Version::new(3));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["version"], 3);
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["order_type"], "Delivery");
        assert_eq!(json["items"][0]["note"], "no onions");

        let back: OrderRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_corrupt_record_is_rejected() {
        let mut record = OrderRecord::from_order(&sample_order());
        record.items.clear();

        let err = record.into_order().unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::CorruptRecord {
                source: OrderError::NoItems,
                ..
            }
        ));
    }
}

//! Persistence contract for orders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ErrorKind, OrderId, Version};
use thiserror::Error;

use crate::order::{Order, OrderError, OrderStatus};

/// Errors that can occur when interacting with an order repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No order matched the given identity.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The stored version moved since the caller read the order.
    #[error(
        "Concurrency conflict for order {order_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// Another order already uses this code.
    #[error("Order code already exists: {0}")]
    DuplicateCode(String),

    /// Another order already uses this id.
    #[error("Order id already exists: {0}")]
    DuplicateId(OrderId),

    /// A stored record no longer satisfies the order invariants.
    #[error("Corrupt order record {order_id}: {source}")]
    CorruptRecord {
        order_id: OrderId,
        #[source]
        source: OrderError,
    },

    /// The storage backend failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::NotFound(_) => ErrorKind::NotFound,
            RepositoryError::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
            RepositoryError::DuplicateCode(_) | RepositoryError::DuplicateId(_) => {
                ErrorKind::Conflict
            }
            RepositoryError::CorruptRecord { .. } | RepositoryError::Backend(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Filter for [`OrderRepository::search`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    /// Exact order code.
    pub code: Option<String>,

    /// Current status.
    pub status: Option<OrderStatus>,

    /// Orders placed at or after this instant.
    pub from: Option<DateTime<Utc>>,

    /// Orders placed at or before this instant.
    pub to: Option<DateTime<Utc>>,
}

impl OrderQuery {
    /// Creates a query matching every order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by order code. Blank codes are ignored.
    pub fn code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.code = if code.trim().is_empty() {
            None
        } else {
            Some(code)
        };
        self
    }

    /// Filters by status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by orders placed at or after `from`.
    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Filters by orders placed at or before `to`.
    pub fn to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    /// Returns true if `order` satisfies every set filter.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(ref code) = self.code
            && order.code() != code
        {
            return false;
        }
        if let Some(status) = self.status
            && order.status() != status
        {
            return false;
        }
        if let Some(from) = self.from
            && order.created_at() < from
        {
            return false;
        }
        if let Some(to) = self.to
            && order.created_at() > to
        {
            return false;
        }
        true
    }
}

/// Storage collaborator for the order aggregate.
///
/// All implementations must be thread-safe (Send + Sync). `update` is the
/// only write that races with other callers and must be a single atomic
/// compare-and-swap on `(id, version)` inside the storage backend.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a brand-new order.
    ///
    /// Fails with `DuplicateCode` if the code is already taken.
    async fn add(&self, order: &Order) -> Result<Order>;

    /// Loads an order by id.
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Loads an order by code.
    async fn get_by_code(&self, code: &str) -> Result<Option<Order>>;

    /// Returns orders matching the query, oldest first.
    async fn search(&self, query: &OrderQuery) -> Result<Vec<Order>>;

    /// Replaces the stored order if its version still equals `expected`.
    ///
    /// - no row with this id: `NotFound`
    /// - row exists at another version: `ConcurrencyConflict`
    /// - otherwise the order is written with version `expected + 1`, which is
    ///   returned.
    async fn update(&self, order: &Order, expected: Version) -> Result<Order>;

    /// Deletes an order by id.
    async fn delete(&self, id: OrderId) -> Result<()>;

    /// Deletes an order by code.
    async fn delete_by_code(&self, code: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{
        CustomerSnapshot, Money, OrderDetails, OrderItem, OrderType, ProductSnapshot,
        RestaurantSnapshot,
    };
    use chrono::Duration;

    fn order_at(code: &str, created_at: DateTime<Utc>) -> Order {
        Order::create(OrderDetails {
            code: code.to_string(),
            created_at,
            customer: CustomerSnapshot::new("c", "C").unwrap(),
            restaurant: RestaurantSnapshot::new("r", "R").unwrap(),
            order_type: OrderType::Pickup,
            delivery_fee: Money::zero(),
            items: vec![
                OrderItem::new(
                    ProductSnapshot::new("p", "P").unwrap(),
                    1,
                    Money::from_units(1),
                    Money::zero(),
                    None,
                )
                .unwrap(),
            ],
            coupon: None,
        })
        .unwrap()
        .aggregate
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let order = order_at("A", Utc::now());
        assert!(OrderQuery::new().matches(&order));
    }

    #[test]
    fn test_blank_code_filter_is_ignored() {
        assert_eq!(OrderQuery::new().code("  ").code, None);
    }

    #[test]
    fn test_query_filters() {
        let now = Utc::now();
        let order = order_at("A", now);

        assert!(OrderQuery::new().code("A").matches(&order));
        assert!(!OrderQuery::new().code("B").matches(&order));
        assert!(OrderQuery::new().status(OrderStatus::Pending).matches(&order));
        assert!(!OrderQuery::new().status(OrderStatus::Ready).matches(&order));
        assert!(OrderQuery::new().from(now).to(now).matches(&order));
        assert!(!OrderQuery::new().from(now + Duration::seconds(1)).matches(&order));
        assert!(!OrderQuery::new().to(now - Duration::seconds(1)).matches(&order));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            RepositoryError::NotFound("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RepositoryError::ConcurrencyConflict {
                order_id: OrderId::new(),
                expected: Version::new(2),
                actual: Version::new(3),
            }
            .kind(),
            ErrorKind::ConcurrencyConflict
        );
        assert_eq!(
            RepositoryError::DuplicateCode("ORD-1".into()).kind(),
            ErrorKind::Conflict
        );
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, Version};
use domain::{Order, OrderQuery, OrderRepository, RepositoryError};
use tokio::sync::RwLock;

use crate::{OrderRecord, Result};

#[derive(Default)]
struct Tables {
    orders: HashMap<OrderId, OrderRecord>,
    codes: HashMap<String, OrderId>,
}

/// In-memory order repository.
///
/// Orders are kept as [`OrderRecord`]s so every load goes through the same
/// revalidation as the PostgreSQL implementation. Each write holds the
/// lock for the whole check-and-set.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Removes all orders.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.orders.clear();
        tables.codes.clear();
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn add(&self, order: &Order) -> Result<Order> {
        let record = OrderRecord::from_order(order);
        let mut tables = self.tables.write().await;

        if tables.orders.contains_key(&order.id()) {
            return Err(RepositoryError::DuplicateId(order.id()));
        }
        if tables.codes.contains_key(&record.code) {
            return Err(RepositoryError::DuplicateCode(record.code));
        }

        tables.codes.insert(record.code.clone(), order.id());
        tables.orders.insert(order.id(), record.clone());
        drop(tables);

        record.into_order()
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let record = self.tables.read().await.orders.get(&id).cloned();
        record.map(OrderRecord::into_order).transpose()
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Order>> {
        let record = {
            let tables = self.tables.read().await;
            tables
                .codes
                .get(code)
                .and_then(|id| tables.orders.get(id))
                .cloned()
        };
        record.map(OrderRecord::into_order).transpose()
    }

    async fn search(&self, query: &OrderQuery) -> Result<Vec<Order>> {
        let records: Vec<OrderRecord> = self.tables.read().await.orders.values().cloned().collect();

        let mut orders = records
            .into_iter()
            .map(OrderRecord::into_order)
            .collect::<Result<Vec<_>>>()?;
        orders.retain(|order| query.matches(order));
        orders.sort_by_key(|order| (order.created_at(), order.id()));
        Ok(orders)
    }

    async fn update(&self, order: &Order, expected: Version) -> Result<Order> {
        let id = order.id();
        let record = OrderRecord::from_order(order).with_version(expected.next());
        let mut tables = self.tables.write().await;

        let stored = tables
            .orders
            .get(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        let actual = Version::new(stored.version);
        if actual != expected {
            return Err(RepositoryError::ConcurrencyConflict {
                order_id: id,
                expected,
                actual,
            });
        }

        if stored.code != record.code {
            if tables.codes.contains_key(&record.code) {
                return Err(RepositoryError::DuplicateCode(record.code));
            }
            let old_code = stored.code.clone();
            tables.codes.remove(&old_code);
            tables.codes.insert(record.code.clone(), id);
        }

        tables.orders.insert(id, record.clone());
        drop(tables);

        record.into_order()
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let record = tables
            .orders
            .remove(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        tables.codes.remove(&record.code);
        Ok(())
    }

    async fn delete_by_code(&self, code: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let id = tables
            .codes
            .remove(code)
            .ok_or_else(|| RepositoryError::NotFound(code.to_string()))?;
        tables.orders.remove(&id);
        Ok(())
    }
}

use async_trait::async_trait;
use common::{OrderId, Version};
use domain::{Order, OrderQuery, OrderRepository, RepositoryError};
use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{backend, write_error};
use crate::{OrderRecord, Result};

/// PostgreSQL-backed order repository.
///
/// Each order is one row: indexed columns for lookups plus the full
/// [`OrderRecord`] as a JSONB document.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let Json(record): Json<OrderRecord> = row.try_get("document").map_err(backend)?;
        let version: i64 = row.try_get("version").map_err(backend)?;
        record.with_version(Version::new(version)).into_order()
    }

    async fn stored_version(&self, id: OrderId) -> Result<Option<Version>> {
        let version: Option<i64> = sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(version.map(Version::new))
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id(), code = %order.code()))]
    async fn add(&self, order: &Order) -> Result<Order> {
        let record = OrderRecord::from_order(order);

        sqlx::query(
            r#"
            INSERT INTO orders (id, code, ordered_at, status, version, document)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(&record.code)
        .bind(record.ordered_at)
        .bind(record.status.as_str())
        .bind(record.version)
        .bind(Json(&record))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, order.id(), order.code()))?;

        tracing::debug!("Order inserted");
        record.into_order()
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row: Option<PgRow> = sqlx::query("SELECT version, document FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(Self::row_to_order).transpose()
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Order>> {
        let row: Option<PgRow> =
            sqlx::query("SELECT version, document FROM orders WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        row.map(Self::row_to_order).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &OrderQuery) -> Result<Vec<Order>> {
        let mut sql = String::from("SELECT version, document FROM orders WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.code.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND code = ${param_count}"));
        }
        if query.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
        if query.from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND ordered_at >= ${param_count}"));
        }
        if query.to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND ordered_at <= ${param_count}"));
        }

        sql.push_str(" ORDER BY ordered_at ASC, id ASC");

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(ref code) = query.code {
            sqlx_query = sqlx_query.bind(code);
        }
        if let Some(status) = query.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }
        if let Some(from) = query.from {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = query.to {
            sqlx_query = sqlx_query.bind(to);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await.map_err(backend)?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.id(), expected = %expected))]
    async fn update(&self, order: &Order, expected: Version) -> Result<Order> {
        let id = order.id();
        let record = OrderRecord::from_order(order).with_version(expected.next());

        // Single conditional write; the version predicate is the lock.
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET code = $3, ordered_at = $4, status = $5, version = $6, document = $7,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(expected.as_i64())
        .bind(&record.code)
        .bind(record.ordered_at)
        .bind(record.status.as_str())
        .bind(record.version)
        .bind(Json(&record))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, id, order.code()))?;

        if result.rows_affected() == 0 {
            // Nothing matched: tell a missing row from a stale version.
            return match self.stored_version(id).await? {
                None => Err(RepositoryError::NotFound(id.to_string())),
                Some(actual) => Err(RepositoryError::ConcurrencyConflict {
                    order_id: id,
                    expected,
                    actual,
                }),
            };
        }

        record.into_order()
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: OrderId) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_by_code(&self, code: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(code.to_string()));
        }
        Ok(())
    }
}

//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency. Every test
//! works on its own order codes, so they can run in parallel:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{OrderId, Version};
use domain::{
    CancelOrder, ChangeStatus, CreateOrder, CustomerSnapshot, DomainError, Money, Order,
    OrderDetails, OrderItem, OrderQuery, OrderRepository, OrderService, OrderStatus, OrderType,
    ProductSnapshot, RepositoryError, RestaurantSnapshot,
};
use order_store::PostgresOrderRepository;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_orders_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a repository with its own pool
async fn get_test_repo() -> PostgresOrderRepository {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    PostgresOrderRepository::new(pool)
}

fn unique_code() -> String {
    format!("ORD-{}", OrderId::new())
}

fn new_order(code: &str) -> Order {
    Order::create(order_details(code)).unwrap().aggregate
}

fn order_details(code: &str) -> OrderDetails {
    OrderDetails {
        code: code.to_string(),
        created_at: Utc::now(),
        customer: CustomerSnapshot::new("cust-1", "Alice").unwrap(),
        restaurant: RestaurantSnapshot::new("rest-1", "Main Street").unwrap(),
        order_type: OrderType::Delivery,
        delivery_fee: Money::from_units(5),
        items: vec![
            OrderItem::new(
                ProductSnapshot::new("prod-1", "Burger").unwrap(),
                2,
                Money::from_units(10),
                Money::from_units(1),
                Some("well done".to_string()),
            )
            .unwrap(),
        ],
        coupon: None,
    }
}

#[tokio::test]
async fn add_and_load_by_id_and_code() {
    let repo = get_test_repo().await;
    let code = unique_code();
    let order = new_order(&code);

    let stored = repo.add(&order).await.unwrap();
    assert_eq!(stored.version(), Version::initial());

    let by_id = repo.get_by_id(order.id()).await.unwrap().unwrap();
    assert_eq!(by_id.code(), code);
    assert_eq!(by_id.order_total(), Money::from_units(26));
    assert_eq!(by_id.items()[0].note(), Some("well done"));

    let by_code = repo.get_by_code(&code).await.unwrap().unwrap();
    assert_eq!(by_code.id(), order.id());
}

#[tokio::test]
async fn missing_order_is_none() {
    let repo = get_test_repo().await;

    assert!(repo.get_by_id(OrderId::new()).await.unwrap().is_none());
    assert!(repo.get_by_code(&unique_code()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_code_is_rejected_by_unique_index() {
    let repo = get_test_repo().await;
    let code = unique_code();

    repo.add(&new_order(&code)).await.unwrap();
    let result = repo.add(&new_order(&code)).await;

    assert!(matches!(result, Err(RepositoryError::DuplicateCode(c)) if c == code));
}

#[tokio::test]
async fn update_advances_version() {
    let repo = get_test_repo().await;
    let order = repo.add(&new_order(&unique_code())).await.unwrap();

    let confirmed = order
        .change_status(OrderStatus::Confirmed)
        .unwrap()
        .aggregate;
    let stored = repo.update(&confirmed, Version::initial()).await.unwrap();

    assert_eq!(stored.version(), Version::new(1));

    let loaded = repo.get_by_id(order.id()).await.unwrap().unwrap();
    assert_eq!(loaded.status(), OrderStatus::Confirmed);
    assert_eq!(loaded.version(), Version::new(1));
}

#[tokio::test]
async fn update_with_stale_version_conflicts() {
    let repo = get_test_repo().await;
    let order = repo.add(&new_order(&unique_code())).await.unwrap();

    // Bring storage to version 2.
    let mut current = order;
    for status in [OrderStatus::Confirmed, OrderStatus::InPreparation] {
        let next = current.change_status(status).unwrap().aggregate;
        current = repo.update(&next, current.version()).await.unwrap();
    }
    assert_eq!(current.version(), Version::new(2));

    // Two copies read at version 2.
    let copy_a = repo.get_by_id(current.id()).await.unwrap().unwrap();
    let copy_b = copy_a.clone();

    let ready = copy_a.change_status(OrderStatus::Ready).unwrap().aggregate;
    let saved = repo.update(&ready, copy_a.version()).await.unwrap();
    assert_eq!(saved.version(), Version::new(3));

    let cancelled = copy_b.cancel().unwrap().aggregate;
    let result = repo.update(&cancelled, copy_b.version()).await;
    assert!(matches!(
        result,
        Err(RepositoryError::ConcurrencyConflict { expected, actual, .. })
            if expected == Version::new(2) && actual == Version::new(3)
    ));

    let stored = repo.get_by_id(current.id()).await.unwrap().unwrap();
    assert_eq!(stored.version(), Version::new(3));
    assert_eq!(stored.status(), OrderStatus::Ready);
}

#[tokio::test]
async fn update_missing_order_is_not_found() {
    let repo = get_test_repo().await;
    let result = repo
        .update(&new_order(&unique_code()), Version::initial())
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
async fn search_by_code_status_and_range() {
    let repo = get_test_repo().await;
    let code = unique_code();
    let order = repo.add(&new_order(&code)).await.unwrap();

    let found = repo
        .search(&OrderQuery::new().code(code.clone()))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), order.id());

    let found = repo
        .search(
            &OrderQuery::new()
                .code(code.clone())
                .status(OrderStatus::Pending)
                .from(order.created_at() - Duration::seconds(1))
                .to(order.created_at() + Duration::seconds(1)),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let none = repo
        .search(&OrderQuery::new().code(code).status(OrderStatus::Ready))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn delete_by_id_and_code() {
    let repo = get_test_repo().await;
    let first = repo.add(&new_order(&unique_code())).await.unwrap();
    let second_code = unique_code();
    repo.add(&new_order(&second_code)).await.unwrap();

    repo.delete(first.id()).await.unwrap();
    repo.delete_by_code(&second_code).await.unwrap();

    assert!(repo.get_by_id(first.id()).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_by_code(&second_code).await,
        Err(RepositoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn service_round_trip_over_postgres() {
    let service = OrderService::new(get_test_repo().await);
    let created = service
        .create_order(CreateOrder::new(order_details(&unique_code())))
        .await
        .unwrap();
    let order_id = created.aggregate.id();

    let confirmed = service
        .change_status(ChangeStatus::new(
            order_id,
            created.new_version,
            OrderStatus::Confirmed,
        ))
        .await
        .unwrap();
    assert_eq!(confirmed.new_version, Version::new(1));

    // Stale cancel loses.
    let result = service
        .cancel_order(CancelOrder::new(order_id, created.new_version))
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Repository(
            RepositoryError::ConcurrencyConflict { .. }
        ))
    ));

    let cancelled = service
        .cancel_order(CancelOrder::new(order_id, confirmed.new_version))
        .await
        .unwrap();
    assert_eq!(cancelled.aggregate.status(), OrderStatus::Cancelled);
    assert_eq!(cancelled.new_version, Version::new(2));
}

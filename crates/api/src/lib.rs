//! HTTP API server with observability for the food-order service.
//!
//! Provides REST endpoints for order management over any
//! [`OrderRepository`], with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::OrderRepository;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::health::StorageBackend;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: OrderRepository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
    storage: StorageBackend,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let health_router = Router::new()
        .route("/health", get(routes::health::check))
        .with_state(storage);

    Router::new()
        .route(
            "/orders",
            post(routes::orders::create::<R>).get(routes::orders::search::<R>),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get::<R>)
                .put(routes::orders::replace::<R>)
                .delete(routes::orders::delete::<R>),
        )
        .route(
            "/orders/code/{code}",
            get(routes::orders::get_by_code::<R>).delete(routes::orders::delete_by_code::<R>),
        )
        .route(
            "/orders/{id}/status",
            post(routes::orders::change_status::<R>),
        )
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<R>))
        .route("/orders/{id}/items", post(routes::orders::add_item::<R>))
        .route(
            "/orders/{id}/items/{product_id}",
            axum::routing::delete(routes::orders::remove_item::<R>),
        )
        .route(
            "/orders/{id}/coupon",
            post(routes::orders::apply_coupon::<R>),
        )
        .route(
            "/orders/{id}/delivery-fee",
            put(routes::orders::update_delivery_fee::<R>),
        )
        .with_state(state)
        .merge(health_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a repository.
pub fn create_state<R: OrderRepository + 'static>(repository: R) -> Arc<AppState<R>> {
    Arc::new(AppState::new(repository))
}

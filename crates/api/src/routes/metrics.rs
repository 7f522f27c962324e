//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Registers descriptions for the order counters.
pub fn describe() {
    metrics::describe_counter!("orders_saved_total", "Orders inserted or updated");
    metrics::describe_counter!(
        "orders_concurrency_conflicts_total",
        "Order updates rejected because the stored version had moved"
    );
    metrics::describe_counter!(
        "order_domain_events_total",
        "Domain events raised by saved order operations, by event type"
    );
}

/// GET /metrics — returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}

//! API server entry point.

use api::config::Config;
use api::routes::health::StorageBackend;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderRepository, PostgresOrderRepository};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Builds the router over the repository selected by the configuration.
async fn build_app(config: &Config, metrics_handle: PrometheusHandle) -> Router {
    match config.database_url {
        Some(ref url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await
                .expect("failed to connect to database");

            let repository = PostgresOrderRepository::new(pool);
            repository
                .run_migrations()
                .await
                .expect("failed to run migrations");

            tracing::info!(
                max_connections = config.database_max_connections,
                "using PostgreSQL order repository"
            );
            api::create_app(
                api::create_state(repository),
                metrics_handle,
                StorageBackend::Postgres,
            )
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory order repository");
            api::create_app(
                api::create_state(InMemoryOrderRepository::new()),
                metrics_handle,
                StorageBackend::Memory,
            )
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    api::routes::metrics::describe();

    // 3. Build the application
    let app = build_app(&config, metrics_handle).await;

    // 4. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

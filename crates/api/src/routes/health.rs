//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Which repository backs the running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: StorageBackend,
    pub version: &'static str,
}

/// GET /health — returns service health and the active storage backend.
pub async fn check(State(storage): State<StorageBackend>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage,
        version: env!("CARGO_PKG_VERSION"),
    })
}

//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ErrorKind;
use domain::{DomainError, OrderError};
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request the domain never saw (bad id, bad version).
    #[error("{0}")]
    BadRequest(String),

    /// Domain or storage error.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest(_) => ErrorKind::Validation,
            ApiError::Domain(err) => err.kind(),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Domain(DomainError::Order(err))
    }
}

/// Maps an error category to its HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ConcurrencyConflict | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);
        let message = self.to_string();

        if kind == ErrorKind::Internal {
            tracing::error!(error = %message, "internal server error");
        }

        let body = serde_json::json!({ "error": message, "kind": kind.as_str() });
        (status, axum::Json(body)).into_response()
    }
}

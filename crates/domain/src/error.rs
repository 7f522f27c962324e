//! Domain error types.

use common::ErrorKind;
use thiserror::Error;

use crate::order::OrderError;
use crate::repository::RepositoryError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the order repository.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// An error occurred in the order aggregate.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),
}

impl DomainError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Repository(err) => err.kind(),
            DomainError::Order(err) => err.kind(),
        }
    }
}

use common::OrderId;
use domain::RepositoryError;

/// Name of the unique index on order codes.
pub const CODE_UNIQUE_CONSTRAINT: &str = "ux_orders_code";

/// Name of the primary key constraint on order ids.
pub const PRIMARY_KEY_CONSTRAINT: &str = "orders_pkey";

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Maps a failed write of the order `(id, code)` to a repository error.
///
/// Unique violations on the code index or the primary key become
/// `DuplicateCode` / `DuplicateId`; anything else is a backend failure.
pub(crate) fn write_error(err: sqlx::Error, id: OrderId, code: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        match db_err.constraint() {
            Some(CODE_UNIQUE_CONSTRAINT) => return RepositoryError::DuplicateCode(code.to_string()),
            Some(PRIMARY_KEY_CONSTRAINT) => return RepositoryError::DuplicateId(id),
            _ => {}
        }
    }
    backend(err)
}

/// Maps a database error to a backend failure.
pub(crate) fn backend(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Backend(err.to_string())
}

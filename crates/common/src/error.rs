//! Error taxonomy shared by the domain, storage and HTTP layers.

use serde::Serialize;

/// The category an error belongs to.
///
/// Each layer keeps its own error enum; this is the common vocabulary the
/// calling layer matches on to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed input: missing field, out-of-range number, empty string.
    Validation,

    /// Well-formed input that breaks a domain rule.
    BusinessRule,

    /// The requested order does not exist.
    NotFound,

    /// The stored version no longer matches the caller's version.
    ConcurrencyConflict,

    /// A uniqueness constraint was violated on insert (e.g. order code).
    Conflict,

    /// Infrastructure failure (database, serialization).
    Internal,
}

impl ErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::BusinessRule => "business_rule",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ConcurrencyConflict => "concurrency_conflict",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

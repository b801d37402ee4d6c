//! Domain error model.

use thiserror::Error;

/// Result type used across the ledger domain.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only deterministic business failures live here. Storage and export failures
/// have their own types in the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// User input was malformed or out of range. No state was changed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A ledger invariant would have been broken (e.g. creating twice).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The referenced entity does not exist in the ledger.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// True for input errors the caller should show back to the user.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic failures only (malformed input, violated bounds, broken
/// existence preconditions). Storage failures are wrapped by the infra layer.
/// Callers branch on the variant, never on the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identity or field failed a structural pattern or enum check.
    #[error("invalid format: {0}")]
    Format(String),

    /// A numeric invariant was violated (quantity/total bounds, pack ceiling).
    #[error("out of range: {0}")]
    Range(String),

    /// A collection or envelope rule failed (empty name, duplicates, no-op update).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An existence precondition was violated (create-on-existing, mutate-on-absent).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requested record does not exist (read paths).
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

//! Store-level error model.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `InventoryError` as follows:
//!
//! | SQLx Error | InventoryError | Scenario |
//! |------------|----------------|----------|
//! | Database (unique violation) | `Domain(Conflict)` | Identity already taken (concurrent create or rename) |
//! | Database (foreign key violation) | `Domain(Conflict)` | Pack link points at a course that vanished |
//! | Anything else | `Store` | I/O, pool, decode and other backend failures |

use thiserror::Error;

use polybase_core::DomainError;

/// Result type returned by every inventory operation.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Inventory operation error.
///
/// `Domain` carries the deterministic taxonomy (format, range, validation,
/// conflict, not found). `Store` wraps backend failures and is always tagged
/// with the operation that hit it.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store error in {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl InventoryError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            InventoryError::Domain(err) => Some(err),
            InventoryError::Store { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, InventoryError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, InventoryError::Domain(DomainError::Conflict(_)))
    }
}

pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> InventoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DomainError::conflict(format!("{operation}: record already exists")).into();
        }
        if db_err.is_foreign_key_violation() {
            return DomainError::conflict(format!(
                "{operation}: referenced record does not exist"
            ))
            .into();
        }
    }
    InventoryError::Store {
        operation,
        source: err,
    }
}

/// Shorthand for `map_err(|e| map_sqlx_error(operation, e))`.
pub(crate) fn store(operation: &'static str) -> impl FnOnce(sqlx::Error) -> InventoryError {
    move |err| map_sqlx_error(operation, err)
}

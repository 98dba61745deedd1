use thiserror::Error;

use bazaar_catalog::ProductId;
use bazaar_core::{DomainError, FieldError};

/// Storage operation error.
///
/// These are **infrastructure errors** (connectivity, constraints, concurrency)
/// as opposed to domain errors (validation, invariants, stock).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The row is still referenced and cannot be removed.
    #[error("{0} is still referenced")]
    InUse(String),

    #[error("stored row is invalid: {0}")]
    Corrupt(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Error returned by the application services.
///
/// Domain and store failures are folded into the categories callers act on.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input, with field-level detail.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The caller may not touch this resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Stale write or concurrent modification.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The unit of work could not be completed; nothing was committed.
    #[error("persistence failure: {0}")]
    Persistence(StoreError),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        if value.is_validation() {
            return ServiceError::Validation {
                message: value.to_string(),
                details: value.field_errors(),
            };
        }
        match value {
            DomainError::NotFound(what) => ServiceError::NotFound(what),
            DomainError::InsufficientStock {
                product_id,
                requested,
                available,
            } => ServiceError::InsufficientStock {
                product_id: ProductId::new(product_id),
                requested,
                available,
            },
            other => ServiceError::Invariant(other.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => ServiceError::Conflict(msg),
            StoreError::NotFound(what) => ServiceError::NotFound(what),
            StoreError::InUse(what) => ServiceError::Conflict(format!("{what} is still referenced")),
            other => ServiceError::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::AggregateId;

    #[test]
    fn domain_validation_keeps_field_details() {
        let err = ServiceError::from(DomainError::InvalidQuantity(0));
        match err {
            ServiceError::Validation { details, .. } => assert_eq!(details[0].field, "qty"),
            other => panic!("expected validation, got {other:?}"),
        }
    }

    #[test]
    fn insufficient_stock_is_distinct_from_not_found() {
        let id = AggregateId::new();
        let err = ServiceError::from(DomainError::InsufficientStock {
            product_id: id,
            requested: 2,
            available: 1,
        });
        assert!(matches!(
            err,
            ServiceError::InsufficientStock { product_id, .. } if product_id == ProductId::new(id)
        ));
        assert!(matches!(
            ServiceError::from(DomainError::not_found("product")),
            ServiceError::NotFound(_)
        ));
    }

    #[test]
    fn store_concurrency_becomes_conflict() {
        let err = ServiceError::from(StoreError::Concurrency("stale".into()));
        assert!(matches!(err, ServiceError::Conflict(_)));
        let err = ServiceError::from(StoreError::Backend("down".into()));
        assert!(matches!(err, ServiceError::Persistence(_)));
    }

    #[test]
    fn referenced_row_becomes_conflict() {
        let err = ServiceError::from(StoreError::InUse("product 42".into()));
        match err {
            ServiceError::Conflict(msg) => assert!(msg.contains("product 42")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }
}

//! Domain error model.

use serde::Serialize;
use thiserror::Error;

use crate::id::AggregateId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Field-level validation detail, surfaced to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, stock). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A single named field failed validation.
    #[error("invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    /// A quantity was zero or negative.
    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(i64),

    /// An order was requested without any lines.
    #[error("order must contain at least one line")]
    EmptyOrder,

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Not enough stock to satisfy a reservation.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: AggregateId,
        requested: i64,
        available: i64,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Whether this error describes malformed client input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidField { .. }
                | Self::InvalidQuantity(_)
                | Self::EmptyOrder
                | Self::InvalidId(_)
        )
    }

    /// Field-level details for validation failures.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let (field, message) = match self {
            Self::InvalidField { field, message } => (field.clone(), message.clone()),
            Self::InvalidQuantity(q) => ("qty".to_string(), format!("must be positive, got {q}")),
            Self::EmptyOrder => ("itemIds".to_string(), "must not be empty".to_string()),
            Self::InvalidId(msg) => ("id".to_string(), msg.clone()),
            Self::Validation(msg) => ("body".to_string(), msg.clone()),
            _ => return Vec::new(),
        };
        vec![FieldError { field, message }]
    }
}

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. An order line is
/// the canonical example here: once written it is a historical record of what
/// was charged, and two lines with the same price, quantity and product are
/// interchangeable.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct StockMovement { before: i64, after: i64 }
///
/// impl ValueObject for StockMovement {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

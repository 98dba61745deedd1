use serde::{Deserialize, Serialize};

use bazaar_core::ValueObject;

use crate::product::ProductId;

/// Outcome of a successful stock reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub product_id: ProductId,
    pub quantity: i64,
    pub before: i64,
    pub after: i64,
}

impl ValueObject for StockMovement {}

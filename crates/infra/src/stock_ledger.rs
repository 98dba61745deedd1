//! Check-and-decrement of product stock inside a unit of work.

use chrono::{DateTime, Utc};
use tracing::debug;

use bazaar_catalog::{Product, ProductId, StockMovement};

use crate::error::ServiceError;
use crate::store::UnitOfWork;

/// A successful reservation: the product as it now stands (stock already
/// lowered) and the movement that was applied.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub product: Product,
    pub movement: StockMovement,
}

/// Lock `product_id`, check that `quantity` units are available and persist
/// the lowered stock, all on `unit`.
///
/// Nothing is visible to other callers until the unit commits, and the lock
/// taken here keeps a concurrent reservation from reading the old stock.
pub async fn reserve_and_decrement<U>(
    unit: &mut U,
    product_id: ProductId,
    quantity: i64,
    now: DateTime<Utc>,
) -> Result<Reservation, ServiceError>
where
    U: UnitOfWork,
{
    let mut product = unit
        .lock_product(product_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("product"))?;

    let movement = product.reserve(quantity, now)?;
    unit.save_product(&product).await?;

    debug!(
        product_id = %product_id,
        quantity,
        before = movement.before,
        after = movement.after,
        "stock reserved"
    );

    Ok(Reservation { product, movement })
}

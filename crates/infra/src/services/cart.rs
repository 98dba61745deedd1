use chrono::Utc;
use tracing::{debug, instrument};

use bazaar_cart::{CartLine, CartLineId};
use bazaar_catalog::{Product, ProductId};
use bazaar_core::UserId;

use crate::error::ServiceError;
use crate::store::{CartRepository, CatalogRepository};

/// A cart line together with the product it points at.
#[derive(Debug, Clone)]
pub struct CartEntry {
    pub line: CartLine,
    pub product: Product,
}

/// Per-buyer shopping carts. Every operation is scoped to the calling buyer.
#[derive(Debug, Clone)]
pub struct CartService<S> {
    store: S,
}

impl<S> CartService<S>
where
    S: CartRepository + CatalogRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Put `quantity` of a product in the cart, merging with an existing line.
    #[instrument(skip(self), fields(buyer_id = %buyer_id, product_id = %product_id))]
    pub async fn add(
        &self,
        buyer_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartLine, ServiceError> {
        let now = Utc::now();
        let line = CartLine::new(CartLineId::generate(), buyer_id, product_id, quantity, now)?;
        self.store
            .get_product(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product"))?;

        // An overflowing merge is a domain error, whichever store is behind.
        let existing = self.store.lines_for_buyer(buyer_id).await?;
        if let Some(mut current) = existing.into_iter().find(|l| l.product_id() == product_id) {
            current.merge(quantity, now)?;
        }

        let stored = self.store.add_or_merge_line(line).await?;
        debug!(cart_line_id = %stored.id_typed(), quantity = stored.quantity(), "cart line stored");
        Ok(stored)
    }

    pub async fn list(&self, buyer_id: UserId) -> Result<Vec<CartEntry>, ServiceError> {
        let lines = self.store.lines_for_buyer(buyer_id).await?;
        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            // Lines go with their product on delete; a miss here is a race.
            if let Some(product) = self.store.get_product(line.product_id()).await? {
                entries.push(CartEntry { line, product });
            }
        }
        Ok(entries)
    }

    pub async fn get(&self, buyer_id: UserId, id: CartLineId) -> Result<CartEntry, ServiceError> {
        let line = self
            .store
            .get_line(buyer_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("cart item"))?;
        let product = self
            .store
            .get_product(line.product_id())
            .await?
            .ok_or_else(|| ServiceError::not_found("product"))?;
        Ok(CartEntry { line, product })
    }

    #[instrument(skip(self), fields(buyer_id = %buyer_id, cart_line_id = %id))]
    pub async fn update_quantity(
        &self,
        buyer_id: UserId,
        id: CartLineId,
        quantity: i64,
    ) -> Result<CartLine, ServiceError> {
        let mut line = self
            .store
            .get_line(buyer_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("cart item"))?;
        line.set_quantity(quantity, Utc::now())?;
        self.store.save_line(&line).await?;
        Ok(line)
    }

    #[instrument(skip(self), fields(buyer_id = %buyer_id, cart_line_id = %id))]
    pub async fn remove(&self, buyer_id: UserId, id: CartLineId) -> Result<(), ServiceError> {
        if self.store.remove_line(buyer_id, id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("cart item"))
        }
    }
}

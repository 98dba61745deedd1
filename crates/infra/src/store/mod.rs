//! Storage boundary.
//!
//! Checkout needs several reads and writes to land together or not at all, so
//! the write path is expressed as a [`UnitOfWork`] obtained from
//! [`Store::begin`]. Everything done through a unit is invisible to other
//! callers until [`UnitOfWork::commit`]; dropping a unit or calling
//! [`UnitOfWork::rollback`] discards it.
//!
//! Plain reads and single-row writes go through the repository traits.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use bazaar_cart::{CartLine, CartLineId};
use bazaar_catalog::{Product, ProductId};
use bazaar_core::UserId;
use bazaar_orders::{Order, OrderId};

use crate::error::StoreError;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// One atomic unit of work.
///
/// Products read through [`UnitOfWork::lock_product`] stay locked against
/// other units until this one commits or rolls back.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Load a product and hold it for the rest of the unit.
    async fn lock_product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Persist a product previously obtained from `lock_product`.
    async fn save_product(&mut self, product: &Product) -> Result<(), StoreError>;

    /// The buyer's cart lines among `ids`. Lines owned by someone else and
    /// unknown ids are left out.
    async fn cart_lines(
        &mut self,
        buyer_id: UserId,
        ids: &[CartLineId],
    ) -> Result<Vec<CartLine>, StoreError>;

    /// Delete the buyer's cart lines among `ids`, returning how many went.
    async fn delete_cart_lines(
        &mut self,
        buyer_id: UserId,
        ids: &[CartLineId],
    ) -> Result<u64, StoreError>;

    /// Insert an order together with all of its lines.
    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

/// Source of units of work.
#[async_trait]
pub trait Store: Send + Sync {
    type Unit: UnitOfWork;

    async fn begin(&self) -> Result<Self::Unit, StoreError>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Delete the seller's product and the cart lines that point at it.
    ///
    /// Returns `false` if the seller lists no such product. A product that
    /// already appears on an order is kept and reported as
    /// [`StoreError::InUse`].
    async fn delete_product(&self, seller_id: UserId, id: ProductId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Insert `line`, or add its quantity to the buyer's existing line for the
    /// same product. Returns the stored line.
    async fn add_or_merge_line(&self, line: CartLine) -> Result<CartLine, StoreError>;

    async fn get_line(
        &self,
        buyer_id: UserId,
        id: CartLineId,
    ) -> Result<Option<CartLine>, StoreError>;

    async fn save_line(&self, line: &CartLine) -> Result<(), StoreError>;

    /// Returns `false` if the buyer had no such line.
    async fn remove_line(&self, buyer_id: UserId, id: CartLineId) -> Result<bool, StoreError>;

    async fn lines_for_buyer(&self, buyer_id: UserId) -> Result<Vec<CartLine>, StoreError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Orders placed by the buyer, newest first.
    async fn orders_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, StoreError>;

    /// Orders with at least one line for a product the seller lists, newest first.
    async fn orders_for_seller(&self, seller_id: UserId) -> Result<Vec<Order>, StoreError>;

    /// Persist the status, `updated_at` and version of an existing order.
    ///
    /// The write only lands if the stored order is still at `expected_version`;
    /// otherwise it fails with [`StoreError::Concurrency`].
    async fn save_status(&self, order: &Order, expected_version: u64) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    type Unit = S::Unit;

    async fn begin(&self) -> Result<Self::Unit, StoreError> {
        (**self).begin().await
    }
}

#[async_trait]
impl<S> CatalogRepository for Arc<S>
where
    S: CatalogRepository + ?Sized,
{
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        (**self).insert_product(product).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_products().await
    }

    async fn delete_product(&self, seller_id: UserId, id: ProductId) -> Result<bool, StoreError> {
        (**self).delete_product(seller_id, id).await
    }
}

#[async_trait]
impl<S> CartRepository for Arc<S>
where
    S: CartRepository + ?Sized,
{
    async fn add_or_merge_line(&self, line: CartLine) -> Result<CartLine, StoreError> {
        (**self).add_or_merge_line(line).await
    }

    async fn get_line(
        &self,
        buyer_id: UserId,
        id: CartLineId,
    ) -> Result<Option<CartLine>, StoreError> {
        (**self).get_line(buyer_id, id).await
    }

    async fn save_line(&self, line: &CartLine) -> Result<(), StoreError> {
        (**self).save_line(line).await
    }

    async fn remove_line(&self, buyer_id: UserId, id: CartLineId) -> Result<bool, StoreError> {
        (**self).remove_line(buyer_id, id).await
    }

    async fn lines_for_buyer(&self, buyer_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        (**self).lines_for_buyer(buyer_id).await
    }
}

#[async_trait]
impl<S> OrderRepository for Arc<S>
where
    S: OrderRepository + ?Sized,
{
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).get_order(id).await
    }

    async fn orders_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, StoreError> {
        (**self).orders_for_buyer(buyer_id).await
    }

    async fn orders_for_seller(&self, seller_id: UserId) -> Result<Vec<Order>, StoreError> {
        (**self).orders_for_seller(seller_id).await
    }

    async fn save_status(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
        (**self).save_status(order, expected_version).await
    }
}

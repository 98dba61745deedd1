use chrono::Utc;
use tracing::{info, instrument};

use bazaar_catalog::{NewProduct, Product, ProductId, ProductPatch};
use bazaar_core::UserId;

use super::finish;
use crate::error::ServiceError;
use crate::store::{CatalogRepository, Store, UnitOfWork};

/// Product listings.
#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S> CatalogService<S>
where
    S: Store + CatalogRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input), fields(seller_id = %seller_id))]
    pub async fn create_product(
        &self,
        seller_id: UserId,
        input: NewProduct,
    ) -> Result<Product, ServiceError> {
        let product = Product::create(ProductId::generate(), seller_id, input, Utc::now())?;
        self.store.insert_product(&product).await?;
        info!(product_id = %product.id_typed(), stock = product.stock(), "product listed");
        Ok(product)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product"))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.store.list_products().await?)
    }

    /// Edit a listing. Only the seller who owns it may do so.
    ///
    /// Runs under the product lock so an edit never overwrites a concurrent
    /// stock decrement.
    #[instrument(skip(self, patch), fields(seller_id = %seller_id, product_id = %id))]
    pub async fn update_product(
        &self,
        seller_id: UserId,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, ServiceError> {
        let mut unit = self.store.begin().await?;
        let outcome: Result<Product, ServiceError> = async {
            let mut product = unit
                .lock_product(id)
                .await?
                .ok_or_else(|| ServiceError::not_found("product"))?;
            if !product.is_sold_by(seller_id) {
                return Err(ServiceError::forbidden("product belongs to another seller"));
            }
            product.apply_patch(patch, Utc::now())?;
            unit.save_product(&product).await?;
            Ok(product)
        }
        .await;

        let product = finish(unit, outcome).await?;
        info!(price = product.price(), stock = product.stock(), "product updated");
        Ok(product)
    }

    /// Remove a listing owned by `seller_id`.
    ///
    /// Cart lines for the product go with it. A product that has been ordered
    /// stays listed and the call fails with [`ServiceError::Conflict`].
    #[instrument(skip(self), fields(seller_id = %seller_id, product_id = %id))]
    pub async fn delete_product(
        &self,
        seller_id: UserId,
        id: ProductId,
    ) -> Result<(), ServiceError> {
        let product = self.get_product(id).await?;
        if !product.is_sold_by(seller_id) {
            return Err(ServiceError::forbidden("product belongs to another seller"));
        }
        if !self.store.delete_product(seller_id, id).await? {
            return Err(ServiceError::not_found("product"));
        }
        info!("product removed");
        Ok(())
    }
}

//! Backend selection and a backend-agnostic facade over the services.

use std::sync::Arc;

use anyhow::Context;

use bazaar_cart::{CartLine, CartLineId};
use bazaar_catalog::{NewProduct, Product, ProductId, ProductPatch};
use bazaar_core::UserId;
use bazaar_infra::{CartEntry, InMemoryStore, PostgresStore, ServiceError, Services};
use bazaar_orders::{Order, OrderId, OrderStatus};

use crate::config::{AppConfig, StoreConfig};

/// The services wired over whichever store the process runs with.
#[derive(Debug, Clone)]
pub enum AppServices {
    InMemory(Services<Arc<InMemoryStore>>),
    Persistent(Services<Arc<PostgresStore>>),
}

/// Run the same expression against whichever backend is active.
macro_rules! on_backend {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            AppServices::InMemory($s) => $body,
            AppServices::Persistent($s) => $body,
        }
    };
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.store {
        StoreConfig::InMemory => {
            tracing::info!("using in-memory stores");
            Ok(AppServices::InMemory(Services::new(
                Arc::new(InMemoryStore::new()),
                config.services,
            )))
        }
        StoreConfig::Postgres {
            database_url,
            max_connections,
            run_migrations,
        } => {
            let store = PostgresStore::connect(database_url, *max_connections)
                .await
                .context("failed to connect to Postgres")?;
            if *run_migrations {
                store.migrate().await.context("failed to apply schema migration")?;
            }
            tracing::info!(max_connections, "using Postgres stores");
            Ok(AppServices::Persistent(Services::new(
                Arc::new(store),
                config.services,
            )))
        }
    }
}

impl AppServices {
    pub fn in_memory(config: bazaar_infra::ServiceConfig) -> Self {
        AppServices::InMemory(Services::new(Arc::new(InMemoryStore::new()), config))
    }

    // -------------------------
    // Catalog
    // -------------------------

    pub async fn create_product(
        &self,
        seller_id: UserId,
        input: NewProduct,
    ) -> Result<Product, ServiceError> {
        on_backend!(self, s => s.catalog.create_product(seller_id, input).await)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        on_backend!(self, s => s.catalog.list_products().await)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        on_backend!(self, s => s.catalog.get_product(id).await)
    }

    pub async fn update_product(
        &self,
        seller_id: UserId,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, ServiceError> {
        on_backend!(self, s => s.catalog.update_product(seller_id, id, patch).await)
    }

    pub async fn delete_product(
        &self,
        seller_id: UserId,
        id: ProductId,
    ) -> Result<(), ServiceError> {
        on_backend!(self, s => s.catalog.delete_product(seller_id, id).await)
    }

    // -------------------------
    // Carts
    // -------------------------

    pub async fn cart_add(
        &self,
        buyer_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartLine, ServiceError> {
        on_backend!(self, s => s.carts.add(buyer_id, product_id, quantity).await)
    }

    pub async fn cart_list(&self, buyer_id: UserId) -> Result<Vec<CartEntry>, ServiceError> {
        on_backend!(self, s => s.carts.list(buyer_id).await)
    }

    pub async fn cart_get(
        &self,
        buyer_id: UserId,
        id: CartLineId,
    ) -> Result<CartEntry, ServiceError> {
        on_backend!(self, s => s.carts.get(buyer_id, id).await)
    }

    pub async fn cart_update(
        &self,
        buyer_id: UserId,
        id: CartLineId,
        quantity: i64,
    ) -> Result<CartLine, ServiceError> {
        on_backend!(self, s => s.carts.update_quantity(buyer_id, id, quantity).await)
    }

    pub async fn cart_remove(&self, buyer_id: UserId, id: CartLineId) -> Result<(), ServiceError> {
        on_backend!(self, s => s.carts.remove(buyer_id, id).await)
    }

    // -------------------------
    // Checkout + orders
    // -------------------------

    pub async fn checkout_direct(
        &self,
        buyer_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, ServiceError> {
        on_backend!(self, s => s.checkout.direct(buyer_id, product_id, quantity).await)
    }

    pub async fn checkout_by_cart(
        &self,
        buyer_id: UserId,
        ids: &[CartLineId],
    ) -> Result<Order, ServiceError> {
        on_backend!(self, s => s.checkout.by_cart(buyer_id, ids).await)
    }

    pub async fn orders_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, ServiceError> {
        on_backend!(self, s => s.orders.for_buyer(buyer_id).await)
    }

    pub async fn orders_for_seller(&self, seller_id: UserId) -> Result<Vec<Order>, ServiceError> {
        on_backend!(self, s => s.orders.for_seller(seller_id).await)
    }

    pub async fn update_order_status(
        &self,
        actor: UserId,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ServiceError> {
        on_backend!(self, s => s.orders.update_status(actor, id, status).await)
    }
}

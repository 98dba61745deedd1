//! Infrastructure layer: storage backends and the application services that
//! run domain rules inside atomic units of work.

pub mod error;
pub mod services;
pub mod stock_ledger;
pub mod store;

pub use error::{ServiceError, StoreError};
pub use services::{
    CartEntry, CartService, CatalogService, CheckoutService, OrderService, ServiceConfig,
    Services,
};
pub use store::{
    CartRepository, CatalogRepository, InMemoryStore, OrderRepository, PostgresStore, Store,
    UnitOfWork,
};

#[cfg(test)]
mod integration_tests;

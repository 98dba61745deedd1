//! Application services.
//!
//! Each service is a plain struct over an injected store handle (usually an
//! `Arc` of one of the backends in [`crate::store`]). They hold no state of
//! their own beyond configuration.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use tracing::warn;

use bazaar_orders::{OrderBuilder, PlatformFee, TransitionPolicy};

pub use cart::{CartEntry, CartService};
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use orders::OrderService;

use crate::error::ServiceError;
use crate::store::{CartRepository, CatalogRepository, OrderRepository, Store, UnitOfWork};

/// Business knobs fixed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub platform_fee: PlatformFee,
    pub status_policy: TransitionPolicy,
}

/// All services wired over one store.
#[derive(Debug, Clone)]
pub struct Services<S> {
    pub catalog: CatalogService<S>,
    pub carts: CartService<S>,
    pub checkout: CheckoutService<S>,
    pub orders: OrderService<S>,
}

impl<S> Services<S>
where
    S: Store + CatalogRepository + CartRepository + OrderRepository + Clone,
{
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            carts: CartService::new(store.clone()),
            checkout: CheckoutService::new(store.clone(), OrderBuilder::new(config.platform_fee)),
            orders: OrderService::new(store, config.status_policy),
        }
    }
}

/// Commit `unit` if `outcome` succeeded, roll it back otherwise.
///
/// A failed rollback is logged; the caller still sees the original error,
/// and the backend discards the unit anyway once it is dropped.
pub(crate) async fn finish<U, T>(unit: U, outcome: Result<T, ServiceError>) -> Result<T, ServiceError>
where
    U: UnitOfWork,
{
    match outcome {
        Ok(value) => {
            unit.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = unit.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

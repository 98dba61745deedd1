use chrono::Utc;
use tracing::{info, instrument};

use bazaar_core::UserId;
use bazaar_orders::{Order, OrderId, OrderStatus, TransitionPolicy};

use crate::error::ServiceError;
use crate::store::OrderRepository;

/// Order queries and the seller-driven status update.
#[derive(Debug, Clone)]
pub struct OrderService<S> {
    store: S,
    policy: TransitionPolicy,
}

impl<S> OrderService<S>
where
    S: OrderRepository,
{
    pub fn new(store: S, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, ServiceError> {
        Ok(self.store.orders_for_buyer(buyer_id).await?)
    }

    pub async fn for_seller(&self, seller_id: UserId) -> Result<Vec<Order>, ServiceError> {
        Ok(self.store.orders_for_seller(seller_id).await?)
    }

    pub async fn get(&self, id: OrderId) -> Result<Order, ServiceError> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("order"))
    }

    /// Set an order's status. Stock is left as it is whatever the new status.
    #[instrument(skip(self), fields(actor = %actor, order_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        actor: UserId,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ServiceError> {
        let mut order = self.get(id).await?;
        let change = order.set_status(status, self.policy, Utc::now())?;
        self.store.save_status(&order, change.previous_version).await?;

        info!(from = %change.from, to = %change.to, "order status changed");
        Ok(order)
    }
}

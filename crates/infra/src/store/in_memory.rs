use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use bazaar_cart::{CartLine, CartLineId};
use bazaar_catalog::{Product, ProductId};
use bazaar_core::{AggregateRoot, UserId};
use bazaar_orders::{Order, OrderId};

use super::{CartRepository, CatalogRepository, OrderRepository, Store, UnitOfWork};
use crate::error::StoreError;

#[derive(Debug, Clone, Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    cart_lines: BTreeMap<CartLineId, CartLine>,
    orders: BTreeMap<OrderId, Order>,
}

impl State {
    fn orders_newest_first(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.values().filter(|o| keep(o)).cloned().collect();
        orders.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id_typed().cmp(&a.id_typed()))
        });
        orders
    }
}

/// In-memory store.
///
/// Intended for tests/dev. A unit of work holds the store lock for its whole
/// lifetime and stages its writes on a private copy of the state, so units
/// are fully serialized and a dropped unit leaves no trace.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl InMemoryStore {
    /// Insert a cart line as-is, bypassing the merge on add.
    pub(crate) async fn seed_cart_line(&self, line: CartLine) {
        self.state.lock().await.cart_lines.insert(line.id_typed(), line);
    }
}

/// Unit of work over [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryUnit {
    guard: OwnedMutexGuard<State>,
    staged: State,
}

#[async_trait]
impl Store for InMemoryStore {
    type Unit = InMemoryUnit;

    async fn begin(&self) -> Result<Self::Unit, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryUnit { guard, staged })
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnit {
    async fn lock_product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.staged.products.get(&id).cloned())
    }

    async fn save_product(&mut self, product: &Product) -> Result<(), StoreError> {
        let id = product.id_typed();
        match self.staged.products.get_mut(&id) {
            Some(slot) => {
                *slot = product.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("product {id}"))),
        }
    }

    async fn cart_lines(
        &mut self,
        buyer_id: UserId,
        ids: &[CartLineId],
    ) -> Result<Vec<CartLine>, StoreError> {
        Ok(self
            .staged
            .cart_lines
            .values()
            .filter(|l| l.owned_by(buyer_id) && ids.contains(&l.id_typed()))
            .cloned()
            .collect())
    }

    async fn delete_cart_lines(
        &mut self,
        buyer_id: UserId,
        ids: &[CartLineId],
    ) -> Result<u64, StoreError> {
        let before = self.staged.cart_lines.len();
        self.staged
            .cart_lines
            .retain(|id, line| !(line.owned_by(buyer_id) && ids.contains(id)));
        Ok((before - self.staged.cart_lines.len()) as u64)
    }

    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        let id = order.id_typed();
        if self.staged.orders.contains_key(&id) {
            return Err(StoreError::Constraint(format!("order {id} already exists")));
        }
        for line in order.lines() {
            if !self.staged.products.contains_key(&line.product_id) {
                return Err(StoreError::Constraint(format!(
                    "order line references unknown product {}",
                    line.product_id
                )));
            }
        }
        self.staged.orders.insert(id, order.clone());
        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        *self.guard = self.staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let id = product.id_typed();
        if state.products.contains_key(&id) {
            return Err(StoreError::Constraint(format!("product {id} already exists")));
        }
        state.products.insert(id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.state.lock().await.products.values().cloned().collect())
    }

    async fn delete_product(&self, seller_id: UserId, id: ProductId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if !state.products.get(&id).is_some_and(|p| p.is_sold_by(seller_id)) {
            return Ok(false);
        }
        let ordered = state
            .orders
            .values()
            .any(|o| o.lines().iter().any(|l| l.product_id == id));
        if ordered {
            return Err(StoreError::InUse(format!("product {id}")));
        }
        state.products.remove(&id);
        state.cart_lines.retain(|_, l| l.product_id() != id);
        Ok(true)
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn add_or_merge_line(&self, line: CartLine) -> Result<CartLine, StoreError> {
        let mut state = self.state.lock().await;
        if !state.products.contains_key(&line.product_id()) {
            return Err(StoreError::Constraint(format!(
                "cart line references unknown product {}",
                line.product_id()
            )));
        }

        let existing = state
            .cart_lines
            .values_mut()
            .find(|l| l.owned_by(line.buyer_id()) && l.product_id() == line.product_id());

        if let Some(existing) = existing {
            existing
                .merge(line.quantity(), line.updated_at())
                .map_err(|e| StoreError::Constraint(e.to_string()))?;
            return Ok(existing.clone());
        }

        state.cart_lines.insert(line.id_typed(), line.clone());
        Ok(line)
    }

    async fn get_line(
        &self,
        buyer_id: UserId,
        id: CartLineId,
    ) -> Result<Option<CartLine>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .cart_lines
            .get(&id)
            .filter(|l| l.owned_by(buyer_id))
            .cloned())
    }

    async fn save_line(&self, line: &CartLine) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let id = line.id_typed();
        match state.cart_lines.get_mut(&id) {
            Some(slot) if slot.owned_by(line.buyer_id()) => {
                *slot = line.clone();
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("cart line {id}"))),
        }
    }

    async fn remove_line(&self, buyer_id: UserId, id: CartLineId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let owned = state
            .cart_lines
            .get(&id)
            .is_some_and(|l| l.owned_by(buyer_id));
        if owned {
            state.cart_lines.remove(&id);
        }
        Ok(owned)
    }

    async fn lines_for_buyer(&self, buyer_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        let state = self.state.lock().await;
        let mut lines: Vec<CartLine> = state
            .cart_lines
            .values()
            .filter(|l| l.owned_by(buyer_id))
            .cloned()
            .collect();
        lines.sort_by_key(|l| (l.created_at(), l.id_typed()));
        Ok(lines)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.state.lock().await.orders.get(&id).cloned())
    }

    async fn orders_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.orders_newest_first(|o| o.is_placed_by(buyer_id)))
    }

    async fn orders_for_seller(&self, seller_id: UserId) -> Result<Vec<Order>, StoreError> {
        let state = self.state.lock().await;
        let sells = |product_id: &ProductId| {
            state
                .products
                .get(product_id)
                .is_some_and(|p| p.is_sold_by(seller_id))
        };
        Ok(state.orders_newest_first(|o| o.lines().iter().any(|l| sells(&l.product_id))))
    }

    async fn save_status(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let id = order.id_typed();
        let stored = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;

        if stored.version() != expected_version {
            return Err(StoreError::Concurrency(format!(
                "order {id}: expected version {expected_version}, found {}",
                stored.version()
            )));
        }

        // Lines and totals are immutable; only the lifecycle fields move.
        let mut record = stored.to_record();
        record.status = order.status();
        record.updated_at = order.updated_at();
        record.version = order.version();
        *stored = Order::from(record);
        Ok(())
    }
}

//! Checkout: turning a direct purchase or a set of cart lines into an order.
//!
//! ```text
//! begin unit
//!   ↓
//! reserve + decrement stock (products locked, ascending id order)
//!   ↓
//! build order at current prices
//!   ↓
//! insert order (and, for cart checkout, delete the consumed cart lines)
//!   ↓
//! commit  ── any failure above rolls the whole unit back
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use bazaar_cart::CartLineId;
use bazaar_catalog::ProductId;
use bazaar_core::{DomainError, UserId};
use bazaar_orders::{LineItem, Order, OrderBuilder, OrderId};

use super::finish;
use crate::error::ServiceError;
use crate::stock_ledger::reserve_and_decrement;
use crate::store::{Store, UnitOfWork};

/// Checkout orchestrator.
#[derive(Debug, Clone)]
pub struct CheckoutService<S> {
    store: S,
    builder: OrderBuilder,
}

impl<S> CheckoutService<S>
where
    S: Store,
{
    pub fn new(store: S, builder: OrderBuilder) -> Self {
        Self { store, builder }
    }

    /// Buy `quantity` units of one product.
    #[instrument(skip(self), fields(buyer_id = %buyer_id, product_id = %product_id))]
    pub async fn direct(
        &self,
        buyer_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, ServiceError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidQuantity(quantity).into());
        }

        let now = Utc::now();
        let mut unit = self.store.begin().await?;
        let outcome = self
            .place_direct(&mut unit, buyer_id, product_id, quantity, now)
            .await;

        let order = finish(unit, outcome).await.inspect_err(|err| {
            warn!(error = %err, "direct checkout rolled back");
        })?;

        info!(
            order_id = %order.id_typed(),
            grand_total = order.grand_total(),
            "direct checkout committed"
        );
        Ok(order)
    }

    /// Check out the buyer's cart lines among `cart_line_ids`.
    ///
    /// Ids that are unknown or belong to another buyer are skipped. If none
    /// remain the checkout fails with `NotFound`.
    #[instrument(skip(self, cart_line_ids), fields(buyer_id = %buyer_id, requested = cart_line_ids.len()))]
    pub async fn by_cart(
        &self,
        buyer_id: UserId,
        cart_line_ids: &[CartLineId],
    ) -> Result<Order, ServiceError> {
        let ids: Vec<CartLineId> = cart_line_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Err(ServiceError::not_found("cart items"));
        }

        let now = Utc::now();
        let mut unit = self.store.begin().await?;
        let outcome = self.place_from_cart(&mut unit, buyer_id, &ids, now).await;

        let order = finish(unit, outcome).await.inspect_err(|err| {
            warn!(error = %err, "cart checkout rolled back");
        })?;

        info!(
            order_id = %order.id_typed(),
            lines = order.lines().len(),
            grand_total = order.grand_total(),
            "cart checkout committed"
        );
        Ok(order)
    }

    async fn place_direct(
        &self,
        unit: &mut S::Unit,
        buyer_id: UserId,
        product_id: ProductId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<Order, ServiceError> {
        let reservation = reserve_and_decrement(unit, product_id, quantity, now).await?;

        let order = self.builder.build(
            OrderId::generate(),
            buyer_id,
            vec![LineItem {
                product_id,
                unit_price: reservation.product.price(),
                quantity,
            }],
            now,
        )?;

        unit.insert_order(&order).await?;
        Ok(order)
    }

    async fn place_from_cart(
        &self,
        unit: &mut S::Unit,
        buyer_id: UserId,
        ids: &[CartLineId],
        now: DateTime<Utc>,
    ) -> Result<Order, ServiceError> {
        let lines = unit.cart_lines(buyer_id, ids).await?;
        if lines.is_empty() {
            return Err(ServiceError::not_found("cart items"));
        }

        // Several lines may name the same product; stock is checked against
        // their sum. BTreeMap order doubles as the lock order.
        let mut wanted: BTreeMap<ProductId, i64> = BTreeMap::new();
        for line in &lines {
            let total = wanted.entry(line.product_id()).or_insert(0);
            *total = total
                .checked_add(line.quantity())
                .ok_or_else(|| DomainError::invariant("cart quantity overflow"))?;
        }

        let mut prices: BTreeMap<ProductId, u64> = BTreeMap::new();
        for (&product_id, &quantity) in &wanted {
            let reservation = reserve_and_decrement(unit, product_id, quantity, now).await?;
            prices.insert(product_id, reservation.product.price());
        }

        let items = lines
            .iter()
            .map(|line| {
                let unit_price = prices.get(&line.product_id()).copied().ok_or_else(|| {
                    DomainError::invariant(format!("no price for product {}", line.product_id()))
                })?;
                Ok(LineItem {
                    product_id: line.product_id(),
                    unit_price,
                    quantity: line.quantity(),
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let order = self.builder.build(OrderId::generate(), buyer_id, items, now)?;
        unit.insert_order(&order).await?;

        let consumed: Vec<CartLineId> = lines.iter().map(|l| l.id_typed()).collect();
        let deleted = unit.delete_cart_lines(buyer_id, &consumed).await?;
        if deleted != consumed.len() as u64 {
            return Err(ServiceError::Conflict(format!(
                "expected to clear {} cart lines, cleared {deleted}",
                consumed.len()
            )));
        }

        Ok(order)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_catalog::ProductId;
use bazaar_core::{DomainError, DomainResult, UserId};

use crate::order::{Order, OrderId, OrderLine, OrderLineId};
use crate::pricing::{self, PlatformFee};

/// One requested line: which product, at what price, how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub unit_price: u64,
    pub quantity: i64,
}

/// Assembles priced line items into a `Pending` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderBuilder {
    fee: PlatformFee,
}

impl OrderBuilder {
    pub fn new(fee: PlatformFee) -> Self {
        Self { fee }
    }

    pub fn build(
        &self,
        order_id: OrderId,
        buyer_id: UserId,
        items: Vec<LineItem>,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }

        let lines = items
            .into_iter()
            .map(|item| {
                Ok(OrderLine {
                    id: OrderLineId::generate(),
                    product_id: item.product_id,
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    subtotal: pricing::subtotal(item.unit_price, item.quantity)?,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let grand_total = pricing::grand_total(lines.iter().map(|l| l.subtotal), self.fee)?;

        Ok(Order::pending(
            order_id,
            buyer_id,
            lines,
            self.fee.amount(),
            grand_total,
            now,
        ))
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_catalog::ProductId;
use bazaar_core::{AggregateRoot, DomainResult, UserId, ValueObject, typed_id};

use crate::status::{OrderStatus, TransitionPolicy};

typed_id!(
    /// Order identifier.
    OrderId
);

typed_id!(
    /// Order line identifier.
    OrderLineId
);

/// Order line: price snapshot, quantity and subtotal for one product.
///
/// Lines are historical records. Later price changes on the product never
/// touch them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub product_id: ProductId,
    /// Price in smallest currency unit at purchase time.
    pub unit_price: u64,
    pub quantity: i64,
    pub subtotal: u64,
}

impl ValueObject for OrderLine {}

/// Flat, storage-friendly view of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub lines: Vec<OrderLine>,
    pub platform_fee: u64,
    pub grand_total: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

/// Result of a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// Version the order was at before the change.
    pub previous_version: u64,
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    buyer_id: UserId,
    lines: Vec<OrderLine>,
    platform_fee: u64,
    grand_total: u64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Order {
    /// Only the builder creates new orders, so totals are always priced.
    pub(crate) fn pending(
        id: OrderId,
        buyer_id: UserId,
        lines: Vec<OrderLine>,
        platform_fee: u64,
        grand_total: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            buyer_id,
            lines,
            platform_fee,
            grand_total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn buyer_id(&self) -> UserId {
        self.buyer_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn platform_fee(&self) -> u64 {
        self.platform_fee
    }

    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_placed_by(&self, buyer_id: UserId) -> bool {
        self.buyer_id == buyer_id
    }

    /// Record a seller's status decision.
    ///
    /// Stock is not touched here: a `Failed` order keeps its decrement.
    pub fn set_status(
        &mut self,
        to: OrderStatus,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> DomainResult<StatusChange> {
        policy.check(self.status, to)?;

        let change = StatusChange {
            order_id: self.id,
            from: self.status,
            to,
            previous_version: self.version,
        };
        self.status = to;
        self.updated_at = now;
        self.version += 1;
        Ok(change)
    }

    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id,
            buyer_id: self.buyer_id,
            lines: self.lines.clone(),
            platform_fee: self.platform_fee,
            grand_total: self.grand_total,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }
}

/// Rehydration keeps stored totals as-is; orders are never re-priced.
impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        Self {
            id: record.id,
            buyer_id: record.buyer_id,
            lines: record.lines,
            platform_fee: record.platform_fee,
            grand_total: record.grand_total,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            version: record.version,
        }
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{LineItem, OrderBuilder};
    use crate::pricing::PlatformFee;
    use bazaar_core::DomainError;

    fn test_order() -> Order {
        OrderBuilder::new(PlatformFee::new(50))
            .build(
                OrderId::generate(),
                UserId::new(),
                vec![LineItem {
                    product_id: ProductId::generate(),
                    unit_price: 1000,
                    quantity: 3,
                }],
                Utc::now(),
            )
            .unwrap()
    }

    #[test]
    fn set_status_bumps_version_and_timestamp() {
        let mut order = test_order();
        let created = order.updated_at();
        let later = created + chrono::Duration::seconds(5);

        let change = order
            .set_status(OrderStatus::Success, TransitionPolicy::Permissive, later)
            .unwrap();

        assert_eq!(change.from, OrderStatus::Pending);
        assert_eq!(change.to, OrderStatus::Success);
        assert_eq!(change.previous_version, 1);
        assert_eq!(order.version(), 2);
        assert_eq!(order.updated_at(), later);
        assert_eq!(order.created_at(), created);
    }

    #[test]
    fn permissive_policy_can_reopen_an_order() {
        let mut order = test_order();
        order
            .set_status(OrderStatus::Success, TransitionPolicy::Permissive, Utc::now())
            .unwrap();
        order
            .set_status(OrderStatus::Pending, TransitionPolicy::Permissive, Utc::now())
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn strict_policy_rejects_leaving_a_terminal_state() {
        let mut order = test_order();
        order
            .set_status(OrderStatus::Failed, TransitionPolicy::Strict, Utc::now())
            .unwrap();
        let err = order
            .set_status(OrderStatus::Success, TransitionPolicy::Strict, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(order.status(), OrderStatus::Failed);
        assert_eq!(order.version(), 2);
    }

    #[test]
    fn status_change_keeps_totals() {
        let mut order = test_order();
        let total = order.grand_total();
        let lines = order.lines().to_vec();
        order
            .set_status(OrderStatus::Failed, TransitionPolicy::Permissive, Utc::now())
            .unwrap();
        assert_eq!(order.grand_total(), total);
        assert_eq!(order.lines(), lines.as_slice());
    }

    #[test]
    fn rehydration_does_not_reprice() {
        let order = test_order();
        let mut record = order.to_record();
        record.grand_total = 1;
        let restored = Order::from(record);
        assert_eq!(restored.grand_total(), 1);
        assert_eq!(restored.lines(), order.lines());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_catalog::ProductId;
use bazaar_core::{DomainError, DomainResult, Entity, UserId, typed_id};

typed_id!(
    /// Cart line identifier.
    CartLineId
);

/// Entity: one product with a quantity in a buyer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    id: CartLineId,
    buyer_id: UserId,
    product_id: ProductId,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn ensure_positive(quantity: i64) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::InvalidQuantity(quantity));
    }
    Ok(())
}

impl CartLine {
    pub fn new(
        id: CartLineId,
        buyer_id: UserId,
        product_id: ProductId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        ensure_positive(quantity)?;
        Ok(Self {
            id,
            buyer_id,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a stored line.
    pub fn restore(
        id: CartLineId,
        buyer_id: UserId,
        product_id: ProductId,
        quantity: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        ensure_positive(quantity)
            .map_err(|_| DomainError::invariant(format!("cart line {id} has quantity {quantity}")))?;
        Ok(Self {
            id,
            buyer_id,
            product_id,
            quantity,
            created_at,
            updated_at,
        })
    }

    pub fn id_typed(&self) -> CartLineId {
        self.id
    }

    pub fn buyer_id(&self) -> UserId {
        self.buyer_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn owned_by(&self, buyer_id: UserId) -> bool {
        self.buyer_id == buyer_id
    }

    /// Adding a product already in the cart increases the existing line.
    pub fn merge(&mut self, additional: i64, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_positive(additional)?;
        self.quantity = self
            .quantity
            .checked_add(additional)
            .ok_or_else(|| DomainError::invariant("cart quantity overflow"))?;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_positive(quantity)?;
        self.quantity = quantity;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for CartLine {
    type Id = CartLineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{DomainError, DomainResult, Entity, UserId, typed_id};

use crate::stock::StockMovement;

typed_id!(
    /// Product identifier.
    ProductId
);

/// Input for listing a new product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in smallest currency unit. Signed so negative input can be rejected
    /// with a field error instead of a deserialization failure.
    pub price: i64,
    pub stock: i64,
    #[serde(default)]
    pub image: Option<String>,
}

/// Partial update of a product listing. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub image: Option<String>,
}

/// Flat, storage-friendly view of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub seller_id: UserId,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub stock: i64,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entity: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    seller_id: UserId,
    name: String,
    description: String,
    price: u64,
    stock: i64,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_field("name", "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: i64) -> DomainResult<u64> {
    u64::try_from(price).map_err(|_| DomainError::invalid_field("price", "must not be negative"))
}

fn validate_stock(stock: i64) -> DomainResult<i64> {
    if stock < 0 {
        return Err(DomainError::invalid_field("stock", "must not be negative"));
    }
    Ok(stock)
}

impl Product {
    /// Validate and create a new listing owned by `seller_id`.
    pub fn create(
        id: ProductId,
        seller_id: UserId,
        input: NewProduct,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            seller_id,
            name: validate_name(&input.name)?,
            description: input.description,
            price: validate_price(input.price)?,
            stock: validate_stock(input.stock)?,
            image: input.image,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn seller_id(&self) -> UserId {
        self.seller_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_sold_by(&self, seller_id: UserId) -> bool {
        self.seller_id == seller_id
    }

    /// Apply a seller's edit. All fields are validated before any is applied.
    pub fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        let price = patch.price.map(validate_price).transpose()?;
        let stock = patch.stock.map(validate_stock).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(stock) = stock {
            self.stock = stock;
        }
        if patch.image.is_some() {
            self.image = patch.image;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Check-and-decrement: take `quantity` units out of stock.
    ///
    /// This is the only operation that lowers stock. It never increases it.
    pub fn reserve(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<StockMovement> {
        if quantity <= 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        if self.stock < quantity {
            return Err(DomainError::InsufficientStock {
                product_id: self.id.0,
                requested: quantity,
                available: self.stock,
            });
        }

        let before = self.stock;
        self.stock -= quantity;
        self.updated_at = now;

        Ok(StockMovement {
            product_id: self.id,
            quantity,
            before,
            after: self.stock,
        })
    }

    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            seller_id: self.seller_id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            stock: self.stock,
            image: self.image.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        if record.stock < 0 {
            return Err(DomainError::invariant(format!(
                "product {} has negative stock {}",
                record.id, record.stock
            )));
        }
        Ok(Self {
            id: record.id,
            seller_id: record.seller_id,
            name: record.name,
            description: record.description,
            price: record.price,
            stock: record.stock,
            image: record.image,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_cart::{CartLine, CartLineId};
use bazaar_catalog::{NewProduct, Product, ProductId, ProductPatch};
use bazaar_core::UserId;
use bazaar_infra::CartEntry;
use bazaar_orders::{Order, OrderId, OrderLine, OrderLineId, OrderStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub stock: i64,
    pub image: Option<String>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(body: CreateProductRequest) -> Self {
        NewProduct {
            name: body.name,
            description: body.description,
            price: body.price,
            stock: body.stock,
            image: body.image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub image: Option<String>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(body: UpdateProductRequest) -> Self {
        ProductPatch {
            name: body.name,
            description: body.description,
            price: body.price,
            stock: body.stock,
            image: body.image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartLineRequest {
    pub qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct DirectCheckoutRequest {
    pub product_id: String,
    pub qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct CartCheckoutRequest {
    #[serde(rename = "itemIds")]
    pub item_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ProductResponse {
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

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id_typed(),
            seller_id: p.seller_id(),
            name: p.name().to_string(),
            description: p.description().to_string(),
            price: p.price(),
            stock: p.stock(),
            image: p.image().map(str::to_string),
            created_at: p.created_at(),
            updated_at: p.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub id: CartLineId,
    pub buyer_id: UserId,
    pub product_id: ProductId,
    pub qty: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&CartLine> for CartLineResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id_typed(),
            buyer_id: line.buyer_id(),
            product_id: line.product_id(),
            qty: line.quantity(),
            product: None,
            created_at: line.created_at(),
            updated_at: line.updated_at(),
        }
    }
}

impl From<&CartEntry> for CartLineResponse {
    fn from(entry: &CartEntry) -> Self {
        Self {
            product: Some(ProductResponse::from(&entry.product)),
            ..CartLineResponse::from(&entry.line)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderLineResponse {
    pub id: OrderLineId,
    pub product_id: ProductId,
    pub price: u64,
    pub qty: i64,
    pub subtotal: u64,
}

impl From<&OrderLine> for OrderLineResponse {
    fn from(line: &OrderLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            price: line.unit_price,
            qty: line.quantity,
            subtotal: line.subtotal,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub total_price: u64,
    pub platform_fee: u64,
    pub lines: Vec<OrderLineResponse>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id_typed(),
            buyer_id: order.buyer_id(),
            total_price: order.grand_total(),
            platform_fee: order.platform_fee(),
            lines: order.lines().iter().map(OrderLineResponse::from).collect(),
            status: order.status(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

// -------------------------
// Envelope
// -------------------------

#[derive(Debug, Serialize)]
struct Success<T> {
    status: &'static str,
    data: T,
}

/// `{ "status": "success", "data": ... }` with the given HTTP status.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> axum::response::Response {
    (
        status,
        axum::Json(Success {
            status: "success",
            data,
        }),
    )
        .into_response()
}

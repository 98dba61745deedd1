use axum::Router;

pub mod carts;
pub mod common;
pub mod products;
pub mod system;
pub mod transactions;

/// Router for all identity-scoped endpoints (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/carts", carts::router())
        .nest("/transactions", transactions::router())
}

//! Product catalog domain module.
//!
//! Products carry the sellable stock count. The stock-ledger rule (check and
//! decrement) lives here as pure domain logic; locking and persistence are the
//! infra layer's job.

pub mod product;
pub mod stock;

pub use product::{NewProduct, Product, ProductId, ProductPatch, ProductRecord};
pub use stock::StockMovement;

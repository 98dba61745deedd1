//! `bazaar-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog, cart
//! and order crates (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::AggregateRoot;
pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldError};
pub use id::{AggregateId, UserId};
pub use value_object::ValueObject;

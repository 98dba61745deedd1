//! Shopping cart domain module.
//!
//! A cart is simply the set of [`CartLine`]s owned by one buyer. Lines are
//! merged on repeated adds and consumed by cart checkout.

pub mod line;

pub use line::{CartLine, CartLineId};

//! Orders domain module.
//!
//! Pricing, the `Order` aggregate, the builder that assembles priced lines into
//! an order, and the status lifecycle. Deterministic domain logic only (no IO,
//! no HTTP, no storage).

pub mod builder;
pub mod order;
pub mod pricing;
pub mod status;

pub use builder::{LineItem, OrderBuilder};
pub use order::{Order, OrderId, OrderLine, OrderLineId, OrderRecord, StatusChange};
pub use pricing::{DEFAULT_PLATFORM_FEE, PlatformFee, grand_total, subtotal};
pub use status::{OrderStatus, TransitionPolicy};

//! Application services wiring the domain to the stores.

pub mod cart;
pub mod orders;

pub use cart::CartService;
pub use orders::{OrderListing, OrderService};

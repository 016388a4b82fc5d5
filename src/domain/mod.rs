//! Domain model: cart aggregate, order record, pricing rules.

pub mod cart;
pub mod order;
pub mod pricing;

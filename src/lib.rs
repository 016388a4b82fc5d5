//! Storefront cart and order service.
//!
//! The transactional heart of a storefront: per-user carts, authoritative
//! pricing, atomic cart-to-order conversion, and the order status lifecycle,
//! exposed over REST.
//!
//! ## Layout
//! - [`domain`] — cart aggregate, order record, pricing rules
//! - [`store`] — versioned persistence (Postgres and in-memory)
//! - [`service`] — cart and order operations over the stores
//! - [`api`] — axum router and handlers
//! - [`catalog`] / [`identity`] — the two external-collaborator contracts

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod service;
pub mod store;

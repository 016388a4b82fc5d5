//! Persistence traits for carts and orders.
//!
//! Both backends enforce the same two guarantees: cart writes are guarded by
//! an optimistic version token, and order creation clears the owning cart in
//! the same atomic unit.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::order::{Order, OrderStatus};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgCartStore, PgOrderStore};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The record changed since it was read; the write was not applied.
    #[error("stale version, record was modified concurrently")]
    VersionConflict,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A cart together with the version token it was read at.
#[derive(Clone, Debug, Default)]
pub struct CartRecord {
    pub cart: Cart,
    pub version: i64,
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads the principal's cart. A principal that has never written a cart
    /// gets an empty one at version 0.
    async fn load(&self, user_id: Uuid) -> Result<CartRecord, StoreError>;

    /// Persists the cart if the stored version still equals
    /// `expected_version`, incrementing it. Fails with
    /// [`StoreError::VersionConflict`] when another writer got there first.
    async fn save(&self, user_id: Uuid, cart: &Cart, expected_version: i64)
        -> Result<(), StoreError>;
}

/// One page of the global order listing plus the unpaged total.
#[derive(Clone, Debug)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts the order and clears its owner's cart atomically, guarded by
    /// the cart version read at checkout time. On a version conflict neither
    /// write is applied.
    async fn create(&self, order: &Order, expected_cart_version: i64) -> Result<(), StoreError>;

    async fn fetch(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;

    /// All orders for one principal, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;

    /// Global listing, newest first, optionally filtered by exact status.
    async fn list_all(
        &self,
        status: Option<OrderStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<OrderPage, StoreError>;

    /// Compare-and-set on order status. Returns the updated order, or `None`
    /// when the current status no longer equals `from`.
    async fn set_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;
}

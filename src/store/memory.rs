//! In-memory store for tests and local development.
//!
//! A single lock over carts and orders makes the checkout unit (order insert +
//! cart clear) trivially atomic, mirroring the Postgres transaction.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::order::{Order, OrderStatus};
use crate::store::{CartRecord, CartStore, OrderPage, OrderStore, StoreError};

#[derive(Default)]
struct Inner {
    carts: HashMap<Uuid, CartRecord>,
    // Insertion order is creation order; listings iterate in reverse.
    orders: Vec<Order>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn load(&self, user_id: Uuid) -> Result<CartRecord, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.carts.get(&user_id).cloned().unwrap_or_default())
    }

    async fn save(
        &self,
        user_id: Uuid,
        cart: &Cart,
        expected_version: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.write();
        let current = inner.carts.get(&user_id).map_or(0, |r| r.version);
        if current != expected_version {
            return Err(StoreError::VersionConflict);
        }
        inner.carts.insert(
            user_id,
            CartRecord {
                cart: cart.clone(),
                version: expected_version + 1,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create(&self, order: &Order, expected_cart_version: i64) -> Result<(), StoreError> {
        let mut inner = self.write();
        let current = inner.carts.get(&order.user_id).map_or(0, |r| r.version);
        if current != expected_cart_version {
            return Err(StoreError::VersionConflict);
        }
        inner.carts.insert(
            order.user_id,
            CartRecord {
                cart: Cart::default(),
                version: expected_cart_version + 1,
            },
        );
        inner.orders.push(order.clone());
        Ok(())
    }

    async fn fetch(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all(
        &self,
        status: Option<OrderStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<OrderPage, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let matching: Vec<&Order> = inner
            .orders
            .iter()
            .rev()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect();
        let total = matching.len() as i64;
        let orders = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(OrderPage { orders, total })
    }

    async fn set_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let mut inner = self.write();
        let Some(order) = inner.orders.iter_mut().find(|o| o.id == order_id) else {
            return Ok(None);
        };
        if order.status != from {
            return Ok(None);
        }
        order.status = to;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::LineItem;
    use crate::domain::order::PaymentMethod;
    use crate::domain::pricing;
    use rust_decimal::Decimal;

    fn cart_with_item(product_id: Uuid) -> Cart {
        let mut cart = Cart::default();
        cart.add_item(LineItem {
            product_id,
            title: "Widget".into(),
            price: Decimal::new(3000, 2),
            image_url: None,
            quantity: 2,
        });
        cart
    }

    #[tokio::test]
    async fn test_save_bumps_version() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let cart = cart_with_item(Uuid::new_v4());

        store.save(user, &cart, 0).await.unwrap();
        let record = store.load(user).await.unwrap();
        assert_eq!(record.version, 1);
        assert_eq!(record.cart, cart);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let cart = cart_with_item(Uuid::new_v4());

        // two writers read version 0; only the first may win
        store.save(user, &cart, 0).await.unwrap();
        let err = store.save(user, &cart, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict));
        assert_eq!(store.load(user).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_create_clears_cart_atomically() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let cart = cart_with_item(Uuid::new_v4());
        store.save(user, &cart, 0).await.unwrap();

        let order = Order::from_cart(user, &cart, pricing::price(cart.subtotal), None, PaymentMethod::Cod);
        store.create(&order, 1).await.unwrap();

        let record = store.load(user).await.unwrap();
        assert!(record.cart.is_empty());
        assert_eq!(record.version, 2);
        assert!(store.fetch(order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_with_stale_cart_leaves_both_untouched() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let cart = cart_with_item(Uuid::new_v4());
        store.save(user, &cart, 0).await.unwrap();

        let order = Order::from_cart(user, &cart, pricing::price(cart.subtotal), None, PaymentMethod::Cod);
        let err = store.create(&order, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict));

        assert!(!store.load(user).await.unwrap().cart.is_empty());
        assert!(store.fetch(order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_cas_rejects_stale_read() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let cart = cart_with_item(Uuid::new_v4());
        store.save(user, &cart, 0).await.unwrap();
        let order = Order::from_cart(user, &cart, pricing::price(cart.subtotal), None, PaymentMethod::Cod);
        store.create(&order, 1).await.unwrap();

        // two admins race from the same pending read; exactly one wins
        let won = store
            .set_status(order.id, OrderStatus::Pending, OrderStatus::Paid)
            .await
            .unwrap();
        assert_eq!(won.unwrap().status, OrderStatus::Paid);
        let lost = store
            .set_status(order.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert!(lost.is_none());
        assert_eq!(
            store.fetch(order.id).await.unwrap().unwrap().status,
            OrderStatus::Paid
        );
    }
}

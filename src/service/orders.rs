//! Checkout, order status transitions, and order queries.

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::order::{Order, OrderStatus, PaymentMethod};
use crate::domain::pricing;
use crate::error::{Error, Result};
use crate::store::{CartStore, OrderStore};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// One page of the administrative order listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListing {
    pub orders: Vec<Order>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct OrderService {
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(carts: Arc<dyn CartStore>, orders: Arc<dyn OrderStore>) -> Self {
        Self { carts, orders }
    }

    /// Converts the principal's cart into a `pending` order and clears the
    /// cart, atomically. The order freezes the cart's line items and the
    /// totals priced from its current subtotal; an interleaved cart write
    /// aborts the whole checkout with [`Error::Conflict`].
    pub async fn checkout(
        &self,
        user_id: Uuid,
        shipping_address: Option<serde_json::Value>,
        payment_method: PaymentMethod,
    ) -> Result<Order> {
        let record = self.carts.load(user_id).await?;
        if record.cart.is_empty() {
            return Err(Error::InvalidState("cart is empty"));
        }
        let quote = pricing::price(record.cart.subtotal);
        let order = Order::from_cart(user_id, &record.cart, quote, shipping_address, payment_method);
        self.orders.create(&order, record.version).await?;
        Ok(order)
    }

    /// The principal's own orders, newest first.
    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<Order>> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// A single order, only if owned by the principal. An order belonging to
    /// someone else is reported exactly like a nonexistent one.
    pub async fn get_for(&self, user_id: Uuid, order_id: Uuid) -> Result<Order> {
        match self.orders.fetch(order_id).await? {
            Some(order) if order.user_id == user_id => Ok(order),
            _ => Err(Error::NotFound("order")),
        }
    }

    /// Global listing with optional status filter. `page` and `limit` are
    /// clamped to sane bounds; a page past the end is empty, not an error.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<OrderListing> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let result = self
            .orders
            .list_all(status, (page - 1) * limit, limit)
            .await?;
        let total_pages = (result.total + limit - 1) / limit;
        Ok(OrderListing {
            orders: result.orders,
            page,
            limit,
            total: result.total,
            total_pages,
        })
    }

    /// Applies a status transition under a compare-and-set on the current
    /// status. When two transitions race from the same read, exactly one
    /// wins; the loser sees the advanced status as an illegal starting point.
    pub async fn transition(&self, order_id: Uuid, requested: OrderStatus) -> Result<Order> {
        let order = self
            .orders
            .fetch(order_id)
            .await?
            .ok_or(Error::NotFound("order"))?;
        if !order.status.can_transition_to(requested) {
            return Err(Error::InvalidTransition {
                from: order.status,
                to: requested,
            });
        }
        match self.orders.set_status(order_id, order.status, requested).await? {
            Some(updated) => Ok(updated),
            None => {
                // lost the race; report against the status that actually won
                let current = self
                    .orders
                    .fetch(order_id)
                    .await?
                    .ok_or(Error::NotFound("order"))?;
                Err(Error::InvalidTransition {
                    from: current.status,
                    to: requested,
                })
            }
        }
    }
}

//! Postgres-backed cart and order stores.
//!
//! Cart rows carry a `version` column checked and incremented on every write;
//! checkout wraps the order insert and the versioned cart clear in a single
//! transaction.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::cart::{Cart, LineItem};
use crate::domain::order::{Order, OrderStatus};
use crate::store::{CartRecord, CartStore, OrderPage, OrderStore, StoreError};

#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    items: Json<Vec<LineItem>>,
    subtotal: Decimal,
    version: i64,
}

impl From<CartRow> for CartRecord {
    fn from(row: CartRow) -> Self {
        CartRecord {
            cart: Cart {
                items: row.items.0,
                subtotal: row.subtotal,
            },
            version: row.version,
        }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn load(&self, user_id: Uuid) -> Result<CartRecord, StoreError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT items, subtotal, version FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CartRecord::from).unwrap_or_default())
    }

    async fn save(
        &self,
        user_id: Uuid,
        cart: &Cart,
        expected_version: i64,
    ) -> Result<(), StoreError> {
        // Upsert keyed on user_id. The conditional update only applies when
        // the stored version still matches; a lost race returns no row.
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO carts (user_id, items, subtotal, version, updated_at) \
             VALUES ($1, $2, $3, $4 + 1, now()) \
             ON CONFLICT (user_id) DO UPDATE \
             SET items = EXCLUDED.items, subtotal = EXCLUDED.subtotal, \
                 version = carts.version + 1, updated_at = now() \
             WHERE carts.version = $4 \
             RETURNING version",
        )
        .bind(user_id)
        .bind(Json(&cart.items))
        .bind(cart.subtotal)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(_) => Ok(()),
            None => Err(StoreError::VersionConflict),
        }
    }
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: &Order, expected_cart_version: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, user_id, items, subtotal, tax, shipping, total, status, \
             shipping_address, payment_method, payment_transaction, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(order.subtotal)
        .bind(order.tax)
        .bind(order.shipping)
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(&order.shipping_address)
        .bind(order.payment_method.as_str())
        .bind(&order.payment_transaction)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        let cleared = sqlx::query(
            "UPDATE carts SET items = '[]', subtotal = 0, version = version + 1, \
             updated_at = now() WHERE user_id = $1 AND version = $2",
        )
        .bind(order.user_id)
        .bind(expected_cart_version)
        .execute(&mut *tx)
        .await?;

        // The cart changed between the checkout read and this transaction.
        // Roll the order back too so the items cannot be ordered twice.
        if cleared.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::VersionConflict);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    async fn list_all(
        &self,
        status: Option<OrderStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<OrderPage, StoreError> {
        let (orders, total) = match status {
            Some(status) => {
                let orders = sqlx::query_as::<_, Order>(
                    "SELECT * FROM orders WHERE status = $1 \
                     ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                )
                .bind(status.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                let total: (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM orders WHERE status = $1")
                        .bind(status.as_str())
                        .fetch_one(&self.pool)
                        .await?;
                (orders, total.0)
            }
            None => {
                let orders = sqlx::query_as::<_, Order>(
                    "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
                    .fetch_one(&self.pool)
                    .await?;
                (orders, total.0)
            }
        };
        Ok(OrderPage { orders, total })
    }

    async fn set_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let updated = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $3, updated_at = now() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(order_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }
}

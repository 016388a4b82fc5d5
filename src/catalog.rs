//! Catalog collaborator: resolves a product id to a priced snapshot.
//!
//! Catalog management (CRUD, search, images) lives outside this service; the
//! only contract consumed here is the lookup below.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::domain::cart::LineItem;
use crate::store::StoreError;

/// What the catalog reports for a product at lookup time.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock: i32,
}

impl ProductSnapshot {
    pub fn into_line_item(self, quantity: u32) -> LineItem {
        LineItem {
            product_id: self.id,
            title: self.title,
            price: self.price,
            image_url: self.image_url,
            quantity,
        }
    }
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolves a product id, or `None` when the catalog has no such product.
    async fn lookup(&self, product_id: Uuid) -> Result<Option<ProductSnapshot>, StoreError>;
}

/// Catalog backed by the `products` table.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn lookup(&self, product_id: Uuid) -> Result<Option<ProductSnapshot>, StoreError> {
        let snapshot = sqlx::query_as::<_, ProductSnapshot>(
            "SELECT id, title, price, image_url, stock FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(snapshot)
    }
}

/// In-memory catalog for tests and local development.
#[derive(Default)]
pub struct MemoryCatalog {
    products: RwLock<HashMap<Uuid, ProductSnapshot>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, snapshot: ProductSnapshot) {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(snapshot.id, snapshot);
    }

    /// Overwrites a product's price, simulating a catalog-side price change.
    pub fn set_price(&self, product_id: Uuid, price: Decimal) {
        if let Some(snapshot) = self
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&product_id)
        {
            snapshot.price = price;
        }
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn lookup(&self, product_id: Uuid) -> Result<Option<ProductSnapshot>, StoreError> {
        Ok(self
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&product_id)
            .cloned())
    }
}

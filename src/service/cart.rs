//! Cart operations, scoped to an explicitly passed principal id.

use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::domain::cart::Cart;
use crate::error::{Error, Result};
use crate::store::CartStore;

/// All cart mutations load the current cart, apply the change in memory, and
/// save against the version they read. A concurrent writer surfaces as
/// [`Error::Conflict`] and the caller retries.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn Catalog>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { carts, catalog }
    }

    /// Current cart; empty for a principal that has never touched one.
    pub async fn view(&self, user_id: Uuid) -> Result<Cart> {
        Ok(self.carts.load(user_id).await?.cart)
    }

    /// Adds `quantity` of a product, merging with an existing line item. The
    /// catalog snapshot is taken on the first add only.
    pub async fn add_item(&self, user_id: Uuid, product_id: Uuid, quantity: i64) -> Result<Cart> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| {
                Error::InvalidInput(format!("quantity must be a positive integer, got {quantity}"))
            })?;
        let snapshot = self
            .catalog
            .lookup(product_id)
            .await?
            .ok_or(Error::NotFound("product"))?;

        let record = self.carts.load(user_id).await?;
        let mut cart = record.cart;
        cart.add_item(snapshot.into_line_item(quantity));
        self.carts.save(user_id, &cart, record.version).await?;
        Ok(cart)
    }

    /// Replaces the quantity of a line item already in the cart. Zero or
    /// negative removes it.
    pub async fn set_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<Cart> {
        let quantity = u32::try_from(quantity.max(0))
            .map_err(|_| Error::InvalidInput(format!("quantity out of range: {quantity}")))?;
        let record = self.carts.load(user_id).await?;
        let mut cart = record.cart;
        cart.set_quantity(product_id, quantity)
            .map_err(|_| Error::NotFound("cart item"))?;
        self.carts.save(user_id, &cart, record.version).await?;
        Ok(cart)
    }

    /// Removes a product from the cart. Removing an absent product is a
    /// no-op, not an error.
    pub async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<Cart> {
        let record = self.carts.load(user_id).await?;
        let mut cart = record.cart;
        cart.remove_item(product_id);
        self.carts.save(user_id, &cart, record.version).await?;
        Ok(cart)
    }

    /// Resets the cart to empty.
    pub async fn clear(&self, user_id: Uuid) -> Result<Cart> {
        let record = self.carts.load(user_id).await?;
        let mut cart = record.cart;
        cart.clear();
        self.carts.save(user_id, &cart, record.version).await?;
        Ok(cart)
    }
}

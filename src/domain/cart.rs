//! Cart aggregate: per-principal line items with a derived subtotal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A denormalized snapshot of a product at the moment it entered the cart.
///
/// Title, price, and image are captured once on the first add and deliberately
/// never refreshed from the catalog afterwards: a line item is "what the
/// customer saw when they added it". Quantity is always at least 1; an item
/// whose quantity would drop to zero is removed from the cart instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("item not in cart")]
    ItemNotFound,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Adds a line item, merging quantities when the product is already
    /// present. The existing snapshot wins on a merge; the incoming title,
    /// price, and image are ignored.
    pub fn add_item(&mut self, item: LineItem) {
        debug_assert!(item.quantity >= 1, "line item quantity must be positive");
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        self.recalculate();
    }

    /// Replaces the quantity for a product already in the cart. A quantity of
    /// zero removes the line item entirely.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(CartError::ItemNotFound)?;
        if quantity == 0 {
            self.items.retain(|i| i.product_id != product_id);
        } else {
            item.quantity = quantity;
        }
        self.recalculate();
        Ok(())
    }

    /// Removes a product if present. Removing an absent product is not an
    /// error.
    pub fn remove_item(&mut self, product_id: Uuid) {
        self.items.retain(|i| i.product_id != product_id);
        self.recalculate();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recalculate();
    }

    // Subtotal is always rebuilt from the item list, never patched
    // incrementally, so it cannot drift.
    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().map(LineItem::line_total).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: Uuid, price_cents: i64, quantity: u32) -> LineItem {
        LineItem {
            product_id,
            title: "Widget".into(),
            price: Decimal::new(price_cents, 2),
            image_url: None,
            quantity,
        }
    }

    #[test]
    fn test_add_merges_quantities() {
        let id = Uuid::new_v4();
        let mut cart = Cart::default();
        cart.add_item(item(id, 1000, 2));
        cart.add_item(item(id, 1000, 3));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.subtotal, Decimal::new(5000, 2));
    }

    #[test]
    fn test_repeat_add_keeps_original_snapshot() {
        let id = Uuid::new_v4();
        let mut cart = Cart::default();
        cart.add_item(item(id, 1000, 1));
        // price changed in the catalog; re-adding must not refresh it
        cart.add_item(item(id, 9999, 1));
        assert_eq!(cart.items[0].price, Decimal::new(1000, 2));
        assert_eq!(cart.subtotal, Decimal::new(2000, 2));
    }

    #[test]
    fn test_set_quantity_replaces() {
        let id = Uuid::new_v4();
        let mut cart = Cart::default();
        cart.add_item(item(id, 500, 4));
        cart.set_quantity(id, 2).unwrap();
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.subtotal, Decimal::new(1000, 2));
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut cart = Cart::default();
        cart.add_item(item(id, 500, 4));
        cart.add_item(item(other, 300, 1));
        cart.set_quantity(id, 0).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal, Decimal::new(300, 2));
    }

    #[test]
    fn test_set_quantity_missing_item() {
        let mut cart = Cart::default();
        assert!(matches!(
            cart.set_quantity(Uuid::new_v4(), 1),
            Err(CartError::ItemNotFound)
        ));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let id = Uuid::new_v4();
        let mut cart = Cart::default();
        cart.add_item(item(id, 500, 1));
        cart.remove_item(id);
        cart.remove_item(id);
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::default();
        cart.add_item(item(Uuid::new_v4(), 500, 1));
        cart.add_item(item(Uuid::new_v4(), 700, 2));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal, Decimal::ZERO);
    }
}

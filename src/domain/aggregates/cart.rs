//! Cart document. One per user, created lazily.
//!
//! Line items snapshot the unit price at the time the item was added; they
//! are not live-linked to the product's current price. Stock is checked by
//! the API layer at mutation time against the live product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{Document, ObjectId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: ObjectId,
    pub user: ObjectId,
    pub items: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ObjectId,
    pub product: ObjectId,
    pub quantity: u32,
    /// Unit price captured when the item entered the cart.
    pub price: Decimal,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("Item not found")]
    ItemNotFound,
}

impl Cart {
    pub fn new(user: ObjectId) -> Self {
        let now = Utc::now();
        Self { id: ObjectId::new(), user, items: vec![], created_at: now, updated_at: now }
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().fold(Decimal::ZERO, |acc, line| acc + line.line_total())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line_for_product(&self, product: &ObjectId) -> Option<&CartLine> {
        self.items.iter().find(|l| &l.product == product)
    }

    pub fn line(&self, line_id: &ObjectId) -> Option<&CartLine> {
        self.items.iter().find(|l| &l.id == line_id)
    }

    /// Merges into an existing line for the product, refreshing its unit
    /// price to the current one, or appends a new line.
    pub fn add_item(&mut self, product: ObjectId, quantity: u32, unit_price: Decimal) {
        match self.items.iter_mut().find(|l| l.product == product) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.price = unit_price;
            }
            None => self.items.push(CartLine {
                id: ObjectId::new(),
                product,
                quantity,
                price: unit_price,
            }),
        }
        self.touch();
    }

    pub fn set_quantity(&mut self, line_id: &ObjectId, quantity: u32) -> Result<(), CartError> {
        let line = self
            .items
            .iter_mut()
            .find(|l| &l.id == line_id)
            .ok_or(CartError::ItemNotFound)?;
        line.quantity = quantity;
        self.touch();
        Ok(())
    }

    /// Silent on absence: removing an already-gone line is a no-op.
    pub fn remove_item(&mut self, line_id: &ObjectId) {
        self.items.retain(|l| &l.id != line_id);
        self.touch();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Document for Cart {
    fn id(&self) -> &ObjectId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_tracks_mutations() {
        let mut cart = Cart::new(ObjectId::new());
        let a = ObjectId::new();
        let b = ObjectId::new();
        cart.add_item(a.clone(), 2, Decimal::from(100));
        cart.add_item(b, 1, Decimal::from(50));
        assert_eq!(cart.total(), Decimal::from(250));

        let line_id = cart.line_for_product(&a).unwrap().id.clone();
        cart.set_quantity(&line_id, 1).unwrap();
        assert_eq!(cart.total(), Decimal::from(150));

        cart.remove_item(&line_id);
        assert_eq!(cart.total(), Decimal::from(50));
    }

    #[test]
    fn test_add_merges_and_refreshes_price() {
        let mut cart = Cart::new(ObjectId::new());
        let product = ObjectId::new();
        cart.add_item(product.clone(), 2, Decimal::from(10));
        cart.add_item(product.clone(), 1, Decimal::from(12));
        assert_eq!(cart.items.len(), 1);
        let line = cart.line_for_product(&product).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.price, Decimal::from(12));
    }

    #[test]
    fn test_merge_saturates_instead_of_wrapping() {
        let mut cart = Cart::new(ObjectId::new());
        let product = ObjectId::new();
        cart.add_item(product.clone(), u32::MAX - 1, Decimal::from(10));
        cart.add_item(product.clone(), 5, Decimal::from(10));
        assert_eq!(cart.line_for_product(&product).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new(ObjectId::new());
        cart.add_item(ObjectId::new(), 1, Decimal::from(5));
        let line_id = cart.items[0].id.clone();
        cart.remove_item(&line_id);
        cart.remove_item(&line_id); // no-op
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_missing_line() {
        let mut cart = Cart::new(ObjectId::new());
        assert!(matches!(
            cart.set_quantity(&ObjectId::new(), 2),
            Err(CartError::ItemNotFound)
        ));
    }
}

//! Wishlist document. One per user, a set of product references with
//! per-entry timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{Document, ObjectId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub product: ObjectId,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error)]
pub enum WishlistError {
    #[error("Product already in wishlist")]
    AlreadyPresent,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: ObjectId,
    pub user: ObjectId,
    pub products: Vec<WishlistEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wishlist {
    pub fn new(user: ObjectId) -> Self {
        let now = Utc::now();
        Self { id: ObjectId::new(), user, products: vec![], created_at: now, updated_at: now }
    }

    pub fn contains(&self, product: &ObjectId) -> bool {
        self.products.iter().any(|e| &e.product == product)
    }

    pub fn add(&mut self, product: ObjectId) -> Result<(), WishlistError> {
        if self.contains(&product) {
            return Err(WishlistError::AlreadyPresent);
        }
        self.products.push(WishlistEntry { product, added_at: Utc::now() });
        self.touch();
        Ok(())
    }

    /// Returns true if the entry existed.
    pub fn remove(&mut self, product: &ObjectId) -> bool {
        let before = self.products.len();
        self.products.retain(|e| &e.product != product);
        let removed = self.products.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.products.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Document for Wishlist {
    fn id(&self) -> &ObjectId {
        &self.id
    }
}

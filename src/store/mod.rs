//! Opaque collection-store capability.
//!
//! Documents are keyed by a 24-hex-char surrogate id and grouped into
//! per-kind collections. The store is in-process; each operation takes the
//! collection lock for the duration of the call and nothing else. There is
//! no multi-document transaction, callers sequence cross-collection writes
//! themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::aggregates::{Cart, Order, Product, Review, Wishlist};

/// 24-hex-char document identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Generates a fresh id from 12 random bytes.
    pub fn new() -> Self {
        let uuid = Uuid::new_v4();
        let hex: String = uuid.as_bytes()[..12].iter().map(|b| format!("{b:02x}")).collect();
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Error)]
#[error("invalid object id")]
pub struct ParseObjectIdError;

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseObjectIdError);
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for ObjectId {
    type Error = ParseObjectIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> String {
        id.0
    }
}

/// A stored document exposes its surrogate key.
pub trait Document: Clone {
    fn id(&self) -> &ObjectId;
}

/// One collection of like documents behind an async lock.
pub struct Collection<T> {
    docs: RwLock<Vec<T>>,
}

impl<T: Document> Collection<T> {
    pub fn new() -> Self {
        Self { docs: RwLock::new(Vec::new()) }
    }

    pub async fn insert(&self, doc: T) -> T {
        let mut docs = self.docs.write().await;
        docs.push(doc.clone());
        doc
    }

    /// Replaces the document with the same id, inserting if absent.
    pub async fn save(&self, doc: T) -> T {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|d| d.id() == doc.id()) {
            Some(slot) => *slot = doc.clone(),
            None => docs.push(doc.clone()),
        }
        doc
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Option<T> {
        self.docs.read().await.iter().find(|d| d.id() == id).cloned()
    }

    pub async fn find_one(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.docs.read().await.iter().find(|d| pred(d)).cloned()
    }

    pub async fn find(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.docs.read().await.iter().filter(|d| pred(d)).cloned().collect()
    }

    pub async fn all(&self) -> Vec<T> {
        self.docs.read().await.clone()
    }

    /// Returns true if a document was removed.
    pub async fn delete(&self, id: &ObjectId) -> bool {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|d| d.id() != id);
        docs.len() != before
    }
}

impl<T: Document> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// All collections the service persists to.
pub struct Db {
    pub products: Collection<Product>,
    pub carts: Collection<Cart>,
    pub orders: Collection<Order>,
    pub reviews: Collection<Review>,
    pub wishlists: Collection<Wishlist>,
}

impl Db {
    pub fn new() -> Self {
        Self {
            products: Collection::new(),
            carts: Collection::new(),
            orders: Collection::new(),
            reviews: Collection::new(),
            wishlists: Collection::new(),
        }
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_format() {
        let id = ObjectId::new();
        assert_eq!(id.as_str().len(), 24);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_object_id_parse() {
        assert!("507f1f77bcf86cd799439011".parse::<ObjectId>().is_ok());
        assert!("not-an-id".parse::<ObjectId>().is_err());
        assert!("507f1f77bcf86cd79943901".parse::<ObjectId>().is_err()); // 23 chars
    }
}

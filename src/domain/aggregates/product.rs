//! Product catalog document.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::store::{Document, ObjectId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Clothing,
    Books,
    Home,
    Sports,
    Beauty,
    Other,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub brand: String,
    pub images: Vec<String>,
    pub stock: u32,
    /// Mean of all review ratings, one decimal place. Derived, never set directly.
    pub rating: f64,
    pub num_reviews: u32,
    /// Percentage, 0-100.
    pub discount: u8,
    pub features: Vec<String>,
    pub specifications: HashMap<String, String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        category: Category,
        brand: impl Into<String>,
        stock: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name: name.into(),
            description: description.into(),
            price,
            category,
            brand: brand.into(),
            images: vec![],
            stock,
            rating: 0.0,
            num_reviews: 0,
            discount: 0,
            features: vec![],
            specifications: HashMap::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn discounted_price(&self) -> Decimal {
        self.price - self.price * Decimal::from(self.discount) / Decimal::from(100)
    }

    pub fn has_stock(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }

    /// Rewrites the derived rating fields from the full set of review ratings.
    /// Zero reviews resets both to zero.
    pub fn apply_ratings(&mut self, ratings: &[u8]) {
        if ratings.is_empty() {
            self.rating = 0.0;
            self.num_reviews = 0;
        } else {
            let sum: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
            let mean = f64::from(sum) / ratings.len() as f64;
            self.rating = (mean * 10.0).round() / 10.0;
            self.num_reviews = ratings.len() as u32;
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Document for Product {
    fn id(&self) -> &ObjectId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product::new("Widget", "A widget", Decimal::from(100), Category::Electronics, "Acme", 10)
    }

    #[test]
    fn test_rating_mean_rounded_to_one_decimal() {
        let mut p = product();
        p.apply_ratings(&[3, 4, 4]);
        assert_eq!(p.rating, 3.7);
        assert_eq!(p.num_reviews, 3);
    }

    #[test]
    fn test_rating_resets_with_no_reviews() {
        let mut p = product();
        p.apply_ratings(&[5]);
        p.apply_ratings(&[]);
        assert_eq!(p.rating, 0.0);
        assert_eq!(p.num_reviews, 0);
    }

    #[test]
    fn test_discounted_price() {
        let mut p = product();
        p.discount = 20;
        assert_eq!(p.discounted_price(), Decimal::from(80));
    }

    #[test]
    fn test_stock_check() {
        let p = product();
        assert!(p.has_stock(10));
        assert!(!p.has_stock(11));
    }
}

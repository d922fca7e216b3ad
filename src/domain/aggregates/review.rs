//! Review document, one per (product, user) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{Document, ObjectId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub user: ObjectId,
    pub reason: String,
}

#[derive(Debug, Clone, Error)]
pub enum ReviewError {
    #[error("You have already reported this review")]
    AlreadyReported,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ObjectId,
    pub product: ObjectId,
    pub user: ObjectId,
    /// 1-5, validated at the API boundary.
    pub rating: u8,
    pub comment: String,
    /// True when the author has a delivered order containing the product.
    pub verified: bool,
    pub helpful: Vec<ObjectId>,
    pub reported: Vec<ReviewReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        product: ObjectId,
        user: ObjectId,
        rating: u8,
        comment: impl Into<String>,
        verified: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            product,
            user,
            rating,
            comment: comment.into(),
            verified,
            helpful: vec![],
            reported: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn edit(&mut self, rating: Option<u8>, comment: Option<String>) {
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(comment) = comment {
            self.comment = comment;
        }
        self.touch();
    }

    /// Toggles the helpful mark for a user; returns true if now marked.
    pub fn toggle_helpful(&mut self, user: &ObjectId) -> bool {
        let before = self.helpful.len();
        self.helpful.retain(|u| u != user);
        let marked = self.helpful.len() == before;
        if marked {
            self.helpful.push(user.clone());
        }
        self.touch();
        marked
    }

    /// One report per user.
    pub fn report(&mut self, user: ObjectId, reason: String) -> Result<(), ReviewError> {
        if self.reported.iter().any(|r| r.user == user) {
            return Err(ReviewError::AlreadyReported);
        }
        self.reported.push(ReviewReport { user, reason });
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Document for Review {
    fn id(&self) -> &ObjectId {
        &self.id
    }
}

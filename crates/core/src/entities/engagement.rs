//! Reviews and in-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::impl_resource;
use crate::types::{CustomerId, NotificationId, ProductId, ReviewId, ReviewStatus};
use crate::validation::{Validate, ValidationError, require};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: ReviewId,
    pub product: ProductId,
    #[serde(default)]
    pub customer: Option<CustomerId>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "default_review_status")]
    pub status: ReviewStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub product: ProductId,
    pub rating: u8,
    pub comment: String,
}

impl Validate for ReviewDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError::invalid(
                "rating",
                "must be between 1 and 5",
            ));
        }
        require("comment", &self.comment)
    }
}

impl_resource!(Review, ReviewId, ReviewDraft, "reviews", "Review");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Broadcast composed by an admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    /// Restrict delivery to one audience; everyone when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<crate::types::Role>,
}

impl Validate for NotificationDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("message", &self.message)
    }
}

impl_resource!(
    Notification,
    NotificationId,
    NotificationDraft,
    "notifications",
    "Notification"
);

const fn default_review_status() -> ReviewStatus {
    ReviewStatus::Pending
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_rating_bounds() {
        let mut draft = ReviewDraft {
            product: ProductId::new("p1"),
            rating: 0,
            comment: "Great".to_string(),
        };
        assert!(draft.validate().is_err());
        draft.rating = 5;
        assert!(draft.validate().is_ok());
        draft.rating = 6;
        assert!(draft.validate().is_err());
    }
}

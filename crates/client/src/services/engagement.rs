//! Notification endpoints.
//!
//! | Endpoint | Method | Path |
//! |----------|--------|------|
//! | mark read | PATCH | `/{role}/notifications/{id}/read` |
//! | mark all read | PATCH | `/{role}/notifications/read-all` |
//! | unread count | GET | `/{role}/notifications/unread-count` |

use bazaar_core::{Notification, Resource};
use serde::Deserialize;
use tracing::instrument;

use super::ResourceApi;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct Count {
    #[serde(alias = "modified", alias = "modifiedCount", alias = "unread")]
    count: u64,
}

impl ResourceApi<Notification> {
    /// `PATCH /{role}/notifications/{id}/read`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    pub async fn mark_read(
        &self,
        id: &<Notification as Resource>::Id,
    ) -> Result<Notification, ApiError> {
        self.patch(id, "read", &serde_json::json!({})).await
    }

    /// `PATCH /{role}/notifications/read-all`, returning how many changed.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self) -> Result<u64, ApiError> {
        let envelope = self
            .client()
            .patch::<Count, _>(
                &[
                    self.client().role().api_prefix(),
                    Notification::COLLECTION,
                    "read-all",
                ],
                &serde_json::json!({}),
            )
            .await?;
        Ok(envelope.data.map_or(0, |c| c.count))
    }

    /// `GET /{role}/notifications/unread-count`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        self.client()
            .get::<Count>(
                &[
                    self.client().role().api_prefix(),
                    Notification::COLLECTION,
                    "unread-count",
                ],
                &[],
            )
            .await?
            .into_data()
            .map(|c| c.count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_count_aliases() {
        let c: Count = serde_json::from_str(r#"{"modifiedCount": 4}"#).unwrap();
        assert_eq!(c.count, 4);
        let c: Count = serde_json::from_str(r#"{"count": 2}"#).unwrap();
        assert_eq!(c.count, 2);
    }
}

//! Service functions, one per REST endpoint.
//!
//! [`ResourceApi`] covers the endpoints every collection has (list, get,
//! create, update, status patch, delete). Endpoints specific to one resource
//! are added as inherent methods in the submodules. Nothing here keeps state
//! or decides anything; that is the stores' job.
//!
//! # Paths
//!
//! Collections live under the role prefix:
//!
//! | Endpoint | Method | Path |
//! |----------|--------|------|
//! | list | GET | `/{role}/{collection}?page=&limit=&search=&...` |
//! | get | GET | `/{role}/{collection}/{id}` |
//! | create | POST | `/{role}/{collection}` |
//! | update | PUT | `/{role}/{collection}/{id}` |
//! | status | PATCH | `/{role}/{collection}/{id}/status` |
//! | delete | DELETE | `/{role}/{collection}/{id}` |

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod engagement;
pub mod orders;
pub mod upload;

use std::marker::PhantomData;

use bazaar_core::{ListQuery, Page, Pagination, Resource};
use serde::Serialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::http::{ApiClient, Auth};

/// Endpoints of one resource collection, as seen by the client's role.
pub struct ResourceApi<R: Resource> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<R: Resource> std::fmt::Debug for ResourceApi<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("collection", &R::COLLECTION)
            .field("role", &self.client.role())
            .finish()
    }
}

#[derive(Serialize)]
struct StatusBody<S> {
    status: S,
}

impl<R: Resource> ResourceApi<R> {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    fn prefix(&self) -> &'static str {
        self.client.role().api_prefix()
    }

    /// `GET /{role}/{collection}`
    ///
    /// A response without `pagination` is treated as a single page holding
    /// every returned item.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn list(&self, query: &ListQuery) -> Result<Page<R>, ApiError> {
        let envelope = self
            .client
            .get::<Vec<R>>(&[self.prefix(), R::COLLECTION], &query.to_pairs())
            .await?;
        let pagination = envelope.pagination;
        let items = envelope.data.unwrap_or_default();
        let pagination = pagination.unwrap_or_else(|| Pagination::single_page(items.len()));
        Ok(Page { items, pagination })
    }

    /// `GET /{role}/{collection}/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn get(&self, id: &R::Id) -> Result<R, ApiError> {
        self.client
            .get::<R>(&[self.prefix(), R::COLLECTION, id.as_ref()], &[])
            .await?
            .into_data()
    }

    /// `POST /{role}/{collection}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self, draft), fields(collection = R::COLLECTION))]
    pub async fn create(&self, draft: &R::Draft) -> Result<R, ApiError> {
        self.client
            .post::<R, _>(&[self.prefix(), R::COLLECTION], draft, Auth::Bearer)
            .await?
            .into_data()
    }

    /// `PUT /{role}/{collection}/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self, draft), fields(collection = R::COLLECTION))]
    pub async fn update(&self, id: &R::Id, draft: &R::Draft) -> Result<R, ApiError> {
        self.client
            .put::<R, _>(&[self.prefix(), R::COLLECTION, id.as_ref()], draft)
            .await?
            .into_data()
    }

    /// `PATCH /{role}/{collection}/{id}/status` with `{"status": ...}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    pub async fn update_status<S: Serialize + Sync>(
        &self,
        id: &R::Id,
        status: S,
    ) -> Result<R, ApiError> {
        self.patch(id, "status", &StatusBody { status }).await
    }

    /// `PATCH /{role}/{collection}/{id}/{action}` with an arbitrary body,
    /// returning the updated entity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self, body), fields(collection = R::COLLECTION))]
    pub async fn patch<B: Serialize + Sync + ?Sized>(
        &self,
        id: &R::Id,
        action: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        self.client
            .patch::<R, _>(&[self.prefix(), R::COLLECTION, id.as_ref(), action], body)
            .await?
            .into_data()
    }

    /// `DELETE /{role}/{collection}/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn delete(&self, id: &R::Id) -> Result<(), ApiError> {
        self.client
            .delete(&[self.prefix(), R::COLLECTION, id.as_ref()])
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bazaar_core::{Category, Role};

    use super::*;
    use crate::config::ClientConfig;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStorage;
    use crate::tokens::TokenStore;

    #[test]
    fn test_status_body_shape() {
        let body = serde_json::to_value(StatusBody {
            status: bazaar_core::VendorStatus::Approved,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"status": "approved"}));
    }

    #[test]
    fn test_paths_follow_role_prefix() {
        let config = ClientConfig::new("https://api.example.com/v1").unwrap();
        let client = ApiClient::new(
            &config,
            Role::Vendor,
            TokenStore::new(Arc::new(MemoryStorage::new())),
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap();
        let api = ResourceApi::<Category>::new(client);
        let url = api
            .client()
            .url(&[api.prefix(), Category::COLLECTION])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/vendor/categories");
    }
}

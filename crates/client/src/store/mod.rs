//! Client-side resource stores.
//!
//! A [`ResourceStore`] holds one collection in memory together with its
//! pagination metadata and a loading flag. Every mutation is
//! confirm-then-apply: the request goes out first and the list is patched
//! with the server's representation only after a successful response. A
//! failed request leaves the list exactly as it was; the error has already
//! been shown by the HTTP interceptor and is handed back to the caller.
//!
//! # Example
//!
//! ```no_run
//! use bazaar_client::store::ResourceStore;
//! use bazaar_core::{BrandDraft, ListQuery};
//!
//! # use bazaar_client::ApiError;
//! # async fn demo(brands: ResourceStore<bazaar_core::Brand>) -> Result<(), ApiError> {
//! brands.fetch(ListQuery::new().page(1).limit(10)).await?;
//! let created = brands
//!     .create(&BrandDraft { name: "Bata".to_string(), ..BrandDraft::default() })
//!     .await?;
//! assert!(brands.find(&created.id).await.is_some());
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod persist;
pub mod state;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bazaar_core::{ListQuery, Pagination, Resource, Validate, ValidationError};
use tokio::sync::RwLock;
use tracing::instrument;

pub use persist::{ListCache, MAX_CACHED_ITEMS};
pub use state::{Merge, StoreState};

use crate::error::ApiError;
use crate::notify::Notice;
use crate::services::ResourceApi;

/// In-memory cache of one resource collection.
///
/// Cheap to clone; clones share state.
pub struct ResourceStore<R: Resource> {
    api: ResourceApi<R>,
    state: Arc<RwLock<StoreState<R>>>,
    in_flight: Arc<AtomicUsize>,
    cache: Option<Arc<ListCache<R>>>,
}

impl<R: Resource> Clone for ResourceStore<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: Arc::clone(&self.state),
            in_flight: Arc::clone(&self.in_flight),
            cache: self.cache.clone(),
        }
    }
}

impl<R: Resource> std::fmt::Debug for ResourceStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("api", &self.api)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

/// Marks a store busy for as long as it lives.
struct Loading(Arc<AtomicUsize>);

impl Loading {
    fn start(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for Loading {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<R: Resource> ResourceStore<R> {
    #[must_use]
    pub fn new(api: ResourceApi<R>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(StoreState::default())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            cache: None,
        }
    }

    /// Mirror the list into persisted storage after every change.
    #[must_use]
    pub fn with_cache(mut self, cache: ListCache<R>) -> Self {
        self.cache = Some(Arc::new(cache));
        self
    }

    /// Whether the list is mirrored into persisted storage.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    #[must_use]
    pub const fn api(&self) -> &ResourceApi<R> {
        &self.api
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Snapshot of the list in server order.
    pub async fn items(&self) -> Vec<R> {
        self.state.read().await.items.clone()
    }

    pub async fn find(&self, id: &R::Id) -> Option<R> {
        self.state.read().await.find(id).cloned()
    }

    pub async fn pagination(&self) -> Pagination {
        self.state.read().await.pagination
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }

    /// Whether any request of this store is awaiting a response.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Drop the list and its persisted snapshot (e.g. on logout).
    pub async fn clear(&self) {
        *self.state.write().await = StoreState::default();
        if let Some(cache) = &self.cache
            && let Err(e) = cache.clear()
        {
            tracing::warn!(key = cache.key(), error = %e, "Failed to remove list cache");
        }
    }

    /// Load the persisted snapshot, if this store has one, into memory.
    /// Returns the number of items restored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if storage cannot be read.
    pub async fn hydrate(&self) -> Result<usize, ApiError> {
        let Some(cache) = &self.cache else {
            return Ok(0);
        };
        let items = cache.load()?;
        let count = items.len();
        let mut state = self.state.write().await;
        state.pagination = Pagination::single_page(count);
        state.items = items;
        Ok(count)
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch a page and replace the list with it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails; the list is left unchanged.
    pub async fn fetch(&self, query: ListQuery) -> Result<Pagination, ApiError> {
        self.fetch_with(query, Merge::Replace).await
    }

    /// Fetch a page and merge it into the list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails; the list is left unchanged.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn fetch_with(&self, query: ListQuery, merge: Merge) -> Result<Pagination, ApiError> {
        let _loading = Loading::start(&self.in_flight);
        let page = self.api.list(&query).await?;

        let mut state = self.state.write().await;
        state.apply_page(page, merge, query);
        tracing::debug!(
            items = state.items.len(),
            total = state.pagination.total,
            "List fetched"
        );
        self.persist(&state);
        Ok(state.pagination)
    }

    /// Append the page after the last one requested.
    ///
    /// Returns `false` without sending anything when the last request was
    /// already for the final page (or nothing has been fetched yet). Also
    /// returns `false` when the backend answered with a different page than
    /// the one asked for, or with nothing new, so a backend that ignores
    /// `page` cannot keep a caller looping.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails; the list is left unchanged.
    pub async fn fetch_more(&self) -> Result<bool, ApiError> {
        let next = {
            let state = self.state.read().await;
            state.last_query.as_ref().and_then(|query| {
                let current = query.page.unwrap_or(1);
                (current < state.pagination.pages)
                    .then(|| (query.with_page(current + 1), current + 1, state.items.len()))
            })
        };
        let Some((query, requested, before)) = next else {
            return Ok(false);
        };

        let pagination = self.fetch_with(query, Merge::Append).await?;
        if pagination.page != requested || self.len().await <= before {
            tracing::warn!(
                requested,
                served = pagination.page,
                "Backend did not advance to the next page, stopping"
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// Fetch the first page of `query`, then keep appending until the last.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` from the first failing request. Pages loaded before
    /// it stay in the list.
    pub async fn fetch_all(&self, query: ListQuery) -> Result<Pagination, ApiError> {
        let mut pagination = self.fetch(query.page(1)).await?;
        while self.fetch_more().await? {
            pagination = self.pagination().await;
        }
        Ok(pagination)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validate and submit a new entity, then add the server's copy.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` without sending anything if the draft
    /// is invalid, or the request's `ApiError`. The list is unchanged on
    /// any error.
    #[instrument(skip(self, draft), fields(collection = R::COLLECTION))]
    pub async fn create(&self, draft: &R::Draft) -> Result<R, ApiError> {
        self.check(draft)?;
        let _loading = Loading::start(&self.in_flight);
        let created = self.api.create(draft).await?;

        let mut state = self.state.write().await;
        state.apply_created(created.clone());
        self.persist(&state);
        drop(state);

        self.notify_success(format!("{} created", R::LABEL));
        Ok(created)
    }

    /// Validate and submit changes, then replace the listed entity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` without sending anything if the draft
    /// is invalid, or the request's `ApiError`. The list is unchanged on
    /// any error.
    #[instrument(skip(self, draft), fields(collection = R::COLLECTION))]
    pub async fn update(&self, id: &R::Id, draft: &R::Draft) -> Result<R, ApiError> {
        self.check(draft)?;
        let message = format!("{} updated", R::LABEL);
        self.confirm(&message, self.api.update(id, draft)).await
    }

    /// Patch the entity's `status` field.
    ///
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn set_status<S>(&self, id: &R::Id, status: S) -> Result<R, ApiError>
    where
        S: serde::Serialize + std::fmt::Display + Send + Sync,
    {
        let message = format!("{} marked {status}", R::LABEL);
        self.confirm(&message, self.api.update_status(id, status))
            .await
    }

    /// Delete on the server, then drop the entity from the list.
    ///
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn delete(&self, id: &R::Id) -> Result<(), ApiError> {
        let _loading = Loading::start(&self.in_flight);
        self.api.delete(id).await?;

        let mut state = self.state.write().await;
        state.apply_deleted(id);
        self.persist(&state);
        drop(state);

        self.notify_success(format!("{} deleted", R::LABEL));
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Await a request returning the updated entity and, on success, swap it
    /// into the list and show `message`.
    pub(crate) async fn confirm<F>(&self, message: &str, request: F) -> Result<R, ApiError>
    where
        F: Future<Output = Result<R, ApiError>>,
    {
        let _loading = Loading::start(&self.in_flight);
        let updated = request.await?;

        let mut state = self.state.write().await;
        if !state.apply_updated(updated.clone()) {
            tracing::debug!(id = ?updated.id(), "Updated entity is not in the current list");
        }
        self.persist(&state);
        drop(state);

        self.notify_success(message);
        Ok(updated)
    }

    /// Run client-side validation, reporting a failure like any other error.
    pub(crate) fn check<V: Validate + ?Sized>(&self, payload: &V) -> Result<(), ApiError> {
        payload.validate().map_err(|e| self.refuse(e))
    }

    /// Report a request refused on the client side.
    pub(crate) fn refuse(&self, error: ValidationError) -> ApiError {
        let error = ApiError::from(error);
        tracing::debug!(error = %error, collection = R::COLLECTION, "Rejected before submission");
        self.api
            .client()
            .notifier()
            .notify(Notice::error(error.user_message()));
        error
    }

    pub(crate) fn notify_success(&self, message: impl Into<String>) {
        self.api.client().notifier().notify(Notice::success(message));
    }

    fn persist(&self, state: &StoreState<R>) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.save(&state.items)
        {
            tracing::warn!(key = cache.key(), error = %e, "Failed to persist list cache");
        }
    }
}

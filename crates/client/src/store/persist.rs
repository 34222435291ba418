//! Resource lists mirrored into persisted storage.
//!
//! Only the list a store currently holds is written, capped at
//! [`MAX_CACHED_ITEMS`], so the cache never grows past one bounded snapshot
//! per role and collection.

use std::marker::PhantomData;
use std::sync::Arc;

use bazaar_core::{Resource, Role};

use crate::storage::{KeyValueStore, StorageError};

/// Largest number of entities written for one collection.
pub const MAX_CACHED_ITEMS: usize = 500;

/// Snapshot of one store's list in persisted storage.
pub struct ListCache<R: Resource> {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ListCache<R> {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, role: Role) -> Self {
        Self {
            storage,
            key: format!("{}:{}", role.api_prefix(), R::COLLECTION),
            _resource: PhantomData,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The cached list, or an empty one if nothing usable is stored.
    ///
    /// A snapshot that no longer parses (written by an older build, edited
    /// by hand) is discarded rather than reported.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read.
    pub fn load(&self) -> Result<Vec<R>, StorageError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding unreadable list cache");
                self.storage.remove(&self.key)?;
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the snapshot with the first [`MAX_CACHED_ITEMS`] of `items`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be written.
    pub fn save(&self, items: &[R]) -> Result<(), StorageError> {
        let kept = items.get(..MAX_CACHED_ITEMS).unwrap_or(items);
        let raw = serde_json::to_string(kept)?;
        self.storage.set(&self.key, &raw)
    }

    /// Forget the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key).map(|_| ())
    }
}

impl<R: Resource> std::fmt::Debug for ListCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListCache").field("key", &self.key).finish()
    }
}

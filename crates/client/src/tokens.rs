//! Per-role bearer tokens kept in persisted storage.

use std::sync::Arc;

use bazaar_core::Role;
use secrecy::{ExposeSecret, SecretString};

use crate::storage::{KeyValueStore, StorageError};

/// Reads and writes the bearer token of each role under its own key.
///
/// Clearing one role never touches another role's token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// The storage the tokens live in, shared with list caches.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Current token for `role`, if logged in.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read.
    pub fn get(&self, role: Role) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .storage
            .get(role.token_key())?
            .filter(|token| !token.is_empty())
            .map(SecretString::from))
    }

    /// Persist a freshly issued token for `role`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be written.
    pub fn set(&self, role: Role, token: &SecretString) -> Result<(), StorageError> {
        self.storage.set(role.token_key(), token.expose_secret())
    }

    /// Remove and return the token for `role`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be written.
    pub fn take(&self, role: Role) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .storage
            .remove(role.token_key())?
            .filter(|token| !token.is_empty())
            .map(SecretString::from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_tokens_are_isolated_per_role() {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        tokens.set(Role::Admin, &SecretString::from("admin-jwt")).unwrap();
        tokens.set(Role::Vendor, &SecretString::from("vendor-jwt")).unwrap();

        let taken = tokens.take(Role::Admin).unwrap().unwrap();
        assert_eq!(taken.expose_secret(), "admin-jwt");

        assert!(tokens.get(Role::Admin).unwrap().is_none());
        assert_eq!(
            tokens.get(Role::Vendor).unwrap().unwrap().expose_secret(),
            "vendor-jwt"
        );
    }

    #[test]
    fn test_empty_token_counts_as_logged_out() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(Role::Customer.token_key(), "").unwrap();
        let tokens = TokenStore::new(storage);
        assert!(tokens.get(Role::Customer).unwrap().is_none());
    }
}

//! The [`Resource`] trait ties an entity type to its REST collection.

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::validation::Validate;

/// A backend entity that a resource store can cache.
///
/// The collection path is relative to the role prefix, so `Category` lives at
/// `/admin/categories` for the admin console and `/vendor/categories` for a
/// vendor.
pub trait Resource: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Typed identifier.
    type Id: Clone + Debug + Eq + Hash + AsRef<str> + From<String> + Send + Sync;

    /// Payload submitted to create or update the entity.
    type Draft: Serialize + Validate + Debug + Send + Sync;

    /// Collection path segment, e.g. `"categories"`.
    const COLLECTION: &'static str;

    /// Human-readable singular name used in notifications, e.g. `"Category"`.
    const LABEL: &'static str;

    /// Server-assigned identifier.
    fn id(&self) -> &Self::Id;
}

/// Implements [`Resource`] for an entity whose id lives in an `id` field.
macro_rules! impl_resource {
    ($entity:ty, $id:ty, $draft:ty, $collection:literal, $label:literal) => {
        impl $crate::resource::Resource for $entity {
            type Id = $id;
            type Draft = $draft;

            const COLLECTION: &'static str = $collection;
            const LABEL: &'static str = $label;

            fn id(&self) -> &Self::Id {
                &self.id
            }
        }
    };
}

pub(crate) use impl_resource;

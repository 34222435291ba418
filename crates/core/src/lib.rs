//! Bazaar Core - Shared types library.
//!
//! This crate provides the types used across all Bazaar components:
//! - `client` - HTTP client, persisted tokens and resource stores
//! - `cli` - The `bazaar` console for the admin, vendor, delivery and customer roles
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere, including the
//! mock backend used by the integration tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, statuses and pagination
//! - [`entities`] - Backend resources and the drafts submitted to create or update them
//! - [`resource`] - The [`Resource`] trait tying an entity to its REST collection
//! - [`validation`] - Client-side validation of drafts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod entities;
pub mod resource;
pub mod types;
pub mod validation;

pub use entities::*;
pub use resource::Resource;
pub use types::*;
pub use validation::{Validate, ValidationError};

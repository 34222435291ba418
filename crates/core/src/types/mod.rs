//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod pagination;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::{DEFAULT_LIMIT, ListQuery, Page, Pagination};
pub use role::Role;
pub use status::*;

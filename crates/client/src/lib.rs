//! Bazaar client library.
//!
//! Talks to the Bazaar REST backend on behalf of one of four roles
//! (customer, admin, vendor, delivery) and keeps each backend collection in a
//! client-side [`ResourceStore`](store::ResourceStore).
//!
//! # Layers
//!
//! - [`store`] - In-memory lists with confirm-then-apply mutations
//! - [`services`] - One function per REST endpoint, no decisions
//! - [`http`] - Shared client: base URL, bearer tokens, response interceptor
//! - [`tokens`] / [`storage`] - Per-role tokens and cached lists on disk
//! - [`notify`] - Where notices and login redirects go
//!
//! [`Console`] wires all of them together for one role.
//!
//! # Security
//!
//! Bearer tokens are held as [`secrecy::SecretString`] and never logged. The
//! storage file holds them in plain text; keep it out of shared directories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod notify;
pub mod services;
pub mod storage;
pub mod store;
pub mod tokens;

pub use auth::AuthSession;
pub use config::{ClientConfig, ConfigError};
pub use console::Console;
pub use error::ApiError;
pub use http::ApiClient;
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError};
pub use store::ResourceStore;
pub use tokens::TokenStore;

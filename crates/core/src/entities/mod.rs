//! Backend resources and the drafts submitted to create or update them.
//!
//! Every entity maps the server's `_id` field onto `id` on deserialization and
//! writes `id` back out, so lists persisted by the client round-trip cleanly.

pub mod catalog;
pub mod engagement;
pub mod marketing;
pub mod orders;
pub mod people;

pub use catalog::*;
pub use engagement::*;
pub use marketing::*;
pub use orders::*;
pub use people::*;

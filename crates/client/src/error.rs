//! Unified error handling for the client.
//!
//! The taxonomy is flat: validation failures caught before a
//! request leaves, authentication failures (HTTP 401), and everything else
//! the server or the network throws back.

use bazaar_core::ValidationError;
use thiserror::Error;

use crate::storage::StorageError;

/// Message shown when the server gave no usable error message.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors returned by the HTTP client, services and stores.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The payload failed client-side validation; nothing was sent.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The backend rejected the session (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backend answered with an error status or `success: false`.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Persisted storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A local file could not be read for upload.
    #[error("Upload error: {0}")]
    Upload(String),
}

impl ApiError {
    /// Text suitable for a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => capitalize(&e.to_string()),
            Self::Unauthorized(message) | Self::Server { message, .. } => message.clone(),
            Self::Http(e) if e.is_timeout() => "The server took too long to respond.".to_string(),
            Self::Http(_) => "Network error. Check your connection and try again.".to_string(),
            Self::Parse(_) => FALLBACK_MESSAGE.to_string(),
            Self::Storage(e) => format!("Could not access local storage: {e}"),
            Self::Upload(message) => message.clone(),
        }
    }

    /// Whether the error was an authentication failure.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Server {
            status: 409,
            message: "Coupon code already exists".to_string(),
        };
        assert_eq!(err.to_string(), "Server error (409): Coupon code already exists");
        assert_eq!(err.user_message(), "Coupon code already exists");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_validation_message_is_capitalized() {
        let err = ApiError::from(ValidationError::Required { field: "name" });
        assert_eq!(err.user_message(), "Name is required");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::Unauthorized("Token expired".to_string());
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }
}

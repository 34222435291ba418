//! Client-side validation of drafts.
//!
//! A draft that fails validation is never sent: the store reports the error
//! as a notification and returns it to the caller.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::EmailError;

/// Why a draft was rejected before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// A field has a value outside its allowed range or format.
    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },

    /// An email field does not parse.
    #[error("email is invalid: {0}")]
    Email(#[from] EmailError),
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Implemented by every payload the client submits.
pub trait Validate {
    /// Check the payload before it leaves the client.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

pub(crate) fn non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::invalid(field, "cannot be negative"));
    }
    Ok(())
}

/// Phone numbers: optional leading `+`, then 7 to 15 digits. Spaces and
/// dashes are tolerated.
pub(crate) fn phone(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let digits = value
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect::<String>();
    if !(7..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid(field, "must be 7 to 15 digits"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require("name", "Shoes").is_ok());
        assert_eq!(
            require("name", "  "),
            Err(ValidationError::Required { field: "name" })
        );
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative("price", Decimal::ZERO).is_ok());
        assert!(non_negative("price", Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_phone() {
        assert!(phone("phone", "+254 712-345-678").is_ok());
        assert!(phone("phone", "12345").is_err());
        assert!(phone("phone", "07123abc45").is_err());
    }

    #[test]
    fn test_messages() {
        let err = ValidationError::invalid("rating", "must be between 1 and 5");
        assert_eq!(err.to_string(), "rating must be between 1 and 5");
    }
}

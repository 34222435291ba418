//! Account-like entities managed from the admin console: customers, vendors
//! and delivery boys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::impl_resource;
use crate::types::{ActivityStatus, CustomerId, DeliveryBoyId, Email, VendorId, VendorStatus};
use crate::validation::{Validate, ValidationError, phone, require};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(alias = "_id")]
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Validate for CustomerDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        Email::parse(&self.email)?;
        if let Some(number) = &self.phone {
            phone("phone", number)?;
        }
        Ok(())
    }
}

impl_resource!(Customer, CustomerId, CustomerDraft, "customers", "Customer");

/// A seller on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    #[serde(alias = "_id")]
    pub id: VendorId,
    pub shop_name: String,
    pub owner_name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_vendor_status")]
    pub status: VendorStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDraft {
    pub shop_name: String,
    pub owner_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Validate for VendorDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("shop name", &self.shop_name)?;
        require("owner name", &self.owner_name)?;
        Email::parse(&self.email)?;
        if let Some(number) = &self.phone {
            phone("phone", number)?;
        }
        Ok(())
    }
}

impl_resource!(Vendor, VendorId, VendorDraft, "vendors", "Vendor");

/// A delivery rider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryBoy {
    #[serde(alias = "_id")]
    pub id: DeliveryBoyId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default = "default_activity")]
    pub status: ActivityStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryBoyDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
}

impl Validate for DeliveryBoyDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        Email::parse(&self.email)?;
        phone("phone", &self.phone)
    }
}

impl_resource!(
    DeliveryBoy,
    DeliveryBoyId,
    DeliveryBoyDraft,
    "delivery-boys",
    "Delivery boy"
);

// =============================================================================
// Registration
// =============================================================================

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Self-service sign-up for a customer account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Validate for CustomerRegistration {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        Email::parse(&self.email)?;
        password(&self.password)?;
        if let Some(number) = &self.phone {
            phone("phone", number)?;
        }
        Ok(())
    }
}

/// Sign-up for a vendor account. New vendors start out pending approval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRegistration {
    pub shop_name: String,
    pub owner_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl Validate for VendorRegistration {
    fn validate(&self) -> Result<(), ValidationError> {
        require("shop name", &self.shop_name)?;
        require("owner name", &self.owner_name)?;
        Email::parse(&self.email)?;
        password(&self.password)?;
        phone("phone", &self.phone)
    }
}

/// Request for a one-time login code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpRequest {
    pub phone: String,
}

impl Validate for OtpRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        phone("phone", &self.phone)
    }
}

/// A one-time login code sent to a customer's phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpLogin {
    pub phone: String,
    pub otp: String,
}

impl Validate for OtpLogin {
    fn validate(&self) -> Result<(), ValidationError> {
        phone("phone", &self.phone)?;
        let code = self.otp.trim();
        if !(4..=6).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid("code", "must be 4 to 6 digits"));
        }
        Ok(())
    }
}

fn password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required { field: "password" });
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::invalid(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

const fn default_vendor_status() -> VendorStatus {
    VendorStatus::Pending
}

const fn default_activity() -> ActivityStatus {
    ActivityStatus::Active
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::EmailError;

    #[test]
    fn test_vendor_defaults_to_pending() {
        let vendor: Vendor = serde_json::from_value(json!({
            "_id": "v1",
            "shopName": "Corner Shop",
            "ownerName": "Sam",
            "email": "sam@corner.shop"
        }))
        .unwrap();
        assert_eq!(vendor.status, VendorStatus::Pending);
    }

    #[test]
    fn test_customer_draft_rejects_bad_email() {
        let draft = CustomerDraft {
            name: "Ada".to_string(),
            email: "ada-at-example.com".to_string(),
            phone: None,
        };
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Email(EmailError::AtSymbol))
        );
    }

    #[test]
    fn test_delivery_boy_draft_requires_phone() {
        let draft = DeliveryBoyDraft {
            name: "Rider".to_string(),
            email: "rider@fleet.example".to_string(),
            phone: String::new(),
            vehicle_number: None,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_registration_password_length() {
        let mut registration = CustomerRegistration {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
            phone: None,
        };
        assert_eq!(
            registration.validate(),
            Err(ValidationError::invalid(
                "password",
                "must be at least 8 characters"
            ))
        );
        registration.password = "long enough".to_string();
        assert!(registration.validate().is_ok());
    }

    #[test]
    fn test_otp_digits() {
        let otp = |code: &str| OtpLogin {
            phone: "+254712345678".to_string(),
            otp: code.to_string(),
        };
        assert!(otp("1234").validate().is_ok());
        assert!(otp("123456").validate().is_ok());
        assert!(otp("123").validate().is_err());
        assert!(otp("12a4").validate().is_err());
        assert!(otp("1234567").validate().is_err());
    }
}

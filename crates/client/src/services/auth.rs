//! Authentication endpoints.
//!
//! | Endpoint | Method | Path | Auth |
//! |----------|--------|------|------|
//! | login | POST | `/{role}/auth/login` | public |
//! | logout | POST | `/{role}/auth/logout` | bearer |
//! | profile | GET | `/{role}/auth/profile` | bearer |
//! | register | POST | `/{customer,vendor}/auth/register` | public |
//! | send OTP | POST | `/customer/auth/send-otp` | public |
//! | verify OTP | POST | `/customer/auth/verify-otp` | public |

use bazaar_core::{Email, OtpLogin, OtpRequest, Role};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiError;
use crate::http::{ApiClient, Auth};

/// The signed-in account, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Token and account returned by login, registration and OTP verification.
#[derive(Deserialize)]
pub struct Session {
    #[serde(default)]
    token: Option<String>,
    #[serde(alias = "vendor", alias = "admin", alias = "customer", alias = "deliveryBoy")]
    pub user: Profile,
}

impl Session {
    /// The bearer token, wrapped so it does not leak into logs. Vendor
    /// registrations awaiting approval come back without one.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.token.clone().map(SecretString::from)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// `POST /{role}/auth/login`
///
/// # Errors
///
/// Returns `ApiError` if the credentials are rejected or the request fails.
#[instrument(skip(client, password), fields(role = %client.role()))]
pub async fn login(
    client: &ApiClient,
    email: &Email,
    password: &SecretString,
) -> Result<Session, ApiError> {
    client
        .post::<Session, _>(
            &[client.role().api_prefix(), "auth", "login"],
            &LoginRequest {
                email: email.as_str(),
                password: password.expose_secret(),
            },
            Auth::Public,
        )
        .await?
        .into_data()
}

/// `POST /{role}/auth/logout`
///
/// A 401 here means the backend already dropped the session; it comes back
/// as `ApiError::Unauthorized` without touching the stored token.
///
/// # Errors
///
/// Returns `ApiError` if the request fails.
#[instrument(skip(client), fields(role = %client.role()))]
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    client
        .post::<serde_json::Value, _>(
            &[client.role().api_prefix(), "auth", "logout"],
            &serde_json::json!({}),
            Auth::Closing,
        )
        .await
        .map(|_| ())
}

/// `GET /{role}/auth/profile`
///
/// # Errors
///
/// Returns `ApiError` if the session is invalid or the request fails.
#[instrument(skip(client), fields(role = %client.role()))]
pub async fn profile(client: &ApiClient) -> Result<Profile, ApiError> {
    client
        .get::<Profile>(&[client.role().api_prefix(), "auth", "profile"], &[])
        .await?
        .into_data()
}

/// `POST /{customer|vendor}/auth/register`
///
/// # Errors
///
/// Returns `ApiError` if the backend rejects the registration.
#[instrument(skip(client, request), fields(role = %client.role()))]
pub async fn register<B: Serialize + Sync>(
    client: &ApiClient,
    request: &B,
) -> Result<Session, ApiError> {
    client
        .post::<Session, _>(
            &[client.role().api_prefix(), "auth", "register"],
            request,
            Auth::Public,
        )
        .await?
        .into_data()
}

/// `POST /customer/auth/send-otp`
///
/// # Errors
///
/// Returns `ApiError` if the request fails.
#[instrument(skip_all)]
pub async fn send_otp(client: &ApiClient, request: &OtpRequest) -> Result<(), ApiError> {
    client
        .post::<serde_json::Value, _>(
            &[Role::Customer.api_prefix(), "auth", "send-otp"],
            request,
            Auth::Public,
        )
        .await
        .map(|_| ())
}

/// `POST /customer/auth/verify-otp`
///
/// # Errors
///
/// Returns `ApiError` if the code is rejected or the request fails.
#[instrument(skip_all)]
pub async fn verify_otp(client: &ApiClient, login: &OtpLogin) -> Result<Session, ApiError> {
    client
        .post::<Session, _>(
            &[Role::Customer.api_prefix(), "auth", "verify-otp"],
            login,
            Auth::Public,
        )
        .await?
        .into_data()
}

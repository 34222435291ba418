//! Login state of one role.
//!
//! [`AuthSession`] wraps the auth endpoints and keeps the role's bearer token
//! in persisted storage. Logging in as one role never touches another role's
//! token, so an admin and a vendor can be signed in side by side.

use bazaar_core::{
    CustomerRegistration, Email, OtpLogin, OtpRequest, Role, Validate, ValidationError,
    VendorRegistration,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::notify::Notice;
use crate::services::auth::{self, Profile, Session};

/// Authentication actions for the client's role.
#[derive(Debug, Clone)]
pub struct AuthSession {
    client: ApiClient,
}

impl AuthSession {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.client.role()
    }

    /// Whether a token is stored for this role. Says nothing about whether
    /// the backend still accepts it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if storage cannot be read.
    pub fn is_logged_in(&self) -> Result<bool, ApiError> {
        Ok(self.client.tokens().get(self.role())?.is_some())
    }

    /// Sign in with email and password and keep the issued token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` without sending anything for a
    /// malformed email or empty password, or the request's `ApiError`.
    #[instrument(skip(self, password), fields(role = %self.role()))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Profile, ApiError> {
        let email = Email::parse(email).map_err(|e| self.refuse(e.into()))?;
        if password.expose_secret().is_empty() {
            return Err(self.refuse(ValidationError::Required { field: "password" }));
        }

        let session = auth::login(&self.client, &email, password).await?;
        if session.token().is_none() {
            let error = ApiError::Parse("login response has no token".to_string());
            tracing::warn!(error = %error, "Login accepted without a session");
            self.notify(Notice::error(error.user_message()));
            return Err(error);
        }
        let profile = self.keep(session)?;
        tracing::info!(user = %profile.id, "Logged in");
        self.notify(Notice::success(format!("Welcome back, {}", display_name(&profile))));
        Ok(profile)
    }

    /// Tell the backend the session is over, then forget the token.
    ///
    /// The token is removed even if the backend call fails, so a dead
    /// backend cannot keep a user signed in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the token cannot be removed.
    #[instrument(skip(self), fields(role = %self.role()))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        if self.is_logged_in()?
            && let Err(e) = auth::logout(&self.client).await
        {
            tracing::debug!(error = %e, "Logout request failed, clearing token anyway");
        }
        self.client.tokens().take(self.role())?;
        self.notify(Notice::info("Logged out"));
        self.client.notifier().redirect(self.role().login_route());
        Ok(())
    }

    /// The signed-in account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the session is gone, or the
    /// request's `ApiError`.
    pub async fn profile(&self) -> Result<Profile, ApiError> {
        auth::profile(&self.client).await
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create a customer account and sign in with it.
    ///
    /// # Errors
    ///
    /// Returns the validation or request error so the caller can keep its
    /// form open. The error has already been shown.
    #[instrument(skip_all, fields(role = %self.role()))]
    pub async fn register_customer(
        &self,
        registration: &CustomerRegistration,
    ) -> Result<Profile, ApiError> {
        self.expect_role(Role::Customer)?;
        registration.validate().map_err(|e| self.refuse(e))?;
        let session = auth::register(&self.client, registration).await?;
        let profile = self.keep(session)?;
        self.notify(Notice::success("Account created"));
        Ok(profile)
    }

    /// Apply for a vendor account. The backend may withhold the token until
    /// an admin approves the shop, in which case the vendor stays signed out.
    ///
    /// # Errors
    ///
    /// Returns the validation or request error so the caller can keep its
    /// form open. The error has already been shown.
    #[instrument(skip_all, fields(role = %self.role()))]
    pub async fn register_vendor(
        &self,
        registration: &VendorRegistration,
    ) -> Result<Profile, ApiError> {
        self.expect_role(Role::Vendor)?;
        registration.validate().map_err(|e| self.refuse(e))?;
        let session = auth::register(&self.client, registration).await?;
        let signed_in = session.token().is_some();
        let profile = self.keep(session)?;
        self.notify(Notice::success(if signed_in {
            "Shop registered"
        } else {
            "Shop registered, waiting for approval"
        }));
        Ok(profile)
    }

    // =========================================================================
    // OTP login
    // =========================================================================

    /// Text a one-time login code to a customer's phone.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a malformed number, or the
    /// request's `ApiError`.
    pub async fn send_otp(&self, phone: &str) -> Result<(), ApiError> {
        self.expect_role(Role::Customer)?;
        let request = OtpRequest {
            phone: phone.trim().to_string(),
        };
        request.validate().map_err(|e| self.refuse(e))?;
        auth::send_otp(&self.client, &request).await?;
        self.notify(Notice::info(format!("Code sent to {}", request.phone)));
        Ok(())
    }

    /// Sign a customer in with the code from [`send_otp`](Self::send_otp).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a code that is not 4 to 6 digits,
    /// or the request's `ApiError`.
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<Profile, ApiError> {
        self.expect_role(Role::Customer)?;
        let login = OtpLogin {
            phone: phone.trim().to_string(),
            otp: code.trim().to_string(),
        };
        login.validate().map_err(|e| self.refuse(e))?;
        let session = auth::verify_otp(&self.client, &login).await?;
        let profile = self.keep(session)?;
        self.notify(Notice::success(format!("Welcome, {}", display_name(&profile))));
        Ok(profile)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn keep(&self, session: Session) -> Result<Profile, ApiError> {
        if let Some(token) = session.token() {
            self.client.tokens().set(self.role(), &token)?;
        }
        Ok(session.user)
    }

    fn expect_role(&self, role: Role) -> Result<(), ApiError> {
        if self.role() == role {
            return Ok(());
        }
        Err(self.refuse(ValidationError::Invalid {
            field: "role",
            reason: format!("must be {role} for this action, not {}", self.role()),
        }))
    }

    fn refuse(&self, error: ValidationError) -> ApiError {
        let error = ApiError::from(error);
        self.notify(Notice::error(error.user_message()));
        error
    }

    fn notify(&self, notice: Notice) {
        self.client.notifier().notify(notice);
    }
}

fn display_name(profile: &Profile) -> &str {
    if profile.name.trim().is_empty() {
        profile
            .email
            .as_ref()
            .map_or(profile.id.as_str(), Email::as_str)
    } else {
        &profile.name
    }
}

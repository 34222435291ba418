//! Shared HTTP client.
//!
//! Every request made by a service function goes through [`ApiClient`], which
//!
//! - resolves path segments against the configured base URL,
//! - attaches the bearer token of the client's [`Role`],
//! - unwraps the `{success, data, message, pagination}` envelope, and
//! - acts as the global response interceptor: a 401 on an authenticated
//!   request clears that role's token and redirects to its login route, any
//!   other failure is reported as an error notice.

use std::sync::Arc;

use bazaar_core::{Pagination, Role};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, FALLBACK_MESSAGE};
use crate::notify::{Notice, Notifier};
use crate::tokens::TokenStore;

/// Message used when a 401 carries no message of its own.
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Whether a request carries the role's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach the token; a 401 ends the session.
    Bearer,
    /// Send anonymously (login, registration, OTP).
    Public,
    /// Attach the token, but treat a 401 as a session that is already over:
    /// nothing is cleared, shown or redirected (logout).
    Closing,
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    /// The `data` payload, which must be present.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Parse` if the response carried no data.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.data
            .ok_or_else(|| ApiError::Parse("response has no data".to_string()))
    }
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client bound to one role.
///
/// Cheap to clone; clones share the connection pool, token store and
/// notifier.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    role: Role,
    tokens: TokenStore,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client acting as `role`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client fails to build.
    pub fn new(
        config: &ClientConfig,
        role: Role,
        tokens: TokenStore,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_url.clone(),
                role,
                tokens,
                notifier,
            }),
        })
    }

    /// A client for another role sharing this one's pool, tokens and notifier.
    #[must_use]
    pub fn for_role(&self, role: Role) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: self.inner.http.clone(),
                base_url: self.inner.base_url.clone(),
                role,
                tokens: self.inner.tokens.clone(),
                notifier: Arc::clone(&self.inner.notifier),
            }),
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.inner.role
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    /// Resolve path segments against the base URL, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Parse` if the base URL cannot carry a path.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Parse("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// GET with query-string pairs.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(String, String)],
    ) -> Result<Envelope<T>, ApiError> {
        let builder = self.builder(Method::GET, segments)?.query(query);
        self.dispatch(builder, Auth::Bearer).await
    }

    /// POST a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
        auth: Auth,
    ) -> Result<Envelope<T>, ApiError> {
        let builder = self.builder(Method::POST, segments)?.json(body);
        self.dispatch(builder, auth).await
    }

    /// PUT a JSON body.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Envelope<T>, ApiError> {
        let builder = self.builder(Method::PUT, segments)?.json(body);
        self.dispatch(builder, Auth::Bearer).await
    }

    /// PATCH a JSON body.
    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Envelope<T>, ApiError> {
        let builder = self.builder(Method::PATCH, segments)?.json(body);
        self.dispatch(builder, Auth::Bearer).await
    }

    /// DELETE.
    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let builder = self.builder(Method::DELETE, segments)?;
        self.dispatch::<serde_json::Value>(builder, Auth::Bearer)
            .await
            .map(|_| ())
    }

    /// POST a multipart form.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: reqwest::multipart::Form,
    ) -> Result<Envelope<T>, ApiError> {
        let builder = self.builder(Method::POST, segments)?.multipart(form);
        self.dispatch(builder, Auth::Bearer).await
    }

    // =========================================================================
    // Interceptor
    // =========================================================================

    fn builder(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.http.request(method, self.url(segments)?))
    }

    #[instrument(skip_all, fields(role = %self.inner.role))]
    async fn dispatch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        auth: Auth,
    ) -> Result<Envelope<T>, ApiError> {
        let (builder, sent_token) = match auth {
            Auth::Bearer | Auth::Closing => self.attach_token(builder)?,
            Auth::Public => (builder, false),
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.report(ApiError::Http(e))),
        };

        let status = response.status();
        tracing::debug!(status = status.as_u16(), url = %response.url(), "Response received");

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Bearer {
            let message = read_error_message(response)
                .await
                .unwrap_or_else(|| SESSION_EXPIRED_MESSAGE.to_string());
            return Err(self.expire_session(message, sent_token));
        }

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Closing {
            tracing::debug!(role = %self.inner.role, "Session already closed on the backend");
            return Err(ApiError::Unauthorized(SESSION_EXPIRED_MESSAGE.to_string()));
        }

        if !status.is_success() {
            let message = read_error_message(response)
                .await
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
            return Err(self.report(ApiError::Server {
                status: status.as_u16(),
                message,
            }));
        }

        match parse_envelope::<T>(response).await {
            Ok(envelope) if envelope.success == Some(false) => {
                Err(self.report(ApiError::Server {
                    status: status.as_u16(),
                    message: envelope
                        .message
                        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
                }))
            }
            Ok(envelope) => Ok(envelope),
            Err(e) => Err(self.report(e)),
        }
    }

    /// Attach the role's token, returning whether one was sent.
    fn attach_token(&self, builder: RequestBuilder) -> Result<(RequestBuilder, bool), ApiError> {
        let token = self
            .inner
            .tokens
            .get(self.inner.role)
            .map_err(|e| self.report(ApiError::Storage(e)))?;
        Ok(match token {
            Some(token) => (builder.bearer_auth(token.expose_secret()), true),
            None => (builder, false),
        })
    }

    /// Clear the role's token and send the user to its login route.
    ///
    /// When several requests fail with 401 at once, only the one that
    /// actually removed the token redirects. A request that went out without
    /// a token always redirects.
    fn expire_session(&self, message: String, sent_token: bool) -> ApiError {
        let role = self.inner.role;
        let removed = match self.inner.tokens.take(role) {
            Ok(token) => token.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, %role, "Failed to clear token after 401");
                false
            }
        };

        if removed || !sent_token {
            tracing::info!(
                %role,
                route = role.login_route(),
                "Session rejected, redirecting to login"
            );
            self.inner.notifier.notify(Notice::error(message.clone()));
            self.inner.notifier.redirect(role.login_route());
        }

        ApiError::Unauthorized(message)
    }

    /// Show the error to the user and hand it back.
    fn report(&self, error: ApiError) -> ApiError {
        tracing::warn!(error = %error, role = %self.inner.role, "API request failed");
        self.inner.notifier.notify(Notice::error(error.user_message()));
        error
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("role", &self.inner.role)
            .finish_non_exhaustive()
    }
}

async fn parse_envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, ApiError> {
    let body = response.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Envelope {
            success: None,
            data: None,
            message: None,
            pagination: None,
        });
    }
    serde_json::from_slice(&body)
        .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")))
}

async fn read_error_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStorage;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::new(base).unwrap();
        ApiClient::new(
            &config,
            Role::Admin,
            TokenStore::new(Arc::new(MemoryStorage::new())),
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_url_joins_and_encodes_segments() {
        let client = client("https://api.example.com/api");
        let url = client.url(&["admin", "categories", "a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/admin/categories/a%20b%2Fc"
        );
    }

    #[test]
    fn test_for_role_shares_tokens() {
        let admin = client("https://api.example.com");
        admin
            .tokens()
            .set(Role::Vendor, &SecretString::from("v"))
            .unwrap();
        let vendor = admin.for_role(Role::Vendor);
        assert_eq!(vendor.role(), Role::Vendor);
        assert!(vendor.tokens().get(Role::Vendor).unwrap().is_some());
    }

    #[test]
    fn test_envelope_parsing() {
        let envelope: Envelope<Vec<u32>> = serde_json::from_str(concat!(
            r#"{"success":true,"data":[1,2],"#,
            r#""pagination":{"total":2,"page":1,"limit":10,"pages":1}}"#,
        ))
        .unwrap();
        assert_eq!(envelope.pagination.unwrap().total, 2);
        assert_eq!(envelope.into_data().unwrap(), vec![1, 2]);

        let empty: Envelope<u32> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(empty.into_data(), Err(ApiError::Parse(_))));
    }
}

//! Integration tests for the Bazaar client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! Nothing external is needed: every test starts a [`MockBackend`], an axum
//! server on `127.0.0.1:0` that speaks the backend's REST dialect
//! (`{success, data, message, pagination}` envelopes, `_id` identifiers,
//! per-role bearer tokens) and keeps its collections in memory.
//!
//! # Test Categories
//!
//! - `resource_store` - List, create, update and delete through the stores
//! - `pagination` - Page maths and "load more"
//! - `sessions` - Login, logout, registration, OTP and token expiry
//! - `actions` - Resource-specific actions (approve, block, assign, ...)
//! - `uploads` - Multipart uploads

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use bazaar_client::{
    ClientConfig, Console, KeyValueStore, MemoryStorage, RecordingNotifier,
};
use bazaar_core::Role;
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// One-time code accepted by `verify-otp`.
pub const MOCK_OTP: &str = "123456";

/// Path prefix the mock API is mounted under.
const API_PREFIX: &str = "/api";

// =============================================================================
// Backend state
// =============================================================================

/// A request as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub bearer: Option<String>,
}

/// A file received on `/upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub file_name: String,
    pub size: usize,
}

#[derive(Debug, Clone)]
struct Account {
    id: String,
    role: Role,
    name: String,
    email: String,
    password: String,
    phone: Option<String>,
}

impl Account {
    fn to_json(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "role": self.role,
        })
    }
}

#[derive(Debug, Default)]
struct Backend {
    collections: HashMap<String, Vec<Value>>,
    accounts: Vec<Account>,
    tokens: HashMap<String, (Role, String)>,
    otps: HashMap<String, String>,
    fail_next: Option<(StatusCode, String)>,
    ignore_paging: bool,
    withhold_tokens: bool,
    requests: Vec<RecordedRequest>,
    uploads: Vec<RecordedUpload>,
}

impl Backend {
    fn issue_token(&mut self, role: Role, account_id: &str) -> String {
        let token = format!("{}-{}", role.api_prefix(), uuid::Uuid::new_v4().simple());
        self.tokens
            .insert(token.clone(), (role, account_id.to_string()));
        token
    }

    fn collection(&mut self, name: &str) -> &mut Vec<Value> {
        self.collections.entry(name.to_string()).or_default()
    }

    fn position(&mut self, collection: &str, id: &str) -> Option<usize> {
        self.collection(collection)
            .iter()
            .position(|item| item.get("_id").and_then(Value::as_str) == Some(id))
    }
}

type Shared = Arc<Mutex<Backend>>;

fn lock(state: &Shared) -> MutexGuard<'_, Backend> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Server
// =============================================================================

/// In-process stand-in for the REST backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind to a free local port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state: Shared = Arc::default();

        let api = Router::new()
            .route("/upload", post(upload))
            .route(
                "/{role}/{collection}",
                get(list).post(create).patch(collection_patch),
            )
            .route(
                "/{role}/{collection}/{id}",
                get(fetch_one)
                    .post(collection_post)
                    .put(replace)
                    .patch(collection_patch_one)
                    .delete(remove),
            )
            .route("/{role}/{collection}/{id}/{action}", patch(entity_action))
            .with_state(Arc::clone(&state));
        let app = Router::new()
            .nest(API_PREFIX, api)
            .layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock backend stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Never: the base URL is always valid.
    #[must_use]
    #[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url()).unwrap()
    }

    /// Register an account that can log in. Returns its id.
    pub fn add_account(&self, role: Role, email: &str, password: &str, name: &str) -> String {
        let id = new_id();
        lock(&self.state).accounts.push(Account {
            id: id.clone(),
            role,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
        });
        id
    }

    /// Issue a token without going through login.
    pub fn issue_token(&self, role: Role) -> String {
        let id = self.add_account(role, &format!("{}@bazaar.test", new_id()), "password", "Tester");
        lock(&self.state).issue_token(role, &id)
    }

    /// Invalidate every token of `role`, as if they expired.
    pub fn expire_tokens(&self, role: Role) {
        lock(&self.state).tokens.retain(|_, (r, _)| *r != role);
    }

    /// Add entities to a collection, assigning `_id` where missing. Returns
    /// the ids in order.
    pub fn seed(&self, collection: &str, items: impl IntoIterator<Item = Value>) -> Vec<String> {
        let mut backend = lock(&self.state);
        let target = backend.collection(collection);
        items
            .into_iter()
            .map(|mut item| {
                if let Some(object) = item.as_object_mut() {
                    object
                        .entry("_id")
                        .or_insert_with(|| Value::String(new_id()));
                }
                let id = item
                    .get("_id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                target.push(item);
                id
            })
            .collect()
    }

    /// Current contents of a collection.
    #[must_use]
    pub fn items(&self, collection: &str) -> Vec<Value> {
        lock(&self.state).collection(collection).clone()
    }

    /// Make the next resource request fail with `status` and `message`.
    pub fn fail_next(&self, status: u16, message: &str) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        lock(&self.state).fail_next = Some((status, message.to_string()));
    }

    /// Answer every list request with page 1, whatever page was asked for.
    pub fn ignore_paging(&self) {
        lock(&self.state).ignore_paging = true;
    }

    /// Accept logins without issuing a token.
    pub fn withhold_tokens(&self) {
        lock(&self.state).withhold_tokens = true;
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Every file uploaded so far.
    #[must_use]
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        lock(&self.state).uploads.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A mock backend plus a console for one role, sharing in-memory storage
/// and a recording notifier.
pub struct Harness {
    pub backend: MockBackend,
    pub console: Console,
    pub notifier: Arc<RecordingNotifier>,
    pub storage: Arc<dyn KeyValueStore>,
}

impl Harness {
    /// Start a backend and open a signed-out console for `role`.
    ///
    /// # Panics
    ///
    /// Panics if the backend cannot start.
    #[allow(clippy::unwrap_used)]
    pub async fn new(role: Role) -> Self {
        let backend = MockBackend::start().await.unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        let console = Console::with_storage(
            &backend.config(),
            role,
            Arc::clone(&storage),
            notifier.clone(),
        )
        .unwrap();
        Self {
            backend,
            console,
            notifier,
            storage,
        }
    }

    /// Start a backend and open a console for `role` that is already signed
    /// in.
    ///
    /// # Panics
    ///
    /// Panics if the backend cannot start or the token cannot be stored.
    #[allow(clippy::unwrap_used)]
    pub async fn signed_in(role: Role) -> Self {
        let harness = Self::new(role).await;
        harness.sign_in(role);
        harness
    }

    /// Store a fresh backend token for `role`.
    ///
    /// # Panics
    ///
    /// Panics if the token cannot be stored.
    #[allow(clippy::unwrap_used)]
    pub fn sign_in(&self, role: Role) -> String {
        let token = self.backend.issue_token(role);
        self.console
            .client()
            .tokens()
            .set(role, &SecretString::from(token.clone()))
            .unwrap();
        token
    }

    /// Another console on the same backend, storage and notifier.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[allow(clippy::unwrap_used)]
    #[must_use]
    pub fn console_for(&self, role: Role) -> Console {
        Console::with_storage(
            &self.backend.config(),
            role,
            Arc::clone(&self.storage),
            self.notifier.clone(),
        )
        .unwrap()
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn ok(data: Value) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

/// Parse a request body, treating an empty or malformed one as `{}`.
fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| json!({}))
}

fn parse_role(raw: &str) -> Result<Role, Response> {
    raw.parse()
        .map_err(|_| fail(StatusCode::NOT_FOUND, "Route not found"))
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Record the request, check the token for `role` and apply an injected
/// failure. Returns the id of the calling account.
fn guard(
    state: &Shared,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    role: Role,
) -> Result<String, Response> {
    let mut backend = lock(state);
    let token = bearer(headers);
    backend.requests.push(RecordedRequest {
        method: method.to_string(),
        path: path.to_string(),
        bearer: token.clone(),
    });

    let account = token
        .and_then(|t| backend.tokens.get(&t).cloned())
        .filter(|(r, _)| *r == role)
        .map(|(_, id)| id)
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Not authorized, token failed"))?;

    if let Some((status, message)) = backend.fail_next.take() {
        return Err(fail(status, &message));
    }
    Ok(account)
}

fn record_public(state: &Shared, method: &Method, path: &str) {
    lock(state).requests.push(RecordedRequest {
        method: method.to_string(),
        path: path.to_string(),
        bearer: None,
    });
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

const SEARCHED_FIELDS: [&str; 6] = ["name", "title", "shopName", "code", "email", "orderNumber"];

fn matches(item: &Value, search: Option<&str>, filters: &[(&String, &String)]) -> bool {
    let searched = search.is_none_or(|term| {
        let term = term.to_lowercase();
        SEARCHED_FIELDS.iter().any(|field| {
            item.get(*field)
                .and_then(Value::as_str)
                .is_some_and(|v| v.to_lowercase().contains(&term))
        })
    });
    searched
        && filters.iter().all(|(key, expected)| {
            item.get(key.as_str())
                .and_then(field_text)
                .is_some_and(|actual| actual == **expected)
        })
}

async fn list(
    State(state): State<Shared>,
    Path((role, collection)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    if let Err(response) = guard(&state, &method, &format!("/{role}/{collection}"), &headers, role)
    {
        return response;
    }

    let mut backend = lock(&state);
    let page = params
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .filter(|_| !backend.ignore_paging)
        .unwrap_or(1)
        .max(1);
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(10)
        .max(1);
    let search = params.get("search").map(String::as_str);
    let filters: Vec<_> = params
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "page" | "limit" | "search"))
        .collect();

    let matching: Vec<Value> = backend
        .collection(&collection)
        .iter()
        .filter(|item| matches(item, search, &filters))
        .cloned()
        .collect();
    let total = matching.len();
    let data: Vec<Value> = matching
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Json(json!({
        "success": true,
        "data": data,
        "pagination": {
            "total": total,
            "page": page,
            "limit": limit,
            "pages": total.div_ceil(limit),
        }
    }))
    .into_response()
}

fn defaults_for(collection: &str, item: &mut Map<String, Value>) {
    let status = match collection {
        "orders" | "reviews" | "vendors" => "pending",
        "return-requests" => "requested",
        _ => return,
    };
    item.entry("status")
        .or_insert_with(|| Value::String(status.to_string()));

    if collection == "orders" {
        let lines: Vec<Value> = item
            .get("items")
            .and_then(Value::as_array)
            .map(|lines| {
                lines
                    .iter()
                    .map(|line| {
                        json!({
                            "product": line.get("product").cloned().unwrap_or(Value::Null),
                            "quantity": line.get("quantity").cloned().unwrap_or(json!(1)),
                            "price": "10.00",
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        let quantity: u64 = lines
            .iter()
            .filter_map(|l| l.get("quantity").and_then(Value::as_u64))
            .sum();
        item.insert("items".to_string(), Value::Array(lines));
        item.insert("total".to_string(), json!(format!("{}.00", quantity * 10)));
    }
}

async fn create(
    State(state): State<Shared>,
    Path((role, collection)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    let caller =
        match guard(&state, &method, &format!("/{role}/{collection}"), &headers, role) {
            Ok(caller) => caller,
            Err(response) => return response,
        };

    let Value::Object(mut item) = body else {
        return fail(StatusCode::BAD_REQUEST, "Body must be an object");
    };
    item.insert("_id".to_string(), Value::String(new_id()));
    if role == Role::Customer && matches!(collection.as_str(), "orders" | "reviews") {
        item.insert("customer".to_string(), Value::String(caller));
    }
    defaults_for(&collection, &mut item);

    let item = Value::Object(item);
    lock(&state).collection(&collection).push(item.clone());
    (StatusCode::CREATED, Json(json!({"success": true, "data": item}))).into_response()
}

async fn fetch_one(
    State(state): State<Shared>,
    Path((role, collection, id)): Path<(String, String, String)>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    let path = format!("/{role}/{collection}/{id}");
    let caller = match guard(&state, &method, &path, &headers, role) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    let mut backend = lock(&state);
    match (collection.as_str(), id.as_str()) {
        ("auth", "profile") => backend
            .accounts
            .iter()
            .find(|a| a.id == caller)
            .map_or_else(
                || fail(StatusCode::NOT_FOUND, "Account not found"),
                |a| ok(a.to_json()),
            ),
        ("notifications", "unread-count") => {
            let count = backend
                .collection("notifications")
                .iter()
                .filter(|n| n.get("isRead").and_then(Value::as_bool) != Some(true))
                .count();
            ok(json!({"count": count}))
        }
        _ => match backend.position(&collection, &id) {
            Some(index) => ok(backend.collection(&collection)[index].clone()),
            None => fail(StatusCode::NOT_FOUND, "Resource not found"),
        },
    }
}

async fn replace(
    State(state): State<Shared>,
    Path((role, collection, id)): Path<(String, String, String)>,
    method: Method,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    let path = format!("/{role}/{collection}/{id}");
    if let Err(response) = guard(&state, &method, &path, &headers, role) {
        return response;
    }
    merge_into(&state, &collection, &id, body)
}

async fn remove(
    State(state): State<Shared>,
    Path((role, collection, id)): Path<(String, String, String)>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    let path = format!("/{role}/{collection}/{id}");
    if let Err(response) = guard(&state, &method, &path, &headers, role) {
        return response;
    }

    let mut backend = lock(&state);
    match backend.position(&collection, &id) {
        Some(index) => {
            backend.collection(&collection).remove(index);
            Json(json!({"success": true, "message": "Deleted"})).into_response()
        }
        None => fail(StatusCode::NOT_FOUND, "Resource not found"),
    }
}

fn merge_into(state: &Shared, collection: &str, id: &str, body: Value) -> Response {
    let mut backend = lock(state);
    let Some(index) = backend.position(collection, id) else {
        return fail(StatusCode::NOT_FOUND, "Resource not found");
    };
    let item = &mut backend.collection(collection)[index];
    if let (Some(target), Value::Object(changes)) = (item.as_object_mut(), body) {
        for (key, value) in changes {
            if key != "_id" {
                target.insert(key, value);
            }
        }
    }
    ok(item.clone())
}

/// `PATCH /{role}/{collection}` has no meaning; answer like the backend.
async fn collection_patch() -> Response {
    fail(StatusCode::NOT_FOUND, "Route not found")
}

/// `PATCH /{role}/notifications/read-all`
async fn collection_patch_one(
    State(state): State<Shared>,
    Path((role, collection, id)): Path<(String, String, String)>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    let path = format!("/{role}/{collection}/{id}");
    if let Err(response) = guard(&state, &method, &path, &headers, role) {
        return response;
    }
    if collection != "notifications" || id != "read-all" {
        return fail(StatusCode::NOT_FOUND, "Route not found");
    }

    let mut backend = lock(&state);
    let mut modified = 0;
    for notification in backend.collection("notifications") {
        if notification.get("isRead").and_then(Value::as_bool) != Some(true)
            && let Some(object) = notification.as_object_mut()
        {
            object.insert("isRead".to_string(), Value::Bool(true));
            modified += 1;
        }
    }
    ok(json!({"modified": modified}))
}

async fn entity_action(
    State(state): State<Shared>,
    Path((role, collection, id, action)): Path<(String, String, String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    let path = format!("/{role}/{collection}/{id}/{action}");
    if let Err(response) = guard(&state, &method, &path, &headers, role) {
        return response;
    }
    let body = json_body(&body);

    match action.as_str() {
        "cancel" => {
            let current = {
                let mut backend = lock(&state);
                backend.position(&collection, &id).and_then(|index| {
                    backend.collection(&collection)[index]
                        .get("status")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
            };
            match current.as_deref() {
                Some("pending" | "confirmed" | "processing") => {
                    merge_into(&state, &collection, &id, json!({"status": "cancelled"}))
                }
                Some(_) => fail(StatusCode::BAD_REQUEST, "Order can no longer be cancelled"),
                None => fail(StatusCode::NOT_FOUND, "Resource not found"),
            }
        }
        "read" => merge_into(&state, &collection, &id, json!({"isRead": true})),
        "assign" => {
            let delivery_boy = body.get("deliveryBoy").cloned().unwrap_or(Value::Null);
            merge_into(&state, &collection, &id, json!({"deliveryBoy": delivery_boy}))
        }
        "status" | "stock" => merge_into(&state, &collection, &id, body),
        _ => fail(StatusCode::NOT_FOUND, "Route not found"),
    }
}

/// POSTs with three segments: auth endpoints and coupon validation.
async fn collection_post(
    State(state): State<Shared>,
    Path((role, collection, action)): Path<(String, String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    let path = format!("/{role}/{collection}/{action}");
    let body = json_body(&body);
    let text = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    match (collection.as_str(), action.as_str()) {
        ("auth", "login") => {
            record_public(&state, &method, &path);
            let mut backend = lock(&state);
            let account = backend
                .accounts
                .iter()
                .find(|a| {
                    a.role == role
                        && a.email.eq_ignore_ascii_case(&text("email"))
                        && a.password == text("password")
                })
                .cloned();
            match account {
                Some(account) if backend.withhold_tokens => ok(json!({"user": account.to_json()})),
                Some(account) => {
                    let token = backend.issue_token(role, &account.id);
                    ok(json!({"token": token, "user": account.to_json()}))
                }
                None => fail(StatusCode::UNAUTHORIZED, "Invalid email or password"),
            }
        }
        ("auth", "register") => {
            record_public(&state, &method, &path);
            let mut backend = lock(&state);
            let email = text("email");
            if backend
                .accounts
                .iter()
                .any(|a| a.role == role && a.email.eq_ignore_ascii_case(&email))
            {
                return fail(StatusCode::BAD_REQUEST, "Email already registered");
            }
            let name = if role == Role::Vendor {
                text("ownerName")
            } else {
                text("name")
            };
            let account = Account {
                id: new_id(),
                role,
                name,
                email,
                password: text("password"),
                phone: body.get("phone").and_then(Value::as_str).map(str::to_string),
            };
            backend.accounts.push(account.clone());
            if role == Role::Vendor {
                let mut vendor = body.clone();
                if let Some(object) = vendor.as_object_mut() {
                    object.remove("password");
                    object.insert("_id".to_string(), Value::String(account.id.clone()));
                    object.insert("status".to_string(), json!("pending"));
                }
                backend.collection("vendors").push(vendor);
                return (
                    StatusCode::CREATED,
                    Json(json!({"success": true, "data": {"vendor": account.to_json()}})),
                )
                    .into_response();
            }
            let token = backend.issue_token(role, &account.id);
            (
                StatusCode::CREATED,
                Json(json!({"success": true, "data": {"token": token, "user": account.to_json()}})),
            )
                .into_response()
        }
        ("auth", "send-otp") => {
            record_public(&state, &method, &path);
            lock(&state)
                .otps
                .insert(text("phone"), MOCK_OTP.to_string());
            Json(json!({"success": true, "message": "OTP sent"})).into_response()
        }
        ("auth", "verify-otp") => {
            record_public(&state, &method, &path);
            let mut backend = lock(&state);
            let phone = text("phone");
            if backend.otps.get(&phone) != Some(&text("otp")) {
                return fail(StatusCode::BAD_REQUEST, "Invalid or expired OTP");
            }
            backend.otps.remove(&phone);
            let account = backend
                .accounts
                .iter()
                .find(|a| a.role == Role::Customer && a.phone.as_deref() == Some(phone.as_str()))
                .cloned()
                .unwrap_or_else(|| Account {
                    id: new_id(),
                    role: Role::Customer,
                    name: String::new(),
                    email: format!("{phone}@otp.bazaar.test"),
                    password: String::new(),
                    phone: Some(phone.clone()),
                });
            if !backend.accounts.iter().any(|a| a.id == account.id) {
                backend.accounts.push(account.clone());
            }
            let token = backend.issue_token(Role::Customer, &account.id);
            ok(json!({"token": token, "customer": account.to_json()}))
        }
        ("auth", "logout") => {
            if let Err(response) = guard(&state, &method, &path, &headers, role) {
                return response;
            }
            if let Some(token) = bearer(&headers) {
                lock(&state).tokens.remove(&token);
            }
            Json(json!({"success": true, "message": "Logged out"})).into_response()
        }
        ("coupons", "validate") => {
            if let Err(response) = guard(&state, &method, &path, &headers, role) {
                return response;
            }
            quote_coupon(&state, &text("code"), body.get("cartTotal"))
        }
        _ => fail(StatusCode::NOT_FOUND, "Route not found"),
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn quote_coupon(state: &Shared, code: &str, cart_total: Option<&Value>) -> Response {
    let Some(cart_total) = number(cart_total) else {
        return fail(StatusCode::BAD_REQUEST, "Cart total is required");
    };
    let mut backend = lock(state);
    let coupon = backend
        .collection("coupons")
        .iter()
        .find(|c| {
            c.get("code")
                .and_then(Value::as_str)
                .is_some_and(|c| c.eq_ignore_ascii_case(code))
                && c.get("isActive").and_then(Value::as_bool) != Some(false)
        })
        .cloned();
    let Some(coupon) = coupon else {
        return fail(StatusCode::BAD_REQUEST, "Invalid or expired coupon");
    };

    let value = number(coupon.get("discountValue")).unwrap_or_default();
    let discount = match coupon.get("discountType").and_then(Value::as_str) {
        Some("percentage") => cart_total * value / 100.0,
        _ => value,
    }
    .min(cart_total);

    ok(json!({
        "code": coupon.get("code").cloned().unwrap_or(Value::Null),
        "discount": format!("{discount:.2}"),
        "finalTotal": format!("{:.2}", cart_total - discount),
    }))
}

async fn upload(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let authorized = {
        let mut backend = lock(&state);
        let token = bearer(&headers);
        backend.requests.push(RecordedRequest {
            method: "POST".to_string(),
            path: "/upload".to_string(),
            bearer: token.clone(),
        });
        token.is_some_and(|t| backend.tokens.contains_key(&t))
    };
    if !authorized {
        return fail(StatusCode::UNAUTHORIZED, "Not authorized, token failed");
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let Ok(bytes) = field.bytes().await else {
            return fail(StatusCode::BAD_REQUEST, "Upload failed");
        };
        lock(&state).uploads.push(RecordedUpload {
            file_name: file_name.clone(),
            size: bytes.len(),
        });
        let public_id = new_id();
        return ok(json!({
            "url": format!("https://cdn.bazaar.test/{public_id}/{file_name}"),
            "public_id": public_id,
        }));
    }
    fail(StatusCode::BAD_REQUEST, "No file uploaded")
}

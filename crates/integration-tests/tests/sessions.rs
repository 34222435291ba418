//! Integration tests for sign-in, registration, OTP and expired sessions.

#![allow(clippy::unwrap_used)]

use bazaar_client::ApiError;
use bazaar_core::{CustomerRegistration, ListQuery, Role, VendorRegistration};
use bazaar_integration_tests::{Harness, MOCK_OTP};
use secrecy::SecretString;
use serde_json::json;

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

// =============================================================================
// Login / Logout
// =============================================================================

#[tokio::test]
async fn test_login_stores_token_for_role_only() {
    let harness = Harness::new(Role::Admin).await;
    harness
        .backend
        .add_account(Role::Admin, "ops@bazaar.test", "hunter22", "Ops");

    let profile = harness
        .console
        .auth
        .login("ops@bazaar.test", &password("hunter22"))
        .await
        .unwrap();

    assert_eq!(profile.name, "Ops");
    let tokens = harness.console.client().tokens();
    assert!(tokens.get(Role::Admin).unwrap().is_some());
    assert!(tokens.get(Role::Vendor).unwrap().is_none());
    assert_eq!(
        harness.notifier.notices().pop().unwrap().message,
        "Welcome back, Ops"
    );

    let login = harness.backend.requests().pop().unwrap();
    assert_eq!(login.path, "/admin/auth/login");
    assert!(login.bearer.is_none());
}

#[tokio::test]
async fn test_wrong_password_reports_without_redirect() {
    let harness = Harness::new(Role::Vendor).await;
    harness
        .backend
        .add_account(Role::Vendor, "shop@bazaar.test", "right-one", "Shop");

    let err = harness
        .console
        .auth
        .login("shop@bazaar.test", &password("wrong-one"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!harness.console.auth.is_logged_in().unwrap());
    assert_eq!(harness.notifier.errors(), ["Invalid email or password"]);
    assert!(harness.notifier.redirects().is_empty());
}

#[tokio::test]
async fn test_profile_after_login() {
    let harness = Harness::new(Role::Delivery).await;
    harness
        .backend
        .add_account(Role::Delivery, "rider@bazaar.test", "pedal-fast", "Rider");
    harness
        .console
        .auth
        .login("rider@bazaar.test", &password("pedal-fast"))
        .await
        .unwrap();

    let profile = harness.console.auth.profile().await.unwrap();

    assert_eq!(profile.name, "Rider");
    assert_eq!(profile.role, Some(Role::Delivery));
}

#[tokio::test]
async fn test_logout_clears_token_and_redirects() {
    let harness = Harness::signed_in(Role::Admin).await;

    harness.console.auth.logout().await.unwrap();

    assert!(!harness.console.auth.is_logged_in().unwrap());
    assert_eq!(harness.notifier.redirects(), ["/admin/login"]);
    let logout = harness.backend.requests().pop().unwrap();
    assert_eq!(logout.path, "/admin/auth/logout");
}

#[tokio::test]
async fn test_logout_with_expired_token_redirects_once() {
    let harness = Harness::signed_in(Role::Admin).await;
    harness.backend.expire_tokens(Role::Admin);

    harness.console.auth.logout().await.unwrap();

    assert!(!harness.console.auth.is_logged_in().unwrap());
    assert_eq!(harness.notifier.redirects(), ["/admin/login"]);
    assert!(harness.notifier.errors().is_empty());
    assert_eq!(
        harness.notifier.notices().pop().unwrap().message,
        "Logged out"
    );
}

#[tokio::test]
async fn test_login_without_token_reports_error() {
    let harness = Harness::new(Role::Admin).await;
    harness
        .backend
        .add_account(Role::Admin, "ops@bazaar.test", "hunter22", "Ops");
    harness.backend.withhold_tokens();

    let err = harness
        .console
        .auth
        .login("ops@bazaar.test", &password("hunter22"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Parse(_)));
    assert!(!harness.console.auth.is_logged_in().unwrap());
    assert_eq!(harness.notifier.errors(), [err.user_message()]);
    assert!(harness.notifier.redirects().is_empty());
}

// =============================================================================
// Expired sessions
// =============================================================================

#[tokio::test]
async fn test_expired_token_redirects_once() {
    let harness = Harness::signed_in(Role::Admin).await;
    harness.backend.seed("brands", [json!({"name": "Acme"})]);
    harness.backend.seed("categories", [json!({"name": "Shoes"})]);
    harness.backend.expire_tokens(Role::Admin);

    let (brands, categories) = tokio::join!(
        harness.console.brands.fetch(ListQuery::new()),
        harness.console.categories.fetch(ListQuery::new()),
    );

    assert!(brands.unwrap_err().is_unauthorized());
    assert!(categories.unwrap_err().is_unauthorized());
    assert_eq!(harness.notifier.redirects(), ["/admin/login"]);
    assert!(!harness.console.auth.is_logged_in().unwrap());
}

#[tokio::test]
async fn test_expired_token_leaves_other_roles_signed_in() {
    let harness = Harness::signed_in(Role::Admin).await;
    let vendor = harness.console_for(Role::Vendor);
    harness.sign_in(Role::Vendor);
    harness.backend.expire_tokens(Role::Admin);

    harness
        .console
        .brands
        .fetch(ListQuery::new())
        .await
        .unwrap_err();

    let tokens = harness.console.client().tokens();
    assert!(tokens.get(Role::Admin).unwrap().is_none());
    assert!(tokens.get(Role::Vendor).unwrap().is_some());
    vendor.products.fetch(ListQuery::new()).await.unwrap();
    assert_eq!(harness.notifier.redirects(), ["/admin/login"]);
}

#[tokio::test]
async fn test_request_without_token_redirects() {
    let harness = Harness::new(Role::Customer).await;

    let err = harness
        .console
        .orders
        .fetch(ListQuery::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(harness.notifier.redirects(), ["/login"]);
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_customer_registration_signs_in() {
    let harness = Harness::new(Role::Customer).await;

    let profile = harness
        .console
        .auth
        .register_customer(&CustomerRegistration {
            name: "Ada".to_string(),
            email: "ada@bazaar.test".to_string(),
            password: "correct horse".to_string(),
            phone: None,
        })
        .await
        .unwrap();

    assert_eq!(profile.name, "Ada");
    assert!(harness.console.auth.is_logged_in().unwrap());
}

#[tokio::test]
async fn test_vendor_registration_waits_for_approval() {
    let harness = Harness::new(Role::Vendor).await;

    harness
        .console
        .auth
        .register_vendor(&VendorRegistration {
            shop_name: "Tea House".to_string(),
            owner_name: "Mei".to_string(),
            email: "mei@bazaar.test".to_string(),
            password: "oolong-leaf".to_string(),
            phone: "+15550100".to_string(),
        })
        .await
        .unwrap();

    assert!(!harness.console.auth.is_logged_in().unwrap());
    assert_eq!(
        harness.notifier.notices().pop().unwrap().message,
        "Shop registered, waiting for approval"
    );
    let vendors = harness.backend.items("vendors");
    assert_eq!(vendors.len(), 1);
    assert_eq!(vendors[0]["status"], "pending");
    assert!(vendors[0].get("password").is_none());
}

#[tokio::test]
async fn test_short_password_never_sent() {
    let harness = Harness::new(Role::Customer).await;

    let err = harness
        .console
        .auth
        .register_customer(&CustomerRegistration {
            name: "Bob".to_string(),
            email: "bob@bazaar.test".to_string(),
            password: "short".to_string(),
            phone: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(harness.backend.requests().is_empty());
}

// =============================================================================
// OTP
// =============================================================================

#[tokio::test]
async fn test_otp_login() {
    let harness = Harness::new(Role::Customer).await;

    harness.console.auth.send_otp("+15550123").await.unwrap();
    harness
        .console
        .auth
        .verify_otp("+15550123", MOCK_OTP)
        .await
        .unwrap();

    assert!(harness.console.auth.is_logged_in().unwrap());
    let paths: Vec<_> = harness
        .backend
        .requests()
        .into_iter()
        .map(|r| r.path)
        .collect();
    assert_eq!(paths, ["/customer/auth/send-otp", "/customer/auth/verify-otp"]);
}

#[tokio::test]
async fn test_wrong_otp_keeps_customer_signed_out() {
    let harness = Harness::new(Role::Customer).await;
    harness.console.auth.send_otp("+15550123").await.unwrap();

    let err = harness
        .console
        .auth
        .verify_otp("+15550123", "000000")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(!harness.console.auth.is_logged_in().unwrap());
    assert_eq!(harness.notifier.errors(), ["Invalid or expired OTP"]);
}

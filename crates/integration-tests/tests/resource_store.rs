//! Integration tests for list, create, update and delete through a store.
//!
//! Every test runs against a fresh mock backend, so the server list is the
//! ground truth the store must agree with.

#![allow(clippy::unwrap_used)]

use bazaar_client::{ApiError, NoticeLevel};
use bazaar_core::{BrandDraft, BrandId, ListQuery, Role};
use bazaar_integration_tests::Harness;
use serde_json::json;

async fn admin_with_brands(count: usize) -> Harness {
    let harness = Harness::signed_in(Role::Admin).await;
    harness
        .backend
        .seed("brands", (1..=count).map(|i| json!({"name": format!("Brand {i:02}")})));
    harness
}

fn draft(name: &str) -> BrandDraft {
    BrandDraft {
        name: name.to_string(),
        is_active: true,
        ..Default::default()
    }
}

// =============================================================================
// Fetch
// =============================================================================

#[tokio::test]
async fn test_fetch_mirrors_server_list() {
    let harness = admin_with_brands(3).await;
    let brands = &harness.console.brands;

    let pagination = brands.fetch(ListQuery::new()).await.unwrap();

    let names: Vec<_> = brands.items().await.into_iter().map(|b| b.name).collect();
    assert_eq!(names, ["Brand 01", "Brand 02", "Brand 03"]);
    assert_eq!(pagination.total, 3);
    assert_eq!(pagination.page, 1);
    assert_eq!(pagination.pages, 1);
    assert!(!brands.is_loading());
}

#[tokio::test]
async fn test_fetch_sends_search_and_filters() {
    let harness = Harness::signed_in(Role::Admin).await;
    harness.backend.seed(
        "brands",
        [
            json!({"name": "Acme", "isActive": true}),
            json!({"name": "Acme Outlet", "isActive": false}),
            json!({"name": "Globex", "isActive": true}),
        ],
    );
    let brands = &harness.console.brands;

    brands
        .fetch(ListQuery::new().search("acme").filter("isActive", "true"))
        .await
        .unwrap();

    let names: Vec<_> = brands.items().await.into_iter().map(|b| b.name).collect();
    assert_eq!(names, ["Acme"]);
}

#[tokio::test]
async fn test_fetch_uses_role_prefix() {
    let harness = Harness::signed_in(Role::Vendor).await;
    harness.backend.seed("products", [json!({"name": "Mug", "price": "9.50"})]);

    harness.console.products.fetch(ListQuery::new()).await.unwrap();

    let request = harness.backend.requests().pop().unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/vendor/products");
    assert!(request.bearer.is_some());
}

#[tokio::test]
async fn test_failed_fetch_keeps_list() {
    let harness = admin_with_brands(2).await;
    let brands = &harness.console.brands;
    brands.fetch(ListQuery::new()).await.unwrap();

    harness.backend.fail_next(500, "Database unavailable");
    let err = brands.fetch(ListQuery::new().page(2)).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(brands.len().await, 2);
    assert_eq!(harness.notifier.errors(), ["Database unavailable"]);
    assert!(!brands.is_loading());
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_adds_server_copy_once() {
    let harness = admin_with_brands(2).await;
    let brands = &harness.console.brands;
    brands.fetch(ListQuery::new()).await.unwrap();

    let created = brands.create(&draft("Initech")).await.unwrap();

    let items = brands.items().await;
    assert_eq!(items.iter().filter(|b| b.id == created.id).count(), 1);
    assert_eq!(items.len(), 3);
    assert_eq!(brands.pagination().await.total, 3);
    assert_eq!(harness.backend.items("brands").len(), 3);

    let last = harness.notifier.notices().pop().unwrap();
    assert_eq!(last.level, NoticeLevel::Success);
    assert_eq!(last.message, "Brand created");
}

#[tokio::test]
async fn test_invalid_draft_never_reaches_server() {
    let harness = admin_with_brands(1).await;
    let brands = &harness.console.brands;
    let before = harness.backend.requests().len();

    let err = brands.create(&draft("   ")).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(harness.backend.requests().len(), before);
    assert_eq!(harness.notifier.errors().len(), 1);
    assert!(brands.is_empty().await);
}

#[tokio::test]
async fn test_failed_create_leaves_list_unchanged() {
    let harness = admin_with_brands(2).await;
    let brands = &harness.console.brands;
    brands.fetch(ListQuery::new()).await.unwrap();
    let before = brands.items().await;

    harness.backend.fail_next(400, "Brand name already exists");
    let err = brands.create(&draft("Brand 01")).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(brands.items().await, before);
    assert_eq!(brands.pagination().await.total, 2);
    assert_eq!(harness.notifier.errors(), ["Brand name already exists"]);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_replaces_only_matching_item() {
    let harness = admin_with_brands(3).await;
    let brands = &harness.console.brands;
    brands.fetch(ListQuery::new()).await.unwrap();
    let before = brands.items().await;
    let target = before[1].id.clone();

    let updated = brands.update(&target, &draft("Renamed")).await.unwrap();

    let after = brands.items().await;
    assert_eq!(updated.name, "Renamed");
    assert_eq!(after.len(), before.len());
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1].name, "Renamed");
    assert_eq!(after[2], before[2]);
    assert_eq!(
        harness.notifier.notices().pop().unwrap().message,
        "Brand updated"
    );
}

#[tokio::test]
async fn test_failed_update_leaves_list_unchanged() {
    let harness = admin_with_brands(2).await;
    let brands = &harness.console.brands;
    brands.fetch(ListQuery::new()).await.unwrap();
    let before = brands.items().await;

    let err = brands
        .update(&BrandId::new("missing"), &draft("Ghost"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(brands.items().await, before);
}

#[tokio::test]
async fn test_set_active_patches_status() {
    let harness = admin_with_brands(1).await;
    let brands = &harness.console.brands;
    brands.fetch(ListQuery::new()).await.unwrap();
    let id = brands.items().await[0].id.clone();

    let brand = brands.set_active(&id, false).await.unwrap();

    assert!(!brand.is_active);
    assert!(!brands.find(&id).await.unwrap().is_active);
    let request = harness.backend.requests().pop().unwrap();
    assert_eq!(request.method, "PATCH");
    assert_eq!(request.path, format!("/admin/brands/{id}/status"));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_removes_id() {
    let harness = admin_with_brands(3).await;
    let brands = &harness.console.brands;
    brands.fetch(ListQuery::new()).await.unwrap();
    let id = brands.items().await[0].id.clone();

    brands.delete(&id).await.unwrap();

    assert!(brands.find(&id).await.is_none());
    assert_eq!(brands.len().await, 2);
    assert_eq!(brands.pagination().await.total, 2);
    assert_eq!(harness.backend.items("brands").len(), 2);
}

#[tokio::test]
async fn test_failed_delete_keeps_item() {
    let harness = admin_with_brands(2).await;
    let brands = &harness.console.brands;
    brands.fetch(ListQuery::new()).await.unwrap();
    let id = brands.items().await[0].id.clone();

    harness.backend.fail_next(403, "Brand has products");
    brands.delete(&id).await.unwrap_err();

    assert!(brands.find(&id).await.is_some());
    assert_eq!(brands.len().await, 2);
    assert_eq!(harness.notifier.errors(), ["Brand has products"]);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_cached_list_survives_new_console() {
    let harness = admin_with_brands(4).await;
    harness.console.brands.fetch(ListQuery::new()).await.unwrap();

    let reopened = harness.console_for(Role::Admin);
    let restored = reopened.hydrate().await.unwrap();

    assert_eq!(restored, 4);
    assert_eq!(
        reopened.brands.items().await,
        harness.console.brands.items().await
    );
}

#[tokio::test]
async fn test_cache_is_per_role() {
    let harness = admin_with_brands(2).await;
    harness.console.brands.fetch(ListQuery::new()).await.unwrap();

    let vendor = harness.console_for(Role::Vendor);
    vendor.hydrate().await.unwrap();

    assert!(vendor.brands.is_empty().await);
}

//! Integration tests for page maths and incremental loading.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use bazaar_client::store::Merge;
use bazaar_core::{ListQuery, Role};
use bazaar_integration_tests::Harness;
use serde_json::json;

async fn admin_with_categories(count: usize) -> Harness {
    let harness = Harness::signed_in(Role::Admin).await;
    harness.backend.seed(
        "categories",
        (1..=count).map(|i| json!({"name": format!("Category {i:02}")})),
    );
    harness
}

#[tokio::test]
async fn test_page_count_rounds_up() {
    let harness = admin_with_categories(25).await;
    let categories = &harness.console.categories;

    let pagination = categories
        .fetch(ListQuery::new().page(1).limit(10))
        .await
        .unwrap();

    assert_eq!(pagination.total, 25);
    assert_eq!(pagination.pages, 3);
    assert_eq!(categories.len().await, 10);
}

#[tokio::test]
async fn test_last_page_is_partial() {
    let harness = admin_with_categories(25).await;
    let categories = &harness.console.categories;

    let pagination = categories
        .fetch(ListQuery::new().page(3).limit(10))
        .await
        .unwrap();

    assert_eq!(pagination.page, 3);
    assert_eq!(categories.len().await, 5);
    assert!(!pagination.has_next());
}

#[tokio::test]
async fn test_page_past_end_is_empty() {
    let harness = admin_with_categories(25).await;
    let categories = &harness.console.categories;

    let pagination = categories
        .fetch(ListQuery::new().page(4).limit(10))
        .await
        .unwrap();

    assert!(categories.is_empty().await);
    assert_eq!(pagination.total, 25);
    assert_eq!(pagination.pages, 3);
}

#[tokio::test]
async fn test_fetch_more_appends_next_page() {
    let harness = admin_with_categories(25).await;
    let categories = &harness.console.categories;
    categories
        .fetch(ListQuery::new().limit(10))
        .await
        .unwrap();

    assert!(categories.fetch_more().await.unwrap());
    assert_eq!(categories.len().await, 20);
    assert_eq!(categories.pagination().await.page, 2);

    assert!(categories.fetch_more().await.unwrap());
    assert_eq!(categories.len().await, 25);

    let requests = harness.backend.requests().len();
    assert!(!categories.fetch_more().await.unwrap());
    assert_eq!(harness.backend.requests().len(), requests);
}

#[tokio::test]
async fn test_fetch_more_without_fetch_sends_nothing() {
    let harness = admin_with_categories(5).await;

    assert!(!harness.console.categories.fetch_more().await.unwrap());
    assert!(harness.backend.requests().is_empty());
}

#[tokio::test]
async fn test_fetch_all_walks_every_page() {
    let harness = admin_with_categories(23).await;
    let categories = &harness.console.categories;

    let pagination = categories
        .fetch_all(ListQuery::new().limit(5))
        .await
        .unwrap();

    let names: Vec<_> = categories
        .items()
        .await
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names.len(), 23);
    assert_eq!(names.first().map(String::as_str), Some("Category 01"));
    assert_eq!(names.last().map(String::as_str), Some("Category 23"));
    assert_eq!(pagination.pages, 5);
    assert_eq!(harness.backend.requests().len(), 5);
}

#[tokio::test]
async fn test_fetch_all_stops_when_backend_ignores_page() {
    let harness = admin_with_categories(12).await;
    harness.backend.ignore_paging();
    let categories = &harness.console.categories;

    let pagination = tokio::time::timeout(
        Duration::from_secs(5),
        categories.fetch_all(ListQuery::new().limit(5)),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(pagination.page, 1);
    assert_eq!(pagination.pages, 3);
    assert_eq!(categories.len().await, 5);
    assert_eq!(harness.backend.requests().len(), 2);
    assert!(!categories.fetch_more().await.unwrap());
}

#[tokio::test]
async fn test_append_skips_entities_already_listed() {
    let harness = admin_with_categories(12).await;
    let categories = &harness.console.categories;
    categories
        .fetch(ListQuery::new().limit(10))
        .await
        .unwrap();

    // Page 1 again, appended: nothing new.
    categories
        .fetch_with(ListQuery::new().limit(10), Merge::Append)
        .await
        .unwrap();

    assert_eq!(categories.len().await, 10);
}

#[tokio::test]
async fn test_fetch_more_keeps_filters() {
    let harness = Harness::signed_in(Role::Admin).await;
    harness.backend.seed(
        "categories",
        (1..=8).map(|i| json!({"name": format!("Category {i}"), "isActive": i % 2 == 0})),
    );
    let categories = &harness.console.categories;

    categories
        .fetch(ListQuery::new().limit(2).filter("isActive", "true"))
        .await
        .unwrap();
    while categories.fetch_more().await.unwrap() {}

    let items = categories.items().await;
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|c| c.is_active));
}

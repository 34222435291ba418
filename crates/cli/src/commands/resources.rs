//! `list`, `delete` and `status`.

use bazaar_client::{ApiError, Console, ResourceStore};
use bazaar_core::{
    ActivityStatus, ListQuery, OrderStatus, ProductStatus, Resource, ReturnStatus, ReviewStatus,
    Role, VendorStatus,
};

use super::{CliError, ResourceKind, parse_status, with_store};

/// Build a list query from command-line arguments.
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` for a zero page or limit, or a filter
/// without `=`.
pub fn build_query(
    page: u32,
    limit: u32,
    search: Option<String>,
    filters: &[String],
) -> Result<ListQuery, CliError> {
    if page == 0 || limit == 0 {
        return Err(CliError::InvalidArgument(
            "page and limit start at 1".to_string(),
        ));
    }
    let mut query = ListQuery::new().page(page).limit(limit);
    if let Some(term) = search {
        query = query.search(term);
    }
    for filter in filters {
        let (key, value) = filter.split_once('=').ok_or_else(|| {
            CliError::InvalidArgument(format!("filter {filter:?} is not KEY=VALUE"))
        })?;
        query = query.filter(key.trim(), value.trim());
    }
    Ok(query)
}

/// Fetch and print a list.
///
/// When the backend cannot be reached, a list restored from the local cache
/// is printed instead, with a warning.
///
/// # Errors
///
/// Returns `CliError` if a request fails and there is no cached list.
pub async fn list(
    console: &Console,
    kind: ResourceKind,
    query: ListQuery,
    all: bool,
) -> Result<(), CliError> {
    with_store!(console, kind, |store| print_list(store, query, all).await)
}

async fn print_list<R: Resource>(
    store: &ResourceStore<R>,
    query: ListQuery,
    all: bool,
) -> Result<(), CliError> {
    let fetched = if all {
        store.fetch_all(query).await
    } else {
        store.fetch(query).await
    };
    let pagination = match fetched {
        Ok(pagination) => pagination,
        Err(ApiError::Http(e)) if store.is_cached() => {
            if store.is_empty().await {
                return Err(ApiError::Http(e).into());
            }
            tracing::warn!(error = %e, "Backend unreachable, showing the cached list");
            store.pagination().await
        }
        Err(e) => return Err(e.into()),
    };

    let items = store.items().await;
    for item in &items {
        let row = serde_json::to_string(item).unwrap_or_else(|_| format!("{item:?}"));
        tracing::info!(id = item.id().as_ref(), "{row}");
    }
    tracing::info!(
        page = pagination.page,
        pages = pagination.pages,
        total = pagination.total,
        "{} of {} {}",
        items.len(),
        pagination.total,
        R::COLLECTION
    );
    Ok(())
}

/// Delete one entity.
///
/// # Errors
///
/// Returns `CliError` if the request fails.
pub async fn delete(console: &Console, kind: ResourceKind, id: &str) -> Result<(), CliError> {
    with_store!(console, kind, |store| delete_in(store, id).await)
}

async fn delete_in<R: Resource>(store: &ResourceStore<R>, id: &str) -> Result<(), CliError> {
    store.delete(&R::Id::from(id.to_string())).await?;
    Ok(())
}

/// Change the status of one entity.
///
/// What `status` may be depends on the resource: `active`/`inactive` for
/// catalogue and marketing entities and delivery boys, `blocked`/`active`
/// for customers, `read` for notifications, and the resource's own status
/// names otherwise.
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` for a status the resource does not
/// have, or the request's error.
pub async fn set_status(
    console: &Console,
    kind: ResourceKind,
    id: &str,
    status: &str,
    note: Option<&str>,
) -> Result<(), CliError> {
    let id = id.to_string();
    match kind {
        ResourceKind::Categories => {
            let active = parse_status::<ActivityStatus>(status)? == ActivityStatus::Active;
            console.categories.set_active(&id.into(), active).await?;
        }
        ResourceKind::Brands => {
            let active = parse_status::<ActivityStatus>(status)? == ActivityStatus::Active;
            console.brands.set_active(&id.into(), active).await?;
        }
        ResourceKind::Banners => {
            let active = parse_status::<ActivityStatus>(status)? == ActivityStatus::Active;
            console.banners.set_active(&id.into(), active).await?;
        }
        ResourceKind::Coupons => {
            let active = parse_status::<ActivityStatus>(status)? == ActivityStatus::Active;
            console.coupons.set_active(&id.into(), active).await?;
        }
        ResourceKind::Campaigns => {
            let active = parse_status::<ActivityStatus>(status)? == ActivityStatus::Active;
            console.campaigns.set_active(&id.into(), active).await?;
        }
        ResourceKind::DeliveryBoys => match parse_status::<ActivityStatus>(status)? {
            ActivityStatus::Active => console.delivery_boys.activate(&id.into()).await.map(drop)?,
            ActivityStatus::Inactive => {
                console.delivery_boys.deactivate(&id.into()).await.map(drop)?;
            }
        },
        ResourceKind::Products => {
            let status: ProductStatus = parse_status(status)?;
            console.products.set_status(&id.into(), status).await?;
        }
        ResourceKind::Customers => match status.trim().to_ascii_lowercase().as_str() {
            "blocked" | "block" => console.customers.block(&id.into()).await.map(drop)?,
            "active" | "unblocked" | "unblock" => {
                console.customers.unblock(&id.into()).await.map(drop)?;
            }
            other => {
                return Err(CliError::InvalidArgument(format!(
                    "customers can be blocked or active, not {other}"
                )));
            }
        },
        ResourceKind::Reviews => match parse_status::<ReviewStatus>(status)? {
            ReviewStatus::Approved => console.reviews.approve(&id.into()).await.map(drop)?,
            ReviewStatus::Hidden => console.reviews.hide(&id.into()).await.map(drop)?,
            pending @ ReviewStatus::Pending => {
                console.reviews.set_status(&id.into(), pending).await?;
            }
        },
        ResourceKind::ReturnRequests => {
            let status: ReturnStatus = parse_status(status)?;
            console
                .return_requests
                .transition(&id.into(), status, note)
                .await?;
        }
        ResourceKind::Notifications => {
            if status.trim() != "read" {
                return Err(CliError::InvalidArgument(
                    "notifications can only be marked read".to_string(),
                ));
            }
            console.notifications.mark_read(&id.into()).await?;
        }
        ResourceKind::Vendors => match parse_status::<VendorStatus>(status)? {
            VendorStatus::Approved => console.vendors.approve(&id.into()).await.map(drop)?,
            VendorStatus::Rejected => console.vendors.reject(&id.into()).await.map(drop)?,
            VendorStatus::Suspended => console.vendors.suspend(&id.into()).await.map(drop)?,
            pending @ VendorStatus::Pending => {
                console.vendors.set_status(&id.into(), pending).await?;
            }
        },
        ResourceKind::Orders => {
            let status: OrderStatus = parse_status(status)?;
            let orders = &console.orders;
            match (console.role(), status) {
                (Role::Delivery, _) => orders
                    .update_delivery_status(&id.into(), status)
                    .await
                    .map(drop)?,
                (Role::Customer, OrderStatus::Cancelled) => {
                    orders.cancel(&id.into(), note).await.map(drop)?;
                }
                _ => orders.set_status(&id.into(), status).await.map(drop)?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bazaar_client::{ClientConfig, KeyValueStore, MemoryStorage, RecordingNotifier};
    use secrecy::SecretString;

    use super::*;

    /// A signed-in admin console whose backend is unreachable.
    async fn offline_console(storage: Arc<dyn KeyValueStore>) -> Console {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let console = Console::with_storage(
            &config,
            Role::Admin,
            storage,
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap();
        console
            .client()
            .tokens()
            .set(Role::Admin, &SecretString::from("admin-token".to_string()))
            .unwrap();
        console.hydrate().await.unwrap();
        console
    }

    // =========================================================================
    // Build query
    // =========================================================================

    #[test]
    fn test_build_query() {
        let query = build_query(
            2,
            20,
            Some("shoe".to_string()),
            &["status=active".to_string(), " brand = b1 ".to_string()],
        )
        .unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, Some(20));
        assert_eq!(query.search.as_deref(), Some("shoe"));
        assert_eq!(query.filters.get("status").map(String::as_str), Some("active"));
        assert_eq!(query.filters.get("brand").map(String::as_str), Some("b1"));
    }

    #[test]
    fn test_build_query_rejects_bad_input() {
        assert!(build_query(0, 10, None, &[]).is_err());
        assert!(matches!(
            build_query(1, 10, None, &["status".to_string()]),
            Err(CliError::InvalidArgument(_))
        ));
    }

    // =========================================================================
    // List
    // =========================================================================

    #[tokio::test]
    async fn test_list_falls_back_to_cached_list() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        storage
            .set(
                "admin:brands",
                r#"[{"id": "b1", "name": "Bata"}, {"id": "b2", "name": "Crocs"}]"#,
            )
            .unwrap();
        let console = offline_console(storage).await;

        list(&console, ResourceKind::Brands, ListQuery::new(), false)
            .await
            .unwrap();

        assert_eq!(console.brands.len().await, 2);
    }

    #[tokio::test]
    async fn test_list_without_cache_reports_unreachable_backend() {
        let console = offline_console(Arc::new(MemoryStorage::new())).await;

        let err = list(&console, ResourceKind::Brands, ListQuery::new(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Api(ApiError::Http(_))));

        let err = list(&console, ResourceKind::Products, ListQuery::new(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Api(ApiError::Http(_))));
    }
}

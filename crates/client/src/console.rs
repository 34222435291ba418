//! Everything one role needs, wired together.

use std::path::Path;
use std::sync::Arc;

use bazaar_core::{
    Banner, Brand, Campaign, Category, Coupon, Customer, DeliveryBoy, Notification, Order,
    Product, Resource, ReturnRequest, Review, Role, Vendor,
};

use crate::auth::AuthSession;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::notify::Notifier;
use crate::services::ResourceApi;
use crate::services::upload::{self, UploadedFile};
use crate::storage::{FileStorage, KeyValueStore};
use crate::store::{ListCache, ResourceStore};
use crate::tokens::TokenStore;

/// One store per resource plus the auth session, all acting as one role.
///
/// Customers, brands and categories mirror their lists into persisted
/// storage; the other stores live only as long as the console.
#[derive(Debug, Clone)]
pub struct Console {
    client: ApiClient,
    pub auth: AuthSession,
    pub categories: ResourceStore<Category>,
    pub brands: ResourceStore<Brand>,
    pub products: ResourceStore<Product>,
    pub customers: ResourceStore<Customer>,
    pub coupons: ResourceStore<Coupon>,
    pub reviews: ResourceStore<Review>,
    pub return_requests: ResourceStore<ReturnRequest>,
    pub delivery_boys: ResourceStore<DeliveryBoy>,
    pub banners: ResourceStore<Banner>,
    pub campaigns: ResourceStore<Campaign>,
    pub notifications: ResourceStore<Notification>,
    pub vendors: ResourceStore<Vendor>,
    pub orders: ResourceStore<Order>,
}

impl Console {
    /// Open a console backed by the storage file named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the storage file cannot be opened, or
    /// `ApiError::Http` if the HTTP client fails to build.
    pub fn open(
        config: &ClientConfig,
        role: Role,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let storage = FileStorage::open(&config.storage_path)?;
        Self::with_storage(config, role, Arc::new(storage), notifier)
    }

    /// Open a console on an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client fails to build.
    pub fn with_storage(
        config: &ClientConfig,
        role: Role,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let client = ApiClient::new(config, role, TokenStore::new(Arc::clone(&storage)), notifier)?;
        Ok(Self::from_client(client, &storage))
    }

    fn from_client(client: ApiClient, storage: &Arc<dyn KeyValueStore>) -> Self {
        let role = client.role();
        Self {
            auth: AuthSession::new(client.clone()),
            categories: cached(&client, storage, role),
            brands: cached(&client, storage, role),
            customers: cached(&client, storage, role),
            products: store(&client),
            coupons: store(&client),
            reviews: store(&client),
            return_requests: store(&client),
            delivery_boys: store(&client),
            banners: store(&client),
            campaigns: store(&client),
            notifications: store(&client),
            vendors: store(&client),
            orders: store(&client),
            client,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.client.role()
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Upload a local file and return its hosted URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Upload` if the file cannot be read, or the
    /// request's `ApiError`.
    pub async fn upload(&self, path: &Path) -> Result<UploadedFile, ApiError> {
        upload::upload(&self.client, path).await
    }

    /// Restore persisted lists into the stores that keep one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if storage cannot be read.
    pub async fn hydrate(&self) -> Result<usize, ApiError> {
        Ok(self.categories.hydrate().await?
            + self.brands.hydrate().await?
            + self.customers.hydrate().await?)
    }

    /// Empty every in-memory list.
    pub async fn clear(&self) {
        self.categories.clear().await;
        self.brands.clear().await;
        self.products.clear().await;
        self.customers.clear().await;
        self.coupons.clear().await;
        self.reviews.clear().await;
        self.return_requests.clear().await;
        self.delivery_boys.clear().await;
        self.banners.clear().await;
        self.campaigns.clear().await;
        self.notifications.clear().await;
        self.vendors.clear().await;
        self.orders.clear().await;
    }
}

fn store<R: Resource>(client: &ApiClient) -> ResourceStore<R> {
    ResourceStore::new(ResourceApi::new(client.clone()))
}

fn cached<R: Resource>(
    client: &ApiClient,
    storage: &Arc<dyn KeyValueStore>,
    role: Role,
) -> ResourceStore<R> {
    store(client).with_cache(ListCache::new(Arc::clone(storage), role))
}

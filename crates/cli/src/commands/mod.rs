//! Command implementations.

pub mod files;
pub mod notifications;
pub mod resources;
pub mod session;

use std::sync::Arc;

use bazaar_client::{ApiError, ClientConfig, ConfigError, Console, TracingNotifier};
use bazaar_core::Role;
use clap::ValueEnum;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend call failed. Already reported as a notice.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// A command-line argument does not make sense.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading from the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resources reachable from the `list`, `delete` and `status` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Categories,
    Brands,
    Products,
    Customers,
    Coupons,
    Reviews,
    ReturnRequests,
    DeliveryBoys,
    Banners,
    Campaigns,
    Notifications,
    Vendors,
    Orders,
}

/// Open the console for `role` from the environment.
///
/// # Errors
///
/// Returns `CliError::Config` if `BAZAAR_API_URL` is missing or invalid, or
/// `CliError::Api` if storage cannot be opened.
pub fn open_console(role: Role) -> Result<Console, CliError> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(api_url = %config.api_url, %role, "Opening console");
    Ok(Console::open(&config, role, Arc::new(TracingNotifier))?)
}

/// Run `$body` with `$store` bound to the console's store for `$kind`.
macro_rules! with_store {
    ($console:expr, $kind:expr, |$store:ident| $body:expr) => {{
        use $crate::commands::ResourceKind as K;
        let console = $console;
        match $kind {
            K::Categories => { let $store = &console.categories; $body }
            K::Brands => { let $store = &console.brands; $body }
            K::Products => { let $store = &console.products; $body }
            K::Customers => { let $store = &console.customers; $body }
            K::Coupons => { let $store = &console.coupons; $body }
            K::Reviews => { let $store = &console.reviews; $body }
            K::ReturnRequests => { let $store = &console.return_requests; $body }
            K::DeliveryBoys => { let $store = &console.delivery_boys; $body }
            K::Banners => { let $store = &console.banners; $body }
            K::Campaigns => { let $store = &console.campaigns; $body }
            K::Notifications => { let $store = &console.notifications; $body }
            K::Vendors => { let $store = &console.vendors; $body }
            K::Orders => { let $store = &console.orders; $body }
        }
    }};
}

pub(crate) use with_store;

/// Parse a status argument into the resource's status type.
fn parse_status<S>(raw: &str) -> Result<S, CliError>
where
    S: std::str::FromStr<Err = String>,
{
    raw.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(CliError::InvalidArgument)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::VendorStatus;

    use super::*;

    #[test]
    fn test_resource_kind_names_match_collections() {
        let kind = ResourceKind::from_str("delivery-boys", false).unwrap();
        assert_eq!(kind, ResourceKind::DeliveryBoys);
        let kind = ResourceKind::from_str("return-requests", false).unwrap();
        assert_eq!(kind, ResourceKind::ReturnRequests);
    }

    #[test]
    fn test_parse_status() {
        let status: VendorStatus = parse_status(" Approved ").unwrap();
        assert_eq!(status, VendorStatus::Approved);
        assert!(matches!(
            parse_status::<VendorStatus>("archived"),
            Err(CliError::InvalidArgument(_))
        ));
    }
}

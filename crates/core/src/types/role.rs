//! Console roles.
//!
//! Every role has its own API prefix, its own persisted bearer token and its
//! own login route. A token issued for one role is never sent on behalf of
//! another.

use serde::{Deserialize, Serialize};

/// The four consoles the client can act as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Storefront shopper.
    Customer,
    /// Marketplace operator with full access.
    Admin,
    /// Seller managing their own catalogue and orders.
    Vendor,
    /// Rider handling assigned deliveries.
    Delivery,
}

impl Role {
    /// All roles, in a stable order.
    pub const ALL: [Self; 4] = [Self::Customer, Self::Admin, Self::Vendor, Self::Delivery];

    /// Path segment prefixed to every API call made as this role.
    #[must_use]
    pub const fn api_prefix(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::Vendor => "vendor",
            Self::Delivery => "delivery",
        }
    }

    /// Key under which this role's bearer token is persisted.
    #[must_use]
    pub const fn token_key(self) -> &'static str {
        match self {
            Self::Customer => "customerToken",
            Self::Admin => "adminToken",
            Self::Vendor => "vendorToken",
            Self::Delivery => "deliveryToken",
        }
    }

    /// Route the user is sent to when their session is rejected.
    #[must_use]
    pub const fn login_route(self) -> &'static str {
        match self {
            Self::Customer => "/login",
            Self::Admin => "/admin/login",
            Self::Vendor => "/vendor/login",
            Self::Delivery => "/delivery/login",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_prefix())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "vendor" => Ok(Self::Vendor),
            "delivery" => Ok(Self::Delivery),
            _ => Err(format!(
                "invalid role: {s} (expected customer, admin, vendor or delivery)"
            )),
        }
    }
}

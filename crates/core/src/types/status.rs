//! Status enums for the various entities.
//!
//! All statuses travel as `snake_case` strings. They are what the partial
//! status-patch endpoints (`PATCH /{id}/status`) accept.

use serde::{Deserialize, Serialize};

/// Declares a status enum with `as_str`, `Display` and `FromStr`, keeping the
/// wire string and the parser in one place.
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The string sent to and received from the backend.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(format!(
                        "invalid {}: {s} (expected one of: {})",
                        stringify!($name),
                        [$($wire),+].join(", ")
                    )),
                }
            }
        }
    };
}

status_enum! {
    /// Listing state of a product in the catalogue.
    ProductStatus {
        /// Saved by the vendor, not submitted.
        Draft => "draft",
        /// Awaiting admin review.
        Pending => "pending",
        Active => "active",
        Rejected => "rejected",
        Archived => "archived",
    }
}

status_enum! {
    /// Order lifecycle, from checkout to delivery or cancellation.
    OrderStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Processing => "processing",
        Shipped => "shipped",
        OutForDelivery => "out_for_delivery",
        Delivered => "delivered",
        Cancelled => "cancelled",
        Returned => "returned",
    }
}

impl OrderStatus {
    /// Whether a customer may still cancel the order.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Processing)
    }

    /// Statuses a delivery rider is allowed to set.
    #[must_use]
    pub const fn is_delivery_update(self) -> bool {
        matches!(self, Self::OutForDelivery | Self::Delivered)
    }
}

status_enum! {
    /// Moderation state of a product review.
    ReviewStatus {
        Pending => "pending",
        Approved => "approved",
        Hidden => "hidden",
    }
}

status_enum! {
    /// Return request workflow.
    ReturnStatus {
        Requested => "requested",
        Approved => "approved",
        Rejected => "rejected",
        PickedUp => "picked_up",
        Refunded => "refunded",
    }
}

status_enum! {
    /// Vendor onboarding state.
    VendorStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Suspended => "suspended",
    }
}

status_enum! {
    /// On/off switch shared by delivery boys, banners, brands and the like.
    ActivityStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

status_enum! {
    /// How a coupon discount is applied.
    DiscountType {
        /// `discount_value` is a percentage of the cart total.
        Percentage => "percentage",
        /// `discount_value` is a flat amount.
        Fixed => "fixed",
    }
}

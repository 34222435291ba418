//! Actions specific to one kind of resource.
//!
//! Each action follows the same confirm-then-apply rule as the generic
//! mutations: the server's copy replaces the listed entity only after the
//! request succeeded.

use bazaar_core::{
    ActivityStatus, Coupon, CouponQuote, Customer, DeliveryBoy, DeliveryBoyId, Notification, Order,
    OrderStatus, Product, Resource, ReturnRequest, ReturnStatus, Review, ReviewStatus,
    ValidationError, Vendor, VendorStatus,
};
use rust_decimal::Decimal;

use super::ResourceStore;
use crate::error::ApiError;
use crate::services::catalog::Switchable;

// =============================================================================
// Moderation
// =============================================================================

impl ResourceStore<Vendor> {
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn approve(&self, id: &<Vendor as Resource>::Id) -> Result<Vendor, ApiError> {
        self.set_status(id, VendorStatus::Approved).await
    }

    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn reject(&self, id: &<Vendor as Resource>::Id) -> Result<Vendor, ApiError> {
        self.set_status(id, VendorStatus::Rejected).await
    }

    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn suspend(&self, id: &<Vendor as Resource>::Id) -> Result<Vendor, ApiError> {
        self.set_status(id, VendorStatus::Suspended).await
    }
}

impl ResourceStore<Review> {
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn approve(&self, id: &<Review as Resource>::Id) -> Result<Review, ApiError> {
        self.set_status(id, ReviewStatus::Approved).await
    }

    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn hide(&self, id: &<Review as Resource>::Id) -> Result<Review, ApiError> {
        self.set_status(id, ReviewStatus::Hidden).await
    }
}

impl ResourceStore<ReturnRequest> {
    /// Move a return request to `status`, optionally leaving a note for the
    /// customer.
    ///
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn transition(
        &self,
        id: &<ReturnRequest as Resource>::Id,
        status: ReturnStatus,
        note: Option<&str>,
    ) -> Result<ReturnRequest, ApiError> {
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        let message = format!("Return request marked {status}");
        self.confirm(&message, self.api.transition(id, status, note))
            .await
    }
}

impl ResourceStore<Customer> {
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn block(&self, id: &<Customer as Resource>::Id) -> Result<Customer, ApiError> {
        self.confirm("Customer blocked", self.api.set_blocked(id, true))
            .await
    }

    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn unblock(&self, id: &<Customer as Resource>::Id) -> Result<Customer, ApiError> {
        self.confirm("Customer unblocked", self.api.set_blocked(id, false))
            .await
    }
}

// =============================================================================
// Activation
// =============================================================================

impl ResourceStore<DeliveryBoy> {
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn activate(&self, id: &DeliveryBoyId) -> Result<DeliveryBoy, ApiError> {
        self.set_status(id, ActivityStatus::Active).await
    }

    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn deactivate(&self, id: &DeliveryBoyId) -> Result<DeliveryBoy, ApiError> {
        self.set_status(id, ActivityStatus::Inactive).await
    }
}

impl<R: Switchable> ResourceStore<R> {
    /// Switch a category, brand, banner, coupon or campaign on or off.
    ///
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn set_active(&self, id: &R::Id, is_active: bool) -> Result<R, ApiError> {
        let message = format!(
            "{} {}",
            R::LABEL,
            if is_active { "activated" } else { "deactivated" }
        );
        self.confirm(&message, self.api.set_active(id, is_active))
            .await
    }
}

// =============================================================================
// Orders
// =============================================================================

impl ResourceStore<Order> {
    /// Hand an order to a delivery boy (admin).
    ///
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn assign_delivery(
        &self,
        id: &<Order as Resource>::Id,
        delivery_boy: &DeliveryBoyId,
    ) -> Result<Order, ApiError> {
        self.confirm(
            "Delivery boy assigned",
            self.api.assign_delivery(id, delivery_boy),
        )
        .await
    }

    /// Cancel an order (customer).
    ///
    /// If the order is listed and already past the point of cancellation,
    /// nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an order that can no longer be
    /// cancelled, or the request's `ApiError`.
    pub async fn cancel(
        &self,
        id: &<Order as Resource>::Id,
        reason: Option<&str>,
    ) -> Result<Order, ApiError> {
        if let Some(order) = self.find(id).await
            && !order.status.is_cancellable()
        {
            return Err(self.refuse(ValidationError::Invalid {
                field: "order",
                reason: format!("cannot be cancelled once {}", order.status),
            }));
        }
        self.confirm("Order cancelled", self.api.cancel(id, reason))
            .await
    }

    /// Report delivery progress (delivery role).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a status a delivery boy may not
    /// set, or the request's `ApiError`.
    pub async fn update_delivery_status(
        &self,
        id: &<Order as Resource>::Id,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        if !status.is_delivery_update() {
            return Err(self.refuse(ValidationError::Invalid {
                field: "status",
                reason: format!("{status} cannot be set from the delivery console"),
            }));
        }
        let message = format!("Order marked {status}");
        self.confirm(&message, self.api.set_status(id, status))
            .await
    }
}

// =============================================================================
// Catalogue
// =============================================================================

impl ResourceStore<Product> {
    /// Set the stock level of a product (vendor).
    ///
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn set_stock(
        &self,
        id: &<Product as Resource>::Id,
        stock: u32,
    ) -> Result<Product, ApiError> {
        self.confirm("Stock updated", self.api.set_stock(id, stock))
            .await
    }
}

impl ResourceStore<Coupon> {
    /// Ask what a coupon code is worth on a cart (customer). The list is not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a blank code, or the request's
    /// `ApiError` when the backend rejects the code.
    pub async fn validate_code(
        &self,
        code: &str,
        cart_total: Decimal,
    ) -> Result<CouponQuote, ApiError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(self.refuse(ValidationError::Required {
                field: "coupon code",
            }));
        }
        let quote = self.api.validate_code(code, cart_total).await?;
        self.notify_success(format!("Coupon {} applied", quote.code));
        Ok(quote)
    }
}

// =============================================================================
// Notifications
// =============================================================================

impl ResourceStore<Notification> {
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn mark_read(
        &self,
        id: &<Notification as Resource>::Id,
    ) -> Result<Notification, ApiError> {
        let _loading = super::Loading::start(&self.in_flight);
        let updated = self.api.mark_read(id).await?;
        self.state.write().await.apply_updated(updated.clone());
        Ok(updated)
    }

    /// Mark every notification read, then flag the listed ones as read.
    /// Returns how many the server changed.
    ///
    /// # Errors
    ///
    /// Returns the request's `ApiError`; the list is unchanged.
    pub async fn mark_all_read(&self) -> Result<u64, ApiError> {
        let _loading = super::Loading::start(&self.in_flight);
        let modified = self.api.mark_all_read().await?;
        for notification in &mut self.state.write().await.items {
            notification.is_read = true;
        }
        self.notify_success("All notifications marked as read");
        Ok(modified)
    }

    /// # Errors
    ///
    /// Returns the request's `ApiError`.
    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        self.api.unread_count().await
    }

    /// Unread notifications among those listed.
    pub async fn unread(&self) -> Vec<Notification> {
        self.state
            .read()
            .await
            .items
            .iter()
            .filter(|n| !n.is_read)
            .cloned()
            .collect()
    }
}

//! Order and return-request endpoints.

use bazaar_core::{
    DeliveryBoyId, Order, OrderStatus, Resource, ReturnRequest, ReturnStatus,
};
use serde::Serialize;

use super::ResourceApi;
use crate::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignBody<'a> {
    delivery_boy: &'a DeliveryBoyId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReturnStatusBody<'a> {
    status: ReturnStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_note: Option<&'a str>,
}

type OrderKey = <Order as Resource>::Id;

impl ResourceApi<Order> {
    /// `PATCH /admin/orders/{id}/assign`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    pub async fn assign_delivery(
        &self,
        id: &OrderKey,
        delivery_boy: &DeliveryBoyId,
    ) -> Result<Order, ApiError> {
        self.patch(id, "assign", &AssignBody { delivery_boy }).await
    }

    /// `PATCH /customer/orders/{id}/cancel`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    pub async fn cancel(&self, id: &OrderKey, reason: Option<&str>) -> Result<Order, ApiError> {
        self.patch(id, "cancel", &CancelBody { reason }).await
    }

    /// `PATCH /{role}/orders/{id}/status`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    pub async fn set_status(&self, id: &OrderKey, status: OrderStatus) -> Result<Order, ApiError> {
        self.update_status(id, status).await
    }
}

impl ResourceApi<ReturnRequest> {
    /// `PATCH /admin/return-requests/{id}/status` with an optional note.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    pub async fn transition(
        &self,
        id: &<ReturnRequest as Resource>::Id,
        status: ReturnStatus,
        admin_note: Option<&str>,
    ) -> Result<ReturnRequest, ApiError> {
        self.patch(id, "status", &ReturnStatusBody { status, admin_note })
            .await
    }
}

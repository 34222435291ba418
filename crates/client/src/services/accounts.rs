//! Account moderation endpoints.

use bazaar_core::{Customer, Resource};
use serde::Serialize;

use super::ResourceApi;
use crate::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockBody {
    is_blocked: bool,
}

impl ResourceApi<Customer> {
    /// `PATCH /admin/customers/{id}/status` with `{"isBlocked": ...}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    pub async fn set_blocked(
        &self,
        id: &<Customer as Resource>::Id,
        is_blocked: bool,
    ) -> Result<Customer, ApiError> {
        self.patch(id, "status", &BlockBody { is_blocked }).await
    }
}

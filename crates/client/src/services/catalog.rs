//! Catalogue and promotion endpoints beyond plain CRUD.

use bazaar_core::{Banner, Brand, Campaign, Category, Coupon, CouponQuote, Product, Resource, Role};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use super::ResourceApi;
use crate::error::ApiError;
use crate::http::Auth;

/// Resources switched on and off through `PATCH /{id}/status` with
/// `{"isActive": bool}`.
pub trait Switchable: Resource {}

impl Switchable for Category {}
impl Switchable for Brand {}
impl Switchable for Banner {}
impl Switchable for Coupon {}
impl Switchable for Campaign {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveBody {
    is_active: bool,
}

impl<R: Switchable> ResourceApi<R> {
    /// `PATCH /{role}/{collection}/{id}/status` with `{"isActive": ...}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    pub async fn set_active(&self, id: &R::Id, is_active: bool) -> Result<R, ApiError> {
        self.patch(id, "status", &ActiveBody { is_active }).await
    }
}

#[derive(Serialize)]
struct StockBody {
    stock: u32,
}

impl ResourceApi<Product> {
    /// `PATCH /{role}/products/{id}/stock`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    pub async fn set_stock(
        &self,
        id: &<Product as Resource>::Id,
        stock: u32,
    ) -> Result<Product, ApiError> {
        self.patch(id, "stock", &StockBody { stock }).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CouponCheck<'a> {
    code: &'a str,
    cart_total: Decimal,
}

impl ResourceApi<Coupon> {
    /// `POST /customer/coupons/validate`
    ///
    /// Asks the backend what `code` is worth on a cart of `cart_total`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the code is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn validate_code(
        &self,
        code: &str,
        cart_total: Decimal,
    ) -> Result<CouponQuote, ApiError> {
        self.client()
            .post::<CouponQuote, _>(
                &[Role::Customer.api_prefix(), Coupon::COLLECTION, "validate"],
                &CouponCheck { code, cart_total },
                Auth::Bearer,
            )
            .await?
            .into_data()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bodies() {
        assert_eq!(
            serde_json::to_value(ActiveBody { is_active: false }).unwrap(),
            json!({"isActive": false})
        );
        assert_eq!(
            serde_json::to_value(CouponCheck {
                code: "SAVE10",
                cart_total: Decimal::new(4250, 2),
            })
            .unwrap(),
            json!({"code": "SAVE10", "cartTotal": "42.50"})
        );
    }
}

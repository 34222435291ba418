//! Orders and return requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::resource::impl_resource;
use crate::types::{
    CustomerId, DeliveryBoyId, OrderId, OrderStatus, ProductId, ReturnRequestId, ReturnStatus,
    VendorId,
};
use crate::validation::{Validate, ValidationError, require};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ProductId,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub vendor: Option<VendorId>,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub delivery_boy: Option<DeliveryBoyId>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of line totals, for comparing against the server's `total`.
    #[must_use]
    pub fn items_subtotal(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// Checkout payload. Orders are created by customers only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub items: Vec<OrderLineDraft>,
    pub shipping_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDraft {
    pub product: ProductId,
    pub quantity: u32,
}

impl Validate for OrderDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::invalid("items", "cannot be empty"));
        }
        if self.items.iter().any(|line| line.quantity == 0) {
            return Err(ValidationError::invalid("quantity", "must be at least 1"));
        }
        require("shipping address", &self.shipping_address)
    }
}

impl_resource!(Order, OrderId, OrderDraft, "orders", "Order");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    #[serde(alias = "_id")]
    pub id: ReturnRequestId,
    pub order: OrderId,
    #[serde(default)]
    pub customer: Option<CustomerId>,
    pub reason: String,
    pub status: ReturnStatus,
    #[serde(default)]
    pub refund_amount: Option<Decimal>,
    /// Note left by the admin when moving the request along.
    #[serde(default)]
    pub admin_note: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequestDraft {
    pub order: OrderId,
    pub reason: String,
}

impl Validate for ReturnRequestDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("order", self.order.as_str())?;
        require("reason", &self.reason)
    }
}

impl_resource!(
    ReturnRequest,
    ReturnRequestId,
    ReturnRequestDraft,
    "return-requests",
    "Return request"
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_from_backend() {
        let order: Order = serde_json::from_value(json!({
            "_id": "o1",
            "orderNumber": "BZ-1001",
            "items": [
                {"product": "p1", "name": "Mug", "quantity": 2, "price": "7.50"},
                {"product": "p2", "name": "Tea", "quantity": 1, "price": 4}
            ],
            "total": "19.00",
            "status": "out_for_delivery"
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.items_subtotal(), Decimal::new(19, 0));
        assert!(order.delivery_boy.is_none());
    }

    #[test]
    fn test_order_draft_validation() {
        let mut draft = OrderDraft {
            items: vec![OrderLineDraft {
                product: ProductId::new("p1"),
                quantity: 1,
            }],
            shipping_address: "12 Market Road".to_string(),
            coupon_code: None,
        };
        assert!(draft.validate().is_ok());

        draft.items[0].quantity = 0;
        assert!(draft.validate().is_err());

        draft.items.clear();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_return_request_requires_reason() {
        let draft = ReturnRequestDraft {
            order: OrderId::new("o1"),
            reason: " ".to_string(),
        };
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Required { field: "reason" })
        );
    }
}

//! Catalogue entities: categories, brands and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::resource::impl_resource;
use crate::types::{BrandId, CategoryId, ProductId, ProductStatus, VendorId};
use crate::validation::{Validate, ValidationError, non_negative, require};

/// A product category. Categories may nest one level via `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub parent: Option<CategoryId>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_active: bool,
}

impl Validate for CategoryDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

impl_resource!(Category, CategoryId, CategoryDraft, "categories", "Category");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(alias = "_id")]
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub is_active: bool,
}

impl Validate for BrandDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

impl_resource!(Brand, BrandId, BrandDraft, "brands", "Brand");

/// A sellable product owned by a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Discounted price, if the product is on sale.
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub brand: Option<BrandId>,
    #[serde(default)]
    pub vendor: Option<VendorId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_product_status")]
    pub status: ProductStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Price the customer pays right now.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price
            .filter(|sale| *sale < self.price)
            .unwrap_or(self.price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Decimal>,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<BrandId>,
    pub images: Vec<String>,
}

impl Validate for ProductDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        non_negative("price", self.price)?;
        if let Some(sale) = self.sale_price {
            non_negative("sale price", sale)?;
            if sale > self.price {
                return Err(ValidationError::invalid(
                    "sale price",
                    "cannot exceed the regular price",
                ));
            }
        }
        Ok(())
    }
}

impl_resource!(Product, ProductId, ProductDraft, "products", "Product");

const fn default_true() -> bool {
    true
}

const fn default_product_status() -> ProductStatus {
    ProductStatus::Pending
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_category_aliases_server_id() {
        let category: Category = serde_json::from_value(json!({
            "_id": "64b7f0c2",
            "name": "Shoes",
            "isActive": false
        }))
        .unwrap();
        assert_eq!(category.id.as_str(), "64b7f0c2");
        assert!(!category.is_active);

        // Re-serialised with the client-side field name.
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["id"], "64b7f0c2");
    }

    #[test]
    fn test_product_accepts_numeric_and_string_prices() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Sneaker",
            "price": 59.5,
            "salePrice": "49.99",
        }))
        .unwrap();
        assert_eq!(product.price, Decimal::new(595, 1));
        assert_eq!(product.effective_price(), Decimal::new(4999, 2));
        assert_eq!(product.status, ProductStatus::Pending);
        assert!(!product.in_stock());
    }

    #[test]
    fn test_product_draft_validation() {
        let mut draft = ProductDraft {
            name: "Sneaker".to_string(),
            price: Decimal::new(5000, 2),
            ..ProductDraft::default()
        };
        assert!(draft.validate().is_ok());

        draft.sale_price = Some(Decimal::new(6000, 2));
        assert!(draft.validate().is_err());

        draft.sale_price = None;
        draft.price = Decimal::new(-1, 0);
        assert!(draft.validate().is_err());

        draft.name = String::new();
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Required { field: "name" })
        );
    }

    #[test]
    fn test_category_draft_omits_empty_optionals() {
        let draft = CategoryDraft {
            name: "Bags".to_string(),
            is_active: true,
            ..CategoryDraft::default()
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value, json!({"name": "Bags", "isActive": true}));
    }
}

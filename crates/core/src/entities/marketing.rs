//! Promotional entities: coupons, banners and campaigns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::resource::impl_resource;
use crate::types::{BannerId, CampaignId, CouponId, DiscountType, ProductId};
use crate::validation::{Validate, ValidationError, non_negative, require};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(alias = "_id")]
    pub id: CouponId,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    /// Cart total below which the coupon does not apply.
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    /// Upper bound on the discount of a percentage coupon.
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Coupon {
    /// Whether the coupon can still be redeemed at `now`.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.expires_at.is_none_or(|expires| now < expires)
            && self.usage_limit.is_none_or(|limit| self.used_count < limit)
    }

    /// Discount this coupon gives on `cart_total`, as previewed client-side.
    ///
    /// The backend's answer from coupon validation remains authoritative.
    #[must_use]
    pub fn discount_for(&self, cart_total: Decimal) -> Decimal {
        if self.min_order_amount.is_some_and(|min| cart_total < min) {
            return Decimal::ZERO;
        }
        let raw = match self.discount_type {
            DiscountType::Percentage => cart_total * self.discount_value / Decimal::ONE_HUNDRED,
            DiscountType::Fixed => self.discount_value,
        };
        let capped = self.max_discount.map_or(raw, |cap| raw.min(cap));
        capped.min(cart_total).max(Decimal::ZERO).round_dp(2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDraft {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    pub is_active: bool,
}

impl Validate for CouponDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("code", &self.code)?;
        if !self
            .code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::invalid(
                "code",
                "may only contain letters, digits, '-' and '_'",
            ));
        }
        non_negative("discount value", self.discount_value)?;
        if self.discount_type == DiscountType::Percentage
            && self.discount_value > Decimal::ONE_HUNDRED
        {
            return Err(ValidationError::invalid(
                "discount value",
                "cannot exceed 100 percent",
            ));
        }
        if let Some(min) = self.min_order_amount {
            non_negative("minimum order amount", min)?;
        }
        Ok(())
    }
}

impl_resource!(Coupon, CouponId, CouponDraft, "coupons", "Coupon");

/// Result of validating a coupon code against a cart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponQuote {
    pub code: String,
    pub discount: Decimal,
    #[serde(default)]
    pub final_total: Option<Decimal>,
}

/// A homepage banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(alias = "_id")]
    pub id: BannerId,
    pub title: String,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub position: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerDraft {
    pub title: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub position: u32,
    pub is_active: bool,
}

impl Validate for BannerDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("image", &self.image)
    }
}

impl_resource!(Banner, BannerId, BannerDraft, "banners", "Banner");

/// A time-boxed sale covering a set of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(alias = "_id")]
    pub id: CampaignId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub products: Vec<ProductId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Campaign {
    /// Whether the campaign is switched on and `now` falls inside its window.
    #[must_use]
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.starts_at <= now && now < self.ends_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
    pub name: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub discount_percent: Decimal,
    pub products: Vec<ProductId>,
    pub is_active: bool,
}

impl Validate for CampaignDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        if self.ends_at <= self.starts_at {
            return Err(ValidationError::invalid(
                "end date",
                "must be after the start date",
            ));
        }
        non_negative("discount percent", self.discount_percent)?;
        if self.discount_percent > Decimal::ONE_HUNDRED {
            return Err(ValidationError::invalid(
                "discount percent",
                "cannot exceed 100",
            ));
        }
        Ok(())
    }
}

impl_resource!(Campaign, CampaignId, CampaignDraft, "campaigns", "Campaign");

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn coupon(discount_type: DiscountType, value: i64) -> Coupon {
        Coupon {
            id: CouponId::new("c1"),
            code: "SAVE".to_string(),
            discount_type,
            discount_value: Decimal::new(value, 0),
            min_order_amount: None,
            max_discount: None,
            expires_at: None,
            usage_limit: None,
            used_count: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_percentage_discount_with_cap() {
        let mut c = coupon(DiscountType::Percentage, 20);
        assert_eq!(c.discount_for(Decimal::new(150, 0)), Decimal::new(30, 0));

        c.max_discount = Some(Decimal::new(25, 0));
        assert_eq!(c.discount_for(Decimal::new(150, 0)), Decimal::new(25, 0));
    }

    #[test]
    fn test_fixed_discount_never_exceeds_total() {
        let c = coupon(DiscountType::Fixed, 50);
        assert_eq!(c.discount_for(Decimal::new(30, 0)), Decimal::new(30, 0));
    }

    #[test]
    fn test_minimum_order_amount() {
        let mut c = coupon(DiscountType::Fixed, 10);
        c.min_order_amount = Some(Decimal::new(100, 0));
        assert_eq!(c.discount_for(Decimal::new(99, 0)), Decimal::ZERO);
        assert_eq!(c.discount_for(Decimal::new(100, 0)), Decimal::new(10, 0));
    }

    #[test]
    fn test_redeemable() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut c = coupon(DiscountType::Fixed, 5);
        assert!(c.is_redeemable(now));

        c.expires_at = Some(now - Duration::hours(1));
        assert!(!c.is_redeemable(now));

        c.expires_at = None;
        c.usage_limit = Some(3);
        c.used_count = 3;
        assert!(!c.is_redeemable(now));
    }

    #[test]
    fn test_coupon_draft_rejects_large_percentage() {
        let draft = CouponDraft {
            code: "HALF-OFF".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::new(150, 0),
            min_order_amount: None,
            max_discount: None,
            expires_at: None,
            usage_limit: None,
            is_active: true,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_campaign_window() {
        let start = Utc.with_ymd_and_hms(2026, 11, 27, 0, 0, 0).unwrap();
        let draft = CampaignDraft {
            name: "Black Friday".to_string(),
            description: String::new(),
            starts_at: start,
            ends_at: start,
            discount_percent: Decimal::new(30, 0),
            products: vec![],
            is_active: true,
        };
        assert!(draft.validate().is_err());

        let campaign = Campaign {
            id: CampaignId::new("bf"),
            name: draft.name.clone(),
            description: String::new(),
            starts_at: start,
            ends_at: start + Duration::days(4),
            discount_percent: draft.discount_percent,
            products: vec![],
            is_active: true,
        };
        assert!(campaign.is_running(start + Duration::hours(1)));
        assert!(!campaign.is_running(start + Duration::days(4)));
    }
}

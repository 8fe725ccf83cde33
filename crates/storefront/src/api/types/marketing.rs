//! Coupons and promotions.

use chrono::{DateTime, Utc};
use papergift_core::{CouponId, DiscountType, PromotionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::default_true;

/// A coupon code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    #[serde(default)]
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Body of `POST /coupons/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    pub code: String,
    pub subtotal: Decimal,
}

/// Response of `POST /coupons/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub valid: bool,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /admin/coupons`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// An automatic promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: PromotionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Body of `POST /admin/promotions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPromotion {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
}

/// Body of `PATCH /admin/promotions/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionUpdate {
    pub is_active: bool,
}

/// Server-computed discount estimate for the current cart, display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromotionPreview {
    pub promotions: Vec<AppliedPromotion>,
    pub total_discount: Decimal,
    pub subtotal: Decimal,
    pub total: Decimal,
}

/// One promotion applied in a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromotion {
    pub promotion_id: PromotionId,
    pub name: String,
    pub discount: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_preview_deserialize() {
        let preview: PromotionPreview = serde_json::from_str(
            r#"{"promotions":[{"promotionId":2,"name":"Spring sale","discount":"1.50"}],
                "totalDiscount":1.5,"subtotal":15,"total":13.5}"#,
        )
        .unwrap();
        assert_eq!(preview.promotions.len(), 1);
        assert_eq!(preview.total_discount, Decimal::new(15, 1));
    }

    #[test]
    fn test_coupon_validation_invalid() {
        let validation: CouponValidation =
            serde_json::from_str(r#"{"valid":false,"message":"Coupon has expired"}"#).unwrap();
        assert!(!validation.valid);
        assert_eq!(validation.discount, Decimal::ZERO);
    }
}

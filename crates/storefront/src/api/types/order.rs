//! Order and payment types.

use chrono::{DateTime, Utc};
use papergift_core::{
    AddressId, OrderId, OrderItemId, OrderStatus, PaymentMethodId, PaymentStatus, ProductId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{UserAddress, default_true};

/// Payment method code for pay-on-delivery.
pub const CASH_ON_DELIVERY: &str = "COD";

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub shipping_fee: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub address: Option<UserAddress>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Display reference: the order number, or `#id` when absent.
    #[must_use]
    pub fn reference(&self) -> String {
        if self.order_number.is_empty() {
            format!("#{}", self.id)
        } else {
            self.order_number.clone()
        }
    }

    /// Whether the order is paid on delivery.
    #[must_use]
    pub fn is_cash_on_delivery(&self) -> bool {
        self.payment_method
            .as_ref()
            .is_some_and(|method| method.code.eq_ignore_ascii_case(CASH_ON_DELIVERY))
    }

    /// Sum of item quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().fold(0u32, |total, item| total.saturating_add(item.quantity))
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub line_total: Decimal,
}

/// A payment method offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    /// Stable code, e.g. `COD`, `CARD`, `BANK_TRANSFER`.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub address_id: AddressId,
    pub payment_method_id: PaymentMethodId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Response of `POST /payments/{orderId}/process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl PaymentResult {
    /// Whether the status field reports a completed payment.
    #[must_use]
    pub fn is_success(&self) -> bool {
        ["SUCCESS", "PAID", "COMPLETED"]
            .iter()
            .any(|ok| self.status.eq_ignore_ascii_case(ok))
    }
}

/// Body of `PATCH /admin/orders/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_cod_detection() {
        let order: Order = serde_json::from_str(
            r#"{"id":42,"paymentMethod":{"id":1,"code":"cod","name":"Pay on delivery"}}"#,
        )
        .unwrap();
        assert!(order.is_cash_on_delivery());
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.reference(), "#42");
    }

    #[test]
    fn test_item_count_saturates() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 8,
            "items": [
                {"id": 1, "productId": 1, "quantity": u32::MAX},
                {"id": 2, "productId": 2, "quantity": 3}
            ]
        }))
        .unwrap();
        assert_eq!(order.item_count(), u32::MAX);
    }

    #[test]
    fn test_payment_result_status() {
        let ok: PaymentResult = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(ok.is_success());
        let declined: PaymentResult =
            serde_json::from_str(r#"{"status":"DECLINED","message":"Card declined"}"#).unwrap();
        assert!(!declined.is_success());
    }

    #[test]
    fn test_place_order_request_omits_empty_fields() {
        let body = PlaceOrderRequest {
            address_id: AddressId::new(3),
            payment_method_id: PaymentMethodId::new(1),
            coupon_code: None,
            note: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"addressId":3,"paymentMethodId":1}"#
        );
    }
}

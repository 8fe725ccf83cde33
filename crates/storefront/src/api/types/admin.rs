//! Back-office types: dashboard aggregates, carts, product drafts.

use chrono::{DateTime, Utc};
use papergift_core::{CartId, CategoryId, OrderStatus, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CartItem, User};

/// Aggregates for the admin dashboard (`GET /admin/dashboard`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub total_customers: u64,
    pub total_products: u64,
    pub pending_orders: u64,
    /// Revenue over time, oldest first.
    pub revenue_series: Vec<SeriesPoint>,
    pub orders_by_status: Vec<StatusCount>,
    pub top_products: Vec<TopProduct>,
}

/// One point of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Order count for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

/// Best-selling product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: ProductId,
    pub name: String,
    pub quantity_sold: u64,
    pub revenue: Decimal,
}

/// A customer cart as seen by admins (`GET /admin/carts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCart {
    pub id: CartId,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /admin/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Decimal>,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body of `PATCH /admin/payment-methods/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodUpdate {
    pub is_active: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_partial_payload() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"totalRevenue":"1250.40","totalOrders":31,
                "ordersByStatus":[{"status":"SHIPPED","count":4}]}"#,
        )
        .unwrap();
        assert_eq!(stats.total_orders, 31);
        assert_eq!(stats.orders_by_status[0].status, OrderStatus::Shipped);
        assert!(stats.revenue_series.is_empty());
    }
}

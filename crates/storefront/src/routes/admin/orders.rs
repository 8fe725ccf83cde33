//! Admin order management.
//!
//! `/admin/orders?orderId=7` highlights one order; admin order notifications
//! link here.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Redirect,
};
use papergift_core::{OrderId, OrderStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::Order;
use crate::components::data_table::orders_table_config;
use crate::components::list_query::empty_string_as_none;
use crate::components::{AdminRow, AdminTable, ListQuery, RowAction};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::{Loader, PageContext, flash_outcome, money, redirect_back, short_date};
use crate::routes::orders::OrderView;
use crate::state::AppState;

/// Statuses an admin can move an order to from `status`.
#[must_use]
pub const fn next_statuses(status: OrderStatus) -> &'static [OrderStatus] {
    match status {
        OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
        OrderStatus::Confirmed => &[OrderStatus::Processing, OrderStatus::Cancelled],
        OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
        OrderStatus::Shipped => &[OrderStatus::Delivered],
        OrderStatus::Delivered | OrderStatus::Cancelled => &[],
    }
}

fn order_row(order: &Order, highlight: Option<OrderId>) -> AdminRow {
    let view = OrderView::from(order);
    let mut row = AdminRow::new(
        order.id,
        vec![
            view.reference.clone(),
            view.customer.clone().unwrap_or_default(),
            view.status_label.to_string(),
            format!("{} · {}", view.payment_method, view.payment_label),
            money(order.total),
            short_date(order.created_at),
        ],
    )
    .highlighted(highlight == Some(order.id));

    for next in next_statuses(order.status) {
        let action = RowAction::new(
            &format!("Mark {}", next.label().to_lowercase()),
            format!("/admin/orders/{}/status", order.id),
        )
        .field("status", next.as_str());
        row = row.action(if *next == OrderStatus::Cancelled {
            action.destructive(&format!("Cancel order {}?", view.reference))
        } else {
            action
        });
    }
    row
}

/// `?orderId=` on the orders table.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub order_id: Option<OrderId>,
}

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct AdminOrdersTemplate {
    pub ctx: PageContext,
    pub section: &'static str,
    pub table: AdminTable,
}

/// Order list.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ListQuery>,
    Query(highlight): Query<HighlightQuery>,
) -> Result<AdminOrdersTemplate, AppError> {
    let mut loader = Loader::new();
    let orders = loader.load(
        "orders",
        state.api().admin_list_orders(&user.token, &query.to_params()).await,
    )?;

    let mut rows: Vec<AdminRow> = orders
        .data
        .iter()
        .map(|order| order_row(order, highlight.order_id))
        .collect();
    // Highlighted order first, like the customer order list.
    rows.sort_by_key(|row| !row.highlighted);

    Ok(AdminOrdersTemplate {
        section: "orders",
        table: AdminTable::new(orders_table_config(), "/admin/orders", &query, rows, &orders.meta),
        ctx: PageContext::new(&state, &session, Some(&user), "Orders", loader.into_toasts()).await,
    })
}

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: OrderStatus,
}

/// Move an order to a new status. The backend validates the transition.
#[instrument(skip(state, session, user, headers))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .api()
        .admin_update_order_status(&user.token, id, form.status)
        .await;
    let message = format!("Order marked {}", form.status.label().to_lowercase());
    flash_outcome(&session, result, &message).await?;
    Ok(redirect_back(&headers, "/admin/orders"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn order(id: i64, status: &str) -> Order {
        serde_json::from_value(json!({
            "id": id,
            "orderNumber": format!("PG-{id:04}"),
            "status": status,
            "customerName": "Ana Lima",
            "total": "30.00"
        }))
        .unwrap()
    }

    #[test]
    fn test_terminal_statuses_have_no_actions() {
        assert!(next_statuses(OrderStatus::Delivered).is_empty());
        assert!(next_statuses(OrderStatus::Cancelled).is_empty());
        assert!(order_row(&order(1, "DELIVERED"), None).actions.is_empty());
    }

    #[test]
    fn test_order_row_actions_and_highlight() {
        let row = order_row(&order(7, "PENDING"), Some(OrderId::new(7)));
        assert!(row.highlighted);
        assert_eq!(row.cells[0], "PG-0007");
        assert_eq!(row.cells[1], "Ana Lima");

        let labels: Vec<&str> = row.actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, ["Mark confirmed", "Mark cancelled"]);
        assert_eq!(row.actions[0].fields, [("status".to_string(), "CONFIRMED".to_string())]);
        assert!(row.actions[1].destructive);
    }

    #[test]
    fn test_status_form_parses_wire_value() {
        let form: StatusForm = serde_json::from_value(json!({"status": "SHIPPED"})).unwrap();
        assert_eq!(form.status, OrderStatus::Shipped);
    }
}

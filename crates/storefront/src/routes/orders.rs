//! Customer order history.
//!
//! `/orders?orderId=42` highlights one order, which is how order
//! notifications link here. When the highlighted order is not on the current
//! page it is fetched on its own and shown first.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use papergift_core::{OrderId, OrderStatus, PaymentStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::context::{Loader, PageContext, money, short_date};
use crate::api::Order;
use crate::components::list_query::{Pagination, empty_string_as_none};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Order line display data for templates.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: OrderId,
    pub reference: String,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub payment_label: &'static str,
    pub payment_method: String,
    pub subtotal: String,
    pub discount: Option<String>,
    pub shipping_fee: String,
    pub total: String,
    pub date: String,
    pub item_count: u32,
    pub lines: Vec<OrderLineView>,
    pub address: Option<String>,
    pub customer: Option<String>,
    /// Unpaid online order that can still be paid.
    pub awaiting_payment: bool,
    pub highlighted: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            reference: order.reference(),
            status: order.status,
            status_label: order.status.label(),
            payment_label: if order.is_cash_on_delivery()
                && order.payment_status == PaymentStatus::Pending
            {
                "Pay on delivery"
            } else {
                order.payment_status.label()
            },
            payment_method: order
                .payment_method
                .as_ref()
                .map(|m| m.name.clone())
                .unwrap_or_default(),
            subtotal: money(order.subtotal),
            discount: (!order.discount.is_zero()).then(|| money(order.discount)),
            shipping_fee: money(order.shipping_fee),
            total: money(order.total),
            date: short_date(order.created_at),
            item_count: order.item_count(),
            lines: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    name: item.product_name.clone(),
                    quantity: item.quantity,
                    line_total: money(item.line_total),
                })
                .collect(),
            address: order.address.as_ref().map(crate::api::UserAddress::one_line),
            customer: order.customer_name.clone(),
            awaiting_payment: order.payment_status != PaymentStatus::Paid
                && !order.is_cash_on_delivery()
                && order.status != OrderStatus::Cancelled,
            highlighted: false,
        }
    }
}

impl OrderView {
    /// CSS modifier for the status badge.
    #[must_use]
    pub fn status_class(&self) -> String {
        format!("status-{}", self.status.as_str().to_ascii_lowercase())
    }
}

/// Order list query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub order_id: Option<OrderId>,
}

/// Mark `highlight` in `orders`, fetching it separately when it is not
/// among them. Returns the highlighted order first.
pub(crate) fn highlight_order(
    mut orders: Vec<OrderView>,
    highlight: Option<OrderId>,
    fetched: Option<Order>,
) -> Vec<OrderView> {
    let Some(id) = highlight else {
        return orders;
    };

    if let Some(pos) = orders.iter().position(|o| o.id == id) {
        let mut order = orders.remove(pos);
        order.highlighted = true;
        orders.insert(0, order);
    } else if let Some(order) = fetched.filter(|o| o.id == id) {
        let mut view = OrderView::from(&order);
        view.highlighted = true;
        orders.insert(0, view);
    }
    orders
}

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub ctx: PageContext,
    pub orders: Vec<OrderView>,
    pub pagination: Pagination,
}

/// Display the customer's orders.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersIndexTemplate, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let mut loader = Loader::new();

    let orders = loader.load("orders", state.api().list_orders(&user.token, page).await)?;
    let mut views: Vec<OrderView> = orders.data.iter().map(OrderView::from).collect();

    if let Some(id) = query.order_id {
        let fetched = if views.iter().any(|o| o.id == id) {
            None
        } else {
            loader.load_optional("order", state.api().get_order(&user.token, id).await)?
        };
        views = highlight_order(views, Some(id), fetched);
    }

    Ok(OrdersIndexTemplate {
        pagination: Pagination::new("/orders", &orders.meta, &[]),
        orders: views,
        ctx: PageContext::new(&state, &session, Some(&user), "Your orders", loader.into_toasts())
            .await,
    })
}

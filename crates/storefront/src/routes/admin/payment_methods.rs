//! Payment method switches.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::Redirect,
};
use papergift_core::PaymentMethodId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::yes_no;
use crate::api::{PageMeta, PaymentMethod};
use crate::components::data_table::payment_methods_table_config;
use crate::components::{AdminRow, AdminTable, ListQuery, RowAction};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::{Loader, PageContext, flash_outcome, redirect_back};
use crate::state::AppState;

/// Payment methods page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/payment_methods.html")]
pub struct AdminPaymentMethodsTemplate {
    pub ctx: PageContext,
    pub section: &'static str,
    pub table: AdminTable,
}

fn method_row(method: &PaymentMethod) -> AdminRow {
    let (label, target) = if method.is_active {
        ("Disable", "false")
    } else {
        ("Enable", "true")
    };

    AdminRow::new(
        method.id,
        vec![
            method.code.clone(),
            method.name.clone(),
            method.description.clone().unwrap_or_default(),
            yes_no(method.is_active),
        ],
    )
    .action(
        RowAction::new(label, format!("/admin/payment-methods/{}/toggle", method.id))
            .field("active", target),
    )
}

/// Payment method list. The backend returns them all at once.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> Result<AdminPaymentMethodsTemplate, AppError> {
    let mut loader = Loader::new();
    let methods = loader.load(
        "payment methods",
        state.api().admin_list_payment_methods(&user.token).await,
    )?;

    let meta = PageMeta {
        total: methods.len() as u64,
        ..PageMeta::default()
    };
    let rows = methods.iter().map(method_row).collect();

    Ok(AdminPaymentMethodsTemplate {
        section: "payment-methods",
        table: AdminTable::new(
            payment_methods_table_config(),
            "/admin/payment-methods",
            &ListQuery::default(),
            rows,
            &meta,
        ),
        ctx: PageContext::new(&state, &session, Some(&user), "Payment methods", loader.into_toasts())
            .await,
    })
}

/// Toggle form data: the state to switch to.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub active: bool,
}

/// Enable or disable a payment method at checkout.
#[instrument(skip(state, session, user, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<PaymentMethodId>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .api()
        .admin_set_payment_method_active(&user.token, id, form.active)
        .await;
    let message = if form.active {
        "Payment method enabled"
    } else {
        "Payment method disabled"
    };
    flash_outcome(&session, result, message).await?;
    Ok(redirect_back(&headers, "/admin/payment-methods"))
}

//! Admin coupon management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Redirect,
};
use papergift_core::{CouponId, DiscountType};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{date_cell, discount_label, parse_amount, parse_datetime, yes_no};
use crate::api::{Coupon, NewCoupon};
use crate::components::data_table::coupons_table_config;
use crate::components::{AdminRow, AdminTable, ListQuery, RowAction};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::{Loader, PageContext, flash_outcome, money, redirect_back};
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

/// Coupons page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/coupons.html")]
pub struct AdminCouponsTemplate {
    pub ctx: PageContext,
    pub section: &'static str,
    pub table: AdminTable,
}

fn coupon_row(coupon: &Coupon) -> AdminRow {
    let used = coupon.max_uses.map_or_else(
        || coupon.used_count.to_string(),
        |max| format!("{} / {max}", coupon.used_count),
    );

    AdminRow::new(
        coupon.id,
        vec![
            coupon.code.clone(),
            discount_label(coupon.discount_type, coupon.discount_value),
            coupon.min_order_amount.map(money).unwrap_or_default(),
            used,
            date_cell(coupon.expires_at),
            yes_no(coupon.is_active),
        ],
    )
    .action(
        RowAction::new("Delete", format!("/admin/coupons/{}/delete", coupon.id))
            .destructive(&format!("Delete coupon {}?", coupon.code)),
    )
}

/// Coupon list.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<AdminCouponsTemplate, AppError> {
    let mut loader = Loader::new();
    let coupons = loader.load(
        "coupons",
        state.api().admin_list_coupons(&user.token, &query.to_params()).await,
    )?;

    let rows = coupons.data.iter().map(coupon_row).collect();
    Ok(AdminCouponsTemplate {
        section: "coupons",
        table: AdminTable::new(coupons_table_config(), "/admin/coupons", &query, rows, &coupons.meta),
        ctx: PageContext::new(&state, &session, Some(&user), "Coupons", loader.into_toasts()).await,
    })
}

/// New coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    pub code: String,
    pub discount_type: String,
    pub discount_value: String,
    #[serde(default)]
    pub min_order_amount: String,
    #[serde(default)]
    pub max_uses: String,
    #[serde(default)]
    pub expires_at: String,
}

impl CouponForm {
    fn into_request(self) -> Result<NewCoupon, String> {
        let code = self.code.trim().to_uppercase();
        if code.is_empty() {
            return Err("Coupon code is required.".to_string());
        }
        let discount_type: DiscountType = self.discount_type.parse()?;
        let discount_value = parse_amount("Discount", &self.discount_value)?
            .ok_or_else(|| "Discount is required.".to_string())?;
        let max_uses = match self.max_uses.trim() {
            "" => None,
            value => Some(
                value
                    .parse()
                    .map_err(|_| "Max uses must be a whole number.".to_string())?,
            ),
        };

        Ok(NewCoupon {
            code,
            discount_type,
            discount_value,
            min_order_amount: parse_amount("Minimum order", &self.min_order_amount)?,
            max_uses,
            expires_at: parse_datetime("Expiry", &self.expires_at)?,
        })
    }
}

/// Create a coupon. Codes are stored uppercase.
#[instrument(skip(state, session, user, headers, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Form(form): Form<CouponForm>,
) -> Result<Redirect, AppError> {
    match form.into_request() {
        Ok(coupon) => {
            let result = state.api().admin_create_coupon(&user.token, &coupon).await;
            flash_outcome(&session, result, "Coupon created").await?;
        }
        Err(message) => flash(&session, Toast::error(message)).await,
    }
    Ok(redirect_back(&headers, "/admin/coupons"))
}

/// Delete a coupon.
#[instrument(skip(state, session, user, headers))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<CouponId>,
) -> Result<Redirect, AppError> {
    let result = state.api().admin_delete_coupon(&user.token, id).await;
    flash_outcome(&session, result, "Coupon deleted").await?;
    Ok(redirect_back(&headers, "/admin/coupons"))
}

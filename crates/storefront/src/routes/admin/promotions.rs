//! Admin promotion management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Redirect,
};
use papergift_core::{DiscountType, PromotionId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{date_cell, discount_label, parse_amount, parse_datetime, yes_no};
use crate::api::{NewPromotion, Promotion};
use crate::components::data_table::promotions_table_config;
use crate::components::{AdminRow, AdminTable, ListQuery, RowAction};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::{Loader, PageContext, flash_outcome, redirect_back};
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

/// Promotions page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/promotions.html")]
pub struct AdminPromotionsTemplate {
    pub ctx: PageContext,
    pub section: &'static str,
    pub table: AdminTable,
}

fn promotion_row(promotion: &Promotion) -> AdminRow {
    let id = promotion.id;
    let (toggle_label, target) = if promotion.is_active {
        ("Deactivate", "false")
    } else {
        ("Activate", "true")
    };

    AdminRow::new(
        id,
        vec![
            promotion.name.clone(),
            discount_label(promotion.discount_type, promotion.discount_value),
            date_cell(promotion.starts_at),
            date_cell(promotion.ends_at),
            yes_no(promotion.is_active),
        ],
    )
    .action(RowAction::new(toggle_label, format!("/admin/promotions/{id}/toggle")).field("active", target))
    .action(
        RowAction::new("Delete", format!("/admin/promotions/{id}/delete"))
            .destructive(&format!("Delete promotion \"{}\"?", promotion.name)),
    )
}

/// Promotion list.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<AdminPromotionsTemplate, AppError> {
    let mut loader = Loader::new();
    let promotions = loader.load(
        "promotions",
        state.api().admin_list_promotions(&user.token, &query.to_params()).await,
    )?;

    let rows = promotions.data.iter().map(promotion_row).collect();
    Ok(AdminPromotionsTemplate {
        section: "promotions",
        table: AdminTable::new(
            promotions_table_config(),
            "/admin/promotions",
            &query,
            rows,
            &promotions.meta,
        ),
        ctx: PageContext::new(&state, &session, Some(&user), "Promotions", loader.into_toasts())
            .await,
    })
}

/// New promotion form data.
#[derive(Debug, Deserialize)]
pub struct PromotionForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: String,
    pub discount_value: String,
    #[serde(default)]
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: String,
}

impl PromotionForm {
    fn into_request(self) -> Result<NewPromotion, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Promotion name is required.".to_string());
        }
        let discount_type: DiscountType = self.discount_type.parse()?;
        let discount_value = parse_amount("Discount", &self.discount_value)?
            .ok_or_else(|| "Discount is required.".to_string())?;
        let starts_at = parse_datetime("Start", &self.starts_at)?;
        let ends_at = parse_datetime("End", &self.ends_at)?;
        if let (Some(start), Some(end)) = (starts_at, ends_at)
            && end <= start
        {
            return Err("The promotion must end after it starts.".to_string());
        }
        let description = self.description.trim();

        Ok(NewPromotion {
            name,
            description: (!description.is_empty()).then(|| description.to_string()),
            discount_type,
            discount_value,
            starts_at,
            ends_at,
        })
    }
}

/// Create a promotion.
#[instrument(skip(state, session, user, headers, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Form(form): Form<PromotionForm>,
) -> Result<Redirect, AppError> {
    match form.into_request() {
        Ok(promotion) => {
            let result = state
                .api()
                .admin_create_promotion(&user.token, &promotion)
                .await;
            flash_outcome(&session, result, "Promotion created").await?;
        }
        Err(message) => flash(&session, Toast::error(message)).await,
    }
    Ok(redirect_back(&headers, "/admin/promotions"))
}

/// Toggle form data: the state to switch to.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub active: bool,
}

/// Activate or deactivate a promotion.
#[instrument(skip(state, session, user, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<PromotionId>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .api()
        .admin_set_promotion_active(&user.token, id, form.active)
        .await;
    let message = if form.active {
        "Promotion activated"
    } else {
        "Promotion deactivated"
    };
    flash_outcome(&session, result, message).await?;
    Ok(redirect_back(&headers, "/admin/promotions"))
}

/// Delete a promotion.
#[instrument(skip(state, session, user, headers))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<PromotionId>,
) -> Result<Redirect, AppError> {
    let result = state.api().admin_delete_promotion(&user.token, id).await;
    flash_outcome(&session, result, "Promotion deleted").await?;
    Ok(redirect_back(&headers, "/admin/promotions"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form(starts_at: &str, ends_at: &str) -> PromotionForm {
        PromotionForm {
            name: "Holiday cards".to_string(),
            description: String::new(),
            discount_type: "FIXED_AMOUNT".to_string(),
            discount_value: "3".to_string(),
            starts_at: starts_at.to_string(),
            ends_at: ends_at.to_string(),
        }
    }

    #[test]
    fn test_promotion_form_checks_dates() {
        assert!(form("2026-12-01T00:00", "2026-12-24T00:00").into_request().is_ok());
        assert!(form("2026-12-24T00:00", "2026-12-01T00:00").into_request().is_err());

        let open_ended = form("", "").into_request().unwrap();
        assert_eq!(open_ended.description, None);
        assert_eq!(open_ended.discount_type, DiscountType::FixedAmount);
    }

    #[test]
    fn test_promotion_row_toggle_targets_opposite_state() {
        let promotion: Promotion = serde_json::from_value(json!({
            "id": 4,
            "name": "Holiday cards",
            "discountType": "PERCENTAGE",
            "discountValue": "15",
            "isActive": true
        }))
        .unwrap();

        let row = promotion_row(&promotion);
        assert_eq!(row.cells[1], "15%");
        let toggle = &row.actions[0];
        assert_eq!(toggle.label, "Deactivate");
        assert_eq!(toggle.fields, [("active".to_string(), "false".to_string())]);
    }
}

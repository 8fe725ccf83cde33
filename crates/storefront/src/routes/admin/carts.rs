//! Active customer carts (read-only).

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use tower_sessions::Session;
use tracing::instrument;

use super::date_cell;
use crate::api::AdminCart;
use crate::components::data_table::carts_table_config;
use crate::components::{AdminRow, AdminTable, ListQuery};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::{Loader, PageContext, money};
use crate::state::AppState;

/// Carts page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/carts.html")]
pub struct AdminCartsTemplate {
    pub ctx: PageContext,
    pub section: &'static str,
    pub table: AdminTable,
}

fn cart_row(cart: &AdminCart) -> AdminRow {
    let customer = cart
        .user
        .as_ref()
        .map_or_else(|| "Unknown".to_string(), |u| format!("{} <{}>", u.name, u.email));
    let items = cart
        .items
        .iter()
        .map(|item| format!("{} × {}", item.product.name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ");

    AdminRow::new(
        cart.id,
        vec![customer, items, money(cart.subtotal), date_cell(cart.updated_at)],
    )
}

/// Cart list.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<AdminCartsTemplate, AppError> {
    let mut loader = Loader::new();
    let carts = loader.load(
        "carts",
        state.api().admin_list_carts(&user.token, &query.to_params()).await,
    )?;

    let rows = carts.data.iter().map(cart_row).collect();
    Ok(AdminCartsTemplate {
        section: "carts",
        table: AdminTable::new(carts_table_config(), "/admin/carts", &query, rows, &carts.meta),
        ctx: PageContext::new(&state, &session, Some(&user), "Carts", loader.into_toasts()).await,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_row() {
        let cart: AdminCart = serde_json::from_value(json!({
            "id": 5,
            "user": {"id": 2, "name": "Ana", "email": "ana@example.com"},
            "items": [{
                "id": 1,
                "productId": 3,
                "product": {"id": 3, "name": "Gift Box", "price": "9.00"},
                "quantity": 2
            }],
            "subtotal": "18.00"
        }))
        .unwrap();

        let row = cart_row(&cart);
        assert_eq!(row.id, "5");
        assert_eq!(row.cells[0], "Ana <ana@example.com>");
        assert_eq!(row.cells[1], "Gift Box × 2");
        assert_eq!(row.cells[2], "$18.00");
        assert_eq!(row.cells[3], "—");
        assert!(row.actions.is_empty());
    }
}

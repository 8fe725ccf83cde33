//! Admin product management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Redirect,
};
use papergift_core::{CategoryId, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{parse_amount, yes_no};
use crate::api::{NewProduct, Product};
use crate::components::data_table::products_table_config;
use crate::components::list_query::empty_string_as_none;
use crate::components::{AdminRow, AdminTable, ListQuery, RowAction};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::{Loader, PageContext, flash_outcome, money, redirect_back};
use crate::routes::products::CategoryLink;
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

/// Products page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct AdminProductsTemplate {
    pub ctx: PageContext,
    pub section: &'static str,
    pub table: AdminTable,
    /// Options for the create form.
    pub categories: Vec<CategoryLink>,
}

fn product_row(product: &Product) -> AdminRow {
    let price = if product.is_on_sale() {
        format!("{} (was {})", money(product.effective_price()), money(product.price))
    } else {
        money(product.price)
    };

    AdminRow::new(
        product.id,
        vec![
            product.name.clone(),
            product
                .category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            price,
            product.stock.to_string(),
            yes_no(product.is_active),
        ],
    )
    .action(
        RowAction::new("Delete", format!("/admin/products/{}/delete", product.id))
            .destructive(&format!("Delete \"{}\"?", product.name)),
    )
}

/// Product list.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<AdminProductsTemplate, AppError> {
    let mut loader = Loader::new();
    let params = query.to_params();
    let (products, categories) = tokio::join!(
        state.api().admin_list_products(&user.token, &params),
        state.api().list_categories(),
    );
    let products = loader.load("products", products)?;
    let categories = loader.load("categories", categories)?;

    let rows = products.data.iter().map(product_row).collect();
    Ok(AdminProductsTemplate {
        section: "products",
        table: AdminTable::new(products_table_config(), "/admin/products", &query, rows, &products.meta),
        categories: CategoryLink::list(&categories, None),
        ctx: PageContext::new(&state, &session, Some(&user), "Products", loader.into_toasts()).await,
    })
}

/// New product form data.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: String,
}

impl ProductForm {
    fn into_request(self) -> Result<NewProduct, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Product name is required.".to_string());
        }
        let price = parse_amount("Price", &self.price)?
            .ok_or_else(|| "Price is required.".to_string())?;
        let sale_price = parse_amount("Sale price", &self.sale_price)?;
        let stock = match self.stock.trim() {
            "" => 0,
            value => value
                .parse()
                .map_err(|_| "Stock must be a whole number.".to_string())?,
        };
        let image_url = self.image_url.trim();

        Ok(NewProduct {
            name,
            description: self.description.trim().to_string(),
            price,
            sale_price,
            stock,
            category_id: self.category_id,
            image_url: (!image_url.is_empty()).then(|| image_url.to_string()),
        })
    }
}

/// Create a product.
#[instrument(skip(state, session, user, headers, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    match form.into_request() {
        Ok(product) => {
            let result = state.api().admin_create_product(&user.token, &product).await;
            flash_outcome(&session, result, "Product created").await?;
        }
        Err(message) => flash(&session, Toast::error(message)).await,
    }
    Ok(redirect_back(&headers, "/admin/products"))
}

/// Delete a product.
#[instrument(skip(state, session, user, headers))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    let result = state.api().admin_delete_product(&user.token, id).await;
    flash_outcome(&session, result, "Product deleted").await?;
    Ok(redirect_back(&headers, "/admin/products"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn form(price: &str, stock: &str) -> ProductForm {
        ProductForm {
            name: "Kraft Gift Box".to_string(),
            description: String::new(),
            price: price.to_string(),
            sale_price: String::new(),
            stock: stock.to_string(),
            category_id: None,
            image_url: " ".to_string(),
        }
    }

    #[test]
    fn test_product_form_into_request() {
        let product = form("12.50", "").into_request().unwrap();
        assert_eq!(product.price, Decimal::new(1250, 2));
        assert_eq!(product.stock, 0);
        assert_eq!(product.image_url, None);
    }

    #[test]
    fn test_product_form_rejects_bad_input() {
        assert!(form("", "3").into_request().is_err());
        assert!(form("4", "-2").into_request().is_err());
        assert!(form("4", "lots").into_request().is_err());
    }
}

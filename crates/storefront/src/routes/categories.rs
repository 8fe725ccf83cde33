//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use papergift_core::CategoryId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::context::{Loader, PageContext};
use super::products::ProductCard;
use crate::api::{Category, ProductQuery};
use crate::components::list_query::{Pagination, empty_string_as_none};
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Products per page on a category page.
const PRODUCTS_PER_PAGE: u32 = 12;

/// Category tile display data for templates.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub product_count: Option<u32>,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            image: category.image_url.clone(),
            product_count: category.product_count,
        }
    }
}

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub ctx: PageContext,
    pub categories: Vec<CategoryView>,
}

/// Display all categories.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<CategoriesIndexTemplate, AppError> {
    let mut loader = Loader::new();
    let categories = loader.load("categories", state.api().list_categories().await)?;

    Ok(CategoriesIndexTemplate {
        categories: categories.iter().map(CategoryView::from).collect(),
        ctx: PageContext::new(&state, &session, user.as_ref(), "Categories", loader.into_toasts())
            .await,
    })
}

/// Category page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
}

/// Category detail template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub ctx: PageContext,
    pub category: CategoryView,
    pub products: Vec<ProductCard>,
    pub pagination: Pagination,
}

/// Display one category and its products.
///
/// An unknown category is a 404; a failed product listing only empties the
/// grid.
#[instrument(skip(state, session, user), fields(category_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<CategoryId>,
    Query(query): Query<CategoryQuery>,
) -> Result<CategoryShowTemplate, AppError> {
    let product_query = ProductQuery {
        page: Some(query.page.unwrap_or(1).max(1)),
        limit: Some(PRODUCTS_PER_PAGE),
        category_id: Some(id),
        ..ProductQuery::default()
    };
    let (category, products) = tokio::join!(
        state.api().get_category(id),
        state.api().list_products(&product_query),
    );

    let category = category?;
    let mut loader = Loader::new();
    let products = loader.load("products", products)?;

    Ok(CategoryShowTemplate {
        pagination: Pagination::new(&format!("/categories/{id}"), &products.meta, &[]),
        products: products.data.iter().map(ProductCard::from).collect(),
        ctx: PageContext::new(&state, &session, user.as_ref(), &category.name, loader.into_toasts())
            .await,
        category: CategoryView::from(&category),
    })
}

//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::context::{Loader, PageContext};
use super::products::{CategoryLink, ProductCard};
use crate::api::ProductQuery;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Featured products shown on the home page.
const FEATURED_COUNT: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub featured: Vec<ProductCard>,
    pub categories: Vec<CategoryLink>,
}

/// Display the home page: newest products and the category strip.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate, AppError> {
    let query = ProductQuery {
        limit: Some(FEATURED_COUNT),
        sort: Some("newest".to_string()),
        ..ProductQuery::default()
    };
    let (products, categories) = tokio::join!(
        state.api().list_products(&query),
        state.api().list_categories(),
    );

    let mut loader = Loader::new();
    let products = loader.load("featured products", products)?;
    let categories = loader.load("categories", categories)?;

    Ok(HomeTemplate {
        featured: products.data.iter().map(ProductCard::from).collect(),
        categories: CategoryLink::list(&categories, None),
        ctx: PageContext::new(&state, &session, user.as_ref(), "Cards & gifts", loader.into_toasts())
            .await,
    })
}

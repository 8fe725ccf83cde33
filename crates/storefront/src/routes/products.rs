//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use papergift_core::{CategoryId, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::context::{Loader, PageContext, flash_outcome, money, short_date};
use crate::api::{Category, NewReview, Product, ProductQuery, ProductReview};
use crate::components::list_query::{Pagination, empty_string_as_none};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::services::reconcile::guest_wishlist_ids;
use crate::state::AppState;

/// Products per page on the public listing.
const PRODUCTS_PER_PAGE: u32 = 12;

/// Sort options offered on the listing (backend key, label).
pub const SORT_OPTIONS: &[(&str, &str)] = &[
    ("newest", "Newest"),
    ("price_asc", "Price: low to high"),
    ("price_desc", "Price: high to low"),
    ("rating", "Top rated"),
];

// =============================================================================
// View Models
// =============================================================================

/// Product card display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    /// Regular price shown struck through while on sale.
    pub compare_at_price: Option<String>,
    pub image: Option<String>,
    pub in_stock: bool,
    pub rating: Option<u8>,
    pub review_count: u32,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: money(product.effective_price()),
            compare_at_price: product.is_on_sale().then(|| money(product.price)),
            image: product.primary_image().map(ToString::to_string),
            in_stock: product.in_stock(),
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            rating: product.average_rating.map(|r| r.round().clamp(0.0, 5.0) as u8),
            review_count: product.review_count,
        }
    }
}

/// Category link display data for templates.
#[derive(Debug, Clone)]
pub struct CategoryLink {
    pub id: CategoryId,
    pub name: String,
    pub selected: bool,
}

impl CategoryLink {
    pub(crate) fn list(categories: &[Category], selected: Option<CategoryId>) -> Vec<Self> {
        categories
            .iter()
            .map(|c| Self {
                id: c.id,
                name: c.name.clone(),
                selected: selected == Some(c.id),
            })
            .collect()
    }
}

/// Review display data for templates.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub author: String,
    pub rating: u8,
    pub comment: String,
    pub date: String,
}

impl From<&ProductReview> for ReviewView {
    fn from(review: &ProductReview) -> Self {
        Self {
            author: review.user_name.clone(),
            rating: review.rating,
            comment: review.comment.clone().unwrap_or_default(),
            date: short_date(review.created_at),
        }
    }
}

/// Whether `product_id` is in the visitor's wishlist (backend for users,
/// session for guests).
pub(crate) async fn in_wishlist(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
    product_id: ProductId,
    loader: &mut Loader,
) -> Result<bool, AppError> {
    match user {
        Some(user) => {
            let wishlist = loader.load_optional("wishlist", state.api().get_wishlist(&user.token).await)?;
            Ok(wishlist.is_some_and(|w| w.has_item(product_id)))
        }
        None => Ok(guest_wishlist_ids(session).await.contains(&product_id)),
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Product listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<CategoryId>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub sort: Option<String>,
}

impl ProductListQuery {
    fn to_product_query(&self) -> ProductQuery {
        ProductQuery {
            page: Some(self.page.unwrap_or(1).max(1)),
            limit: Some(PRODUCTS_PER_PAGE),
            search: self.search.clone(),
            category_id: self.category,
            sort: self.sort.clone(),
        }
    }

    /// Filters carried into pagination links.
    fn link_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductCard>,
    pub categories: Vec<CategoryLink>,
    pub search: String,
    pub sort: String,
    pub sort_options: &'static [(&'static str, &'static str)],
    pub pagination: Pagination,
}

impl ProductsIndexTemplate {
    /// Whether `value` is the active sort order.
    #[must_use]
    pub fn is_sort(&self, value: &str) -> bool {
        self.sort == value
    }
}

/// Display product listing page.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ProductListQuery>,
) -> Result<ProductsIndexTemplate, AppError> {
    let product_query = query.to_product_query();
    let (products, categories) = tokio::join!(
        state.api().list_products(&product_query),
        state.api().list_categories(),
    );

    let mut loader = Loader::new();
    let products = loader.load("products", products)?;
    let categories = loader.load("categories", categories)?;

    Ok(ProductsIndexTemplate {
        pagination: Pagination::new("/products", &products.meta, &query.link_pairs()),
        products: products.data.iter().map(ProductCard::from).collect(),
        categories: CategoryLink::list(&categories, query.category),
        search: query.search.unwrap_or_default(),
        sort: query.sort.unwrap_or_default(),
        sort_options: SORT_OPTIONS,
        ctx: PageContext::new(&state, &session, user.as_ref(), "Shop", loader.into_toasts()).await,
    })
}

// =============================================================================
// Detail
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: ProductCard,
    pub description: String,
    pub category: Option<CategoryLink>,
    pub stock: u32,
    pub reviews: Vec<ReviewView>,
    pub in_wishlist: bool,
    pub can_review: bool,
}

/// Display product detail page.
#[instrument(skip(state, session, user), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<ProductShowTemplate, AppError> {
    let mut loader = Loader::new();
    let (product, reviews, in_wishlist) = tokio::join!(
        state.api().get_product(id),
        state.api().list_product_reviews(id),
        in_wishlist(&state, &session, user.as_ref(), id, &mut loader),
    );

    // The product itself is the page; without it there is nothing to show.
    let product = product?;
    let in_wishlist = in_wishlist?;
    let reviews = loader.load("reviews", reviews)?;

    Ok(ProductShowTemplate {
        description: product.description.clone(),
        category: product.category.as_ref().map(|c| CategoryLink {
            id: c.id,
            name: c.name.clone(),
            selected: false,
        }),
        stock: product.stock,
        reviews: reviews.iter().map(ReviewView::from).collect(),
        in_wishlist,
        can_review: user.is_some(),
        ctx: PageContext::new(&state, &session, user.as_ref(), &product.name, loader.into_toasts())
            .await,
        product: ProductCard::from(&product),
    })
}

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Submit a review for moderation.
#[instrument(skip(state, session, user, form), fields(product_id = %id))]
pub async fn create_review(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<ReviewForm>,
) -> Result<Redirect, AppError> {
    let review = NewReview {
        rating: form.rating,
        comment: Some(form.comment.trim().to_string()).filter(|c| !c.is_empty()),
    };
    let result = state.api().create_review(&user.token, id, &review).await;
    flash_outcome(
        &session,
        result,
        "Thanks! Your review will appear once it has been approved.",
    )
    .await?;

    Ok(Redirect::to(&format!("/products/{id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_card_sale_price() {
        let product: Product = serde_json::from_value(json!({
            "id": 5,
            "name": "Thank You Card",
            "price": "6.00",
            "salePrice": "4.50",
            "stock": 0,
            "averageRating": 4.6
        }))
        .unwrap();

        let card = ProductCard::from(&product);
        assert_eq!(card.price, "$4.50");
        assert_eq!(card.compare_at_price.as_deref(), Some("$6.00"));
        assert!(!card.in_stock);
        assert_eq!(card.rating, Some(5));
        assert_eq!(product.effective_price(), Decimal::new(450, 2));
    }

    #[test]
    fn test_listing_query_links() {
        let query = ProductListQuery {
            page: Some(3),
            search: Some("birthday".to_string()),
            category: Some(CategoryId::new(2)),
            sort: None,
        };
        let product_query = query.to_product_query();
        assert_eq!(product_query.page, Some(3));
        assert_eq!(product_query.limit, Some(PRODUCTS_PER_PAGE));
        assert_eq!(
            query.link_pairs(),
            vec![
                ("search", "birthday".to_string()),
                ("category", "2".to_string())
            ]
        );
    }
}

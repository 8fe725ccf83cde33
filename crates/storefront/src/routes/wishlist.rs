//! Wishlist route handlers.
//!
//! Mirrors the cart: guests' wishlists live in the session, logged-in users'
//! in the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use papergift_core::{GuestProduct, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::context::{Loader, PageContext, htmx_fragment, is_htmx, money, redirect_back};
use crate::api::{ApiError, WishlistItem};
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::services::counters::wishlist_count;
use crate::services::guest_store::GuestStore;
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

/// HTMX event raised after every wishlist change.
pub const WISHLIST_UPDATED: &str = "wishlist-updated";

/// Wishlist entry display data for templates.
#[derive(Debug, Clone)]
pub struct WishlistItemView {
    pub product_id: ProductId,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub in_stock: bool,
}

impl From<&WishlistItem> for WishlistItemView {
    fn from(item: &WishlistItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.product.name.clone(),
            price: money(item.product.effective_price()),
            image: item.product.primary_image().map(ToString::to_string),
            in_stock: item.product.in_stock(),
        }
    }
}

impl From<&GuestProduct> for WishlistItemView {
    fn from(product: &GuestProduct) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: money(product.price),
            image: product.image_url.clone(),
            in_stock: product.stock > 0,
        }
    }
}

async fn load_items(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
    loader: &mut Loader,
) -> Result<Vec<WishlistItemView>, AppError> {
    match user {
        Some(user) => Ok(loader
            .load_optional("wishlist", state.api().get_wishlist(&user.token).await)?
            .map(|wishlist| wishlist.items.iter().map(WishlistItemView::from).collect())
            .unwrap_or_default()),
        None => Ok(GuestStore::new(session)
            .wishlist()
            .await
            .items()
            .iter()
            .map(WishlistItemView::from)
            .collect()),
    }
}

fn api_outcome(result: Result<(), ApiError>, success: &str) -> Result<Toast, AppError> {
    match result {
        Ok(()) => Ok(Toast::success(success)),
        Err(e) if e.is_unauthorized() => Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Wishlist action failed");
            Ok(Toast::from_api_error(&e))
        }
    }
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub ctx: PageContext,
    pub items: Vec<WishlistItemView>,
}

/// Wishlist items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_items.html")]
pub struct WishlistItemsTemplate {
    pub items: Vec<WishlistItemView>,
}

/// Wishlist count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_count.html")]
pub struct WishlistCountTemplate {
    pub count: usize,
}

/// Wishlist form data.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: ProductId,
}

/// Display wishlist page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<WishlistShowTemplate, AppError> {
    let mut loader = Loader::new();
    let items = load_items(&state, &session, user.as_ref(), &mut loader).await?;

    Ok(WishlistShowTemplate {
        ctx: PageContext::new(&state, &session, user.as_ref(), "Wishlist", loader.into_toasts())
            .await,
        items,
    })
}

/// Add a product to the wishlist.
#[instrument(skip(state, session, user, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<WishlistForm>,
) -> Result<Response, AppError> {
    let toast = match &user {
        Some(user) => api_outcome(
            state
                .api()
                .add_wishlist_item(&user.token, form.product_id)
                .await,
            "Saved to your wishlist",
        )?,
        None => match state.api().get_product(form.product_id).await {
            Ok(product) => match GuestStore::new(&session)
                .add_to_wishlist((&product).into())
                .await
            {
                Ok(true) => Toast::success("Saved to your wishlist"),
                Ok(false) => Toast::info("Already in your wishlist"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to save guest wishlist");
                    Toast::error("Something went wrong. Please try again.")
                }
            },
            Err(e) => Toast::from_api_error(&e),
        },
    };

    if is_htmx(&headers) {
        let count = wishlist_count(state.api(), &session, user.as_ref()).await;
        return Ok(htmx_fragment(
            &[WISHLIST_UPDATED],
            Some(&toast),
            WishlistCountTemplate { count },
        ));
    }

    flash(&session, toast).await;
    Ok(redirect_back(&headers, "/wishlist").into_response())
}

/// Remove a product from the wishlist.
///
/// HTMX requests get the re-rendered list.
#[instrument(skip(state, session, user, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<WishlistForm>,
) -> Result<Response, AppError> {
    let toast = match &user {
        Some(user) => api_outcome(
            state
                .api()
                .remove_wishlist_item(&user.token, form.product_id)
                .await,
            "Removed from your wishlist",
        )?,
        None => match GuestStore::new(&session)
            .remove_from_wishlist(form.product_id)
            .await
        {
            Ok(_) => Toast::success("Removed from your wishlist"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to save guest wishlist");
                Toast::error("Something went wrong. Please try again.")
            }
        },
    };

    if !is_htmx(&headers) {
        flash(&session, toast).await;
        return Ok(redirect_back(&headers, "/wishlist").into_response());
    }

    let mut loader = Loader::new();
    let items = load_items(&state, &session, user.as_ref(), &mut loader).await?;
    let toast = loader.into_toasts().into_iter().next().unwrap_or(toast);
    Ok(htmx_fragment(
        &[WISHLIST_UPDATED],
        Some(&toast),
        WishlistItemsTemplate { items },
    ))
}

/// Get wishlist count badge (HTMX).
#[instrument(skip(state, session, user))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> WishlistCountTemplate {
    WishlistCountTemplate {
        count: wishlist_count(state.api(), &session, user.as_ref()).await,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_guest_item_view() {
        let product = GuestProduct {
            id: ProductId::new(8),
            name: "Pressed Flower Card".to_string(),
            price: Decimal::new(599, 2),
            image_url: Some("/img/8.jpg".to_string()),
            stock: 0,
        };

        let view = WishlistItemView::from(&product);
        assert_eq!(view.price, "$5.99");
        assert!(!view.in_stock);
        assert_eq!(view.image.as_deref(), Some("/img/8.jpg"));
    }
}

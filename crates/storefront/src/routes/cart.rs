//! Cart route handlers.
//!
//! Guests keep their cart in the session; logged-in users' carts live in the
//! backend. Cart operations use HTMX for dynamic updates without full page
//! reloads and fall back to redirect-after-POST without JavaScript.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use papergift_core::{CartItemId, GuestCart, GuestError, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::context::{Loader, PageContext, htmx_fragment, is_htmx, money, redirect_back};
use crate::api::{AddCartItem, ApiError, CartResponse};
use crate::components::list_query::empty_string_as_none;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::services::counters::cart_count;
use crate::services::guest_store::{GuestStore, GuestStoreError};
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

/// HTMX event raised after every cart change.
pub const CART_UPDATED: &str = "cart-updated";

// =============================================================================
// View Models
// =============================================================================

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: ProductId,
    /// Backend line id; guests' lines have none.
    pub item_id: Option<CartItemId>,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    /// Upper bound for the quantity input.
    pub max_quantity: u32,
}

/// Cart display data for templates.
#[derive(Debug, Clone, Default)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&CartResponse> for CartView {
    fn from(cart: &CartResponse) -> Self {
        Self {
            lines: cart
                .items
                .iter()
                .map(|item| {
                    let unit_price = if item.unit_price.is_zero() {
                        item.product.effective_price()
                    } else {
                        item.unit_price
                    };
                    let line_total = if item.line_total.is_zero() {
                        unit_price * rust_decimal::Decimal::from(item.quantity)
                    } else {
                        item.line_total
                    };
                    CartLineView {
                        product_id: item.product_id,
                        item_id: Some(item.id),
                        name: item.product.name.clone(),
                        image: item.product.primary_image().map(ToString::to_string),
                        quantity: item.quantity,
                        unit_price: money(unit_price),
                        line_total: money(line_total),
                        max_quantity: item.product.stock.max(item.quantity),
                    }
                })
                .collect(),
            subtotal: money(cart.subtotal),
            item_count: cart.item_count(),
        }
    }
}

impl From<&GuestCart> for CartView {
    fn from(cart: &GuestCart) -> Self {
        Self {
            lines: cart
                .items()
                .iter()
                .map(|item| CartLineView {
                    product_id: item.product.id,
                    item_id: None,
                    name: item.product.name.clone(),
                    image: item.product.image_url.clone(),
                    quantity: item.quantity,
                    unit_price: money(item.product.price),
                    line_total: money(item.line_total()),
                    max_quantity: item.product.stock,
                })
                .collect(),
            subtotal: money(cart.subtotal()),
            item_count: cart.item_count(),
        }
    }
}

/// Load the visitor's cart view.
async fn load_cart(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
    loader: &mut Loader,
) -> Result<CartView, AppError> {
    match user {
        Some(user) => Ok(loader
            .load_optional("cart", state.api().get_cart(&user.token).await)?
            .map(|cart| CartView::from(&cart))
            .unwrap_or_default()),
        None => Ok(CartView::from(&GuestStore::new(session).cart().await)),
    }
}

/// Toast for a rejected guest cart change.
fn guest_error_toast(err: &GuestStoreError) -> Toast {
    match err {
        GuestStoreError::Guest(GuestError::InsufficientStock {
            name, available, ..
        }) => Toast::error(format!("Only {available} of \"{name}\" left in stock.")),
        GuestStoreError::Guest(GuestError::InvalidQuantity) => {
            Toast::error("Quantity must be at least 1.")
        }
        GuestStoreError::Session(e) => {
            tracing::error!(error = %e, "Failed to save guest cart");
            Toast::error("Something went wrong. Please try again.")
        }
    }
}

/// Toast for a backend cart call; a rejected token aborts the request.
fn api_outcome<T>(result: Result<T, ApiError>, success: &str) -> Result<Toast, AppError> {
    match result {
        Ok(_) => Ok(Toast::success(success)),
        Err(e) if e.is_unauthorized() => Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Cart action failed");
            Ok(Toast::from_api_error(&e))
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub item_id: Option<CartItemId>,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub item_id: Option<CartItemId>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<CartShowTemplate, AppError> {
    let mut loader = Loader::new();
    let cart = load_cart(&state, &session, user.as_ref(), &mut loader).await?;

    Ok(CartShowTemplate {
        ctx: PageContext::new(&state, &session, user.as_ref(), "Your cart", loader.into_toasts())
            .await,
        cart,
    })
}

/// Add item to cart.
///
/// HTMX requests get the new count badge plus a `cart-updated` trigger;
/// plain form posts are redirected back with a flashed toast.
#[instrument(skip(state, session, user, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let quantity = form.quantity.unwrap_or(1);

    let toast = match &user {
        Some(user) => {
            let item = AddCartItem {
                product_id: form.product_id,
                quantity,
            };
            api_outcome(
                state.api().add_cart_item(&user.token, item).await,
                "Added to cart",
            )?
        }
        None => match state.api().get_product_uncached(form.product_id).await {
            // Skip the catalog cache so the stock snapshot is current.
            Ok(product) => match GuestStore::new(&session)
                .add_to_cart((&product).into(), quantity)
                .await
            {
                Ok(_) => Toast::success(format!("Added \"{}\" to cart", product.name)),
                Err(e) => guest_error_toast(&e),
            },
            Err(e) => Toast::from_api_error(&e),
        },
    };

    if is_htmx(&headers) {
        let count = cart_count(state.api(), &session, user.as_ref()).await;
        return Ok(htmx_fragment(
            &[CART_UPDATED],
            Some(&toast),
            CartCountTemplate { count },
        ));
    }

    flash(&session, toast).await;
    Ok(redirect_back(&headers, "/cart").into_response())
}

/// Update cart item quantity. Zero removes the line.
#[instrument(skip(state, session, user, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response, AppError> {
    let toast = match (&user, form.item_id) {
        (Some(user), Some(item_id)) if form.quantity == 0 => api_outcome(
            state.api().remove_cart_item(&user.token, item_id).await,
            "Item removed",
        )?,
        (Some(user), Some(item_id)) => api_outcome(
            state
                .api()
                .update_cart_item(&user.token, item_id, form.quantity)
                .await,
            "Cart updated",
        )?,
        (Some(_), None) => Toast::error("That item is no longer in your cart."),
        (None, _) => match GuestStore::new(&session)
            .update_cart_quantity(form.product_id, form.quantity)
            .await
        {
            Ok(true) => Toast::success("Cart updated"),
            Ok(false) => Toast::error("That item is no longer in your cart."),
            Err(e) => guest_error_toast(&e),
        },
    };

    respond_with_items(&state, &session, user.as_ref(), &headers, toast).await
}

/// Remove item from cart.
#[instrument(skip(state, session, user, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response, AppError> {
    let toast = match (&user, form.item_id) {
        (Some(user), Some(item_id)) => api_outcome(
            state.api().remove_cart_item(&user.token, item_id).await,
            "Item removed",
        )?,
        (Some(_), None) => Toast::info("That item is no longer in your cart."),
        (None, _) => match GuestStore::new(&session)
            .remove_from_cart(form.product_id)
            .await
        {
            Ok(_) => Toast::success("Item removed"),
            Err(e) => guest_error_toast(&e),
        },
    };

    respond_with_items(&state, &session, user.as_ref(), &headers, toast).await
}

/// Empty the cart.
#[instrument(skip(state, session, user, headers))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let toast = match &user {
        Some(user) => api_outcome(state.api().clear_cart(&user.token).await, "Cart cleared")?,
        None => match GuestStore::new(&session).clear_cart().await {
            Ok(()) => Toast::success("Cart cleared"),
            Err(e) => guest_error_toast(&e),
        },
    };

    respond_with_items(&state, &session, user.as_ref(), &headers, toast).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session, user))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> CartCountTemplate {
    CartCountTemplate {
        count: cart_count(state.api(), &session, user.as_ref()).await,
    }
}

/// Re-render the cart items for HTMX, or redirect to the cart page.
async fn respond_with_items(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
    headers: &HeaderMap,
    toast: Toast,
) -> Result<Response, AppError> {
    if !is_htmx(headers) {
        flash(session, toast).await;
        return Ok(redirect_back(headers, "/cart").into_response());
    }

    let mut loader = Loader::new();
    let cart = load_cart(state, session, user, &mut loader).await?;
    // A failed reload replaces the action's toast; the list may be stale.
    let toast = loader.into_toasts().into_iter().next().unwrap_or(toast);

    Ok(htmx_fragment(
        &[CART_UPDATED],
        Some(&toast),
        CartItemsTemplate { cart },
    ))
}

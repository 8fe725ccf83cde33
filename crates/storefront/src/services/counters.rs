//! Cart and wishlist badge counts.
//!
//! Logged-in users are counted from the backend; guests from the session.
//! A failed backend call shows zero rather than breaking the header.

use tower_sessions::Session;

use super::guest_store::GuestStore;
use crate::api::ApiClient;
use crate::models::CurrentUser;

/// Units in the cart.
pub async fn cart_count(api: &ApiClient, session: &Session, user: Option<&CurrentUser>) -> u32 {
    match user {
        Some(user) => match api.get_cart(&user.token).await {
            Ok(cart) => cart.item_count(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load cart count");
                0
            }
        },
        None => GuestStore::new(session).cart().await.item_count(),
    }
}

/// Products in the wishlist.
pub async fn wishlist_count(
    api: &ApiClient,
    session: &Session,
    user: Option<&CurrentUser>,
) -> usize {
    match user {
        Some(user) => match api.get_wishlist(&user.token).await {
            Ok(wishlist) => wishlist.items.len(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load wishlist count");
                0
            }
        },
        None => GuestStore::new(session).wishlist().await.len(),
    }
}

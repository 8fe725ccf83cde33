//! Hand guest state to the backend after login.
//!
//! The guest cart and wishlist are staged in the merge requests; the backend
//! applies its own rule (sum quantities, cap at stock). Guest state is
//! cleared only for the parts the backend accepted, so a failed merge can be
//! retried on the next login.

use papergift_core::ProductId;
use tower_sessions::Session;
use tracing::instrument;

use super::guest_store::GuestStore;
use super::toast::Toast;
use crate::api::{AddCartItem, ApiClient, MergeCartRequest, MergeWishlistRequest};
use crate::models::CurrentUser;

/// What happened to each part of the guest state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    /// Nothing was staged.
    Empty,
    /// The backend accepted the merge; guest state was cleared.
    Merged,
    /// The merge failed; guest state was kept.
    Failed,
}

/// Outcome of reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub cart: MergeStatus,
    pub wishlist: MergeStatus,
    /// Toasts to flash (warnings for failed merges).
    pub toasts: Vec<Toast>,
}

/// Merge the guest cart and wishlist into the user's backend state.
#[instrument(skip(api, session, user), fields(user_id = %user.id))]
pub async fn reconcile_guest_state(
    api: &ApiClient,
    session: &Session,
    user: &CurrentUser,
) -> ReconcileReport {
    let store = GuestStore::new(session);
    let mut toasts = Vec::new();

    let guest_cart = store.cart().await;
    let cart = if guest_cart.is_empty() {
        MergeStatus::Empty
    } else {
        let request = MergeCartRequest {
            items: guest_cart
                .merge_lines()
                .into_iter()
                .map(|(product_id, quantity)| AddCartItem {
                    product_id,
                    quantity,
                })
                .collect(),
        };
        match api.merge_cart(&user.token, &request).await {
            Ok(_) => {
                tracing::info!(lines = request.items.len(), "Guest cart merged");
                if let Err(e) = store.clear_cart().await {
                    tracing::warn!(error = %e, "Failed to clear merged guest cart");
                }
                MergeStatus::Merged
            }
            Err(e) => {
                tracing::warn!(error = %e, "Guest cart merge failed");
                toasts.push(Toast::warning(
                    "We couldn't move the items from your guest cart. They are still saved on this device.",
                ));
                MergeStatus::Failed
            }
        }
    };

    let guest_wishlist = store.wishlist().await;
    let wishlist = if guest_wishlist.is_empty() {
        MergeStatus::Empty
    } else {
        let request = MergeWishlistRequest {
            product_ids: guest_wishlist.product_ids(),
        };
        match api.merge_wishlist(&user.token, &request).await {
            Ok(()) => {
                tracing::info!(products = request.product_ids.len(), "Guest wishlist merged");
                if let Err(e) = store.clear_wishlist().await {
                    tracing::warn!(error = %e, "Failed to clear merged guest wishlist");
                }
                MergeStatus::Merged
            }
            Err(e) => {
                tracing::warn!(error = %e, "Guest wishlist merge failed");
                toasts.push(Toast::warning(
                    "We couldn't move your saved wishlist. It is still saved on this device.",
                ));
                MergeStatus::Failed
            }
        }
    };

    ReconcileReport {
        cart,
        wishlist,
        toasts,
    }
}

/// Accept `next` only as a local absolute path.
///
/// Rejects scheme-relative (`//host`), backslash and absolute URLs, which
/// would turn the login form into an open redirect.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim).filter(|path| {
        path.starts_with('/')
            && !path.starts_with("//")
            && !path.contains('\\')
            && !path.starts_with("/auth/")
    })
}

/// Where to send the user after login: `next`, else `/admin` for admins,
/// else the home page.
#[must_use]
pub fn post_login_redirect(user: &CurrentUser, next: Option<&str>) -> String {
    safe_next(next).map_or_else(
        || {
            if user.is_admin() {
                "/admin".to_string()
            } else {
                "/".to_string()
            }
        },
        ToString::to_string,
    )
}

/// Products staged in the guest wishlist, used to mark "in wishlist" before
/// login.
pub async fn guest_wishlist_ids(session: &Session) -> Vec<ProductId> {
    GuestStore::new(session).wishlist().await.product_ids()
}

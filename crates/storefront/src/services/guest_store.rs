//! Session persistence for the guest cart and wishlist.
//!
//! Every operation loads the value, applies the pure state change from
//! `papergift_core::guest` and writes it back only when the change
//! succeeded, so a rejected add leaves the stored cart untouched.

use papergift_core::{GuestCart, GuestError, GuestProduct, GuestWishlist, ProductId};
use thiserror::Error;
use tower_sessions::Session;

use crate::models::session_keys;

/// Errors from guest store operations.
#[derive(Debug, Error)]
pub enum GuestStoreError {
    /// The cart rejected the change.
    #[error(transparent)]
    Guest(#[from] GuestError),

    /// The session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Guest cart/wishlist bound to one visitor's session.
#[derive(Clone, Copy)]
pub struct GuestStore<'a> {
    session: &'a Session,
}

impl<'a> GuestStore<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Load the cart; a missing or unreadable value is an empty cart.
    pub async fn cart(&self) -> GuestCart {
        self.session
            .get(session_keys::GUEST_CART)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    async fn save_cart(&self, cart: &GuestCart) -> Result<(), GuestStoreError> {
        self.session.insert(session_keys::GUEST_CART, cart).await?;
        Ok(())
    }

    /// Add a product; returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `GuestError::InsufficientStock` when the line would exceed the
    /// product's stock, or a session error.
    pub async fn add_to_cart(
        &self,
        product: GuestProduct,
        quantity: u32,
    ) -> Result<u32, GuestStoreError> {
        let mut cart = self.cart().await;
        let new_quantity = cart.add_item(product, quantity)?;
        self.save_cart(&cart).await?;
        Ok(new_quantity)
    }

    /// Set a line's quantity; `0` removes it. Returns whether the line
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns `GuestError::InsufficientStock` above the recorded stock, or a
    /// session error.
    pub async fn update_cart_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<bool, GuestStoreError> {
        let mut cart = self.cart().await;
        let found = cart.update_quantity(product_id, quantity)?;
        if found {
            self.save_cart(&cart).await?;
        }
        Ok(found)
    }

    /// Remove a line. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<bool, GuestStoreError> {
        let mut cart = self.cart().await;
        let removed = cart.remove_item(product_id);
        if removed {
            self.save_cart(&cart).await?;
        }
        Ok(removed)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear_cart(&self) -> Result<(), GuestStoreError> {
        self.session
            .remove::<GuestCart>(session_keys::GUEST_CART)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Load the wishlist; a missing or unreadable value is empty.
    pub async fn wishlist(&self) -> GuestWishlist {
        self.session
            .get(session_keys::GUEST_WISHLIST)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Add a product. Returns `false` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn add_to_wishlist(&self, product: GuestProduct) -> Result<bool, GuestStoreError> {
        let mut wishlist = self.wishlist().await;
        let added = wishlist.add(product);
        self.session
            .insert(session_keys::GUEST_WISHLIST, &wishlist)
            .await?;
        Ok(added)
    }

    /// Remove a product. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn remove_from_wishlist(
        &self,
        product_id: ProductId,
    ) -> Result<bool, GuestStoreError> {
        let mut wishlist = self.wishlist().await;
        let removed = wishlist.remove(product_id);
        if removed {
            self.session
                .insert(session_keys::GUEST_WISHLIST, &wishlist)
                .await?;
        }
        Ok(removed)
    }

    /// Empty the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear_wishlist(&self) -> Result<(), GuestStoreError> {
        self.session
            .remove::<GuestWishlist>(session_keys::GUEST_WISHLIST)
            .await?;
        Ok(())
    }
}

//! Server-side cart for logged-in customers.

use papergift_core::{AccessToken, CartItemId};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::client::NoBody;
use super::types::{AddCartItem, CartResponse, MergeCartRequest};
use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct QuantityUpdate {
    quantity: u32,
}

impl ApiClient {
    /// Fetch the customer's cart (`GET /cart`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &AccessToken) -> Result<CartResponse, ApiError> {
        self.get("cart", &[], Some(token)).await
    }

    /// Add a product to the cart (`POST /cart/items`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's message when stock is
    /// insufficient, or an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn add_cart_item(
        &self,
        token: &AccessToken,
        item: AddCartItem,
    ) -> Result<CartResponse, ApiError> {
        self.send(Method::POST, "cart/items", Some(&item), Some(token))
            .await
    }

    /// Change a line's quantity (`PATCH /cart/items/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    #[instrument(skip(self, token), fields(item_id = %item_id))]
    pub async fn update_cart_item(
        &self,
        token: &AccessToken,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartResponse, ApiError> {
        self.send(
            Method::PATCH,
            &format!("cart/items/{item_id}"),
            Some(&QuantityUpdate { quantity }),
            Some(token),
        )
        .await
    }

    /// Remove a line (`DELETE /cart/items/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(item_id = %item_id))]
    pub async fn remove_cart_item(
        &self,
        token: &AccessToken,
        item_id: CartItemId,
    ) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(
            Method::DELETE,
            &format!("cart/items/{item_id}"),
            None,
            Some(token),
        )
        .await
    }

    /// Empty the cart (`DELETE /cart`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &AccessToken) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(Method::DELETE, "cart", None, Some(token))
            .await
    }

    /// Merge a staged guest cart into the customer's cart (`POST /cart/merge`).
    ///
    /// The backend sums quantities and caps them at stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, request), fields(lines = request.items.len()))]
    pub async fn merge_cart(
        &self,
        token: &AccessToken,
        request: &MergeCartRequest,
    ) -> Result<CartResponse, ApiError> {
        self.send(Method::POST, "cart/merge", Some(request), Some(token))
            .await
    }
}

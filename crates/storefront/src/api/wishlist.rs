//! Server-side wishlist for logged-in customers.

use papergift_core::{AccessToken, ProductId};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::client::NoBody;
use super::types::{MergeWishlistRequest, Wishlist};
use super::{ApiClient, ApiError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddWishlistItem {
    product_id: ProductId,
}

impl ApiClient {
    /// Fetch the customer's wishlist (`GET /wishlist`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn get_wishlist(&self, token: &AccessToken) -> Result<Wishlist, ApiError> {
        self.get("wishlist", &[], Some(token)).await
    }

    /// Add a product (`POST /wishlist/items`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_wishlist_item(
        &self,
        token: &AccessToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.send_unit(
            Method::POST,
            "wishlist/items",
            Some(&AddWishlistItem { product_id }),
            Some(token),
        )
        .await
    }

    /// Remove a product (`DELETE /wishlist/items/{productId}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_wishlist_item(
        &self,
        token: &AccessToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(
            Method::DELETE,
            &format!("wishlist/items/{product_id}"),
            None,
            Some(token),
        )
        .await
    }

    /// Merge guest wishlist products (`POST /wishlist/merge`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, request), fields(products = request.product_ids.len()))]
    pub async fn merge_wishlist(
        &self,
        token: &AccessToken,
        request: &MergeWishlistRequest,
    ) -> Result<(), ApiError> {
        self.send_unit(Method::POST, "wishlist/merge", Some(request), Some(token))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Json as JsonBody;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;
    use crate::api::testing::spawn_backend;

    #[tokio::test]
    async fn test_get_wishlist_membership() {
        let router = Router::new().route(
            "/wishlist",
            get(|| async {
                Json(json!({"items": [{
                    "id": 1, "productId": 8,
                    "product": {"id": 8, "name": "Gift Box", "price": "24.00"}
                }]}))
            }),
        );
        let api = spawn_backend(router).await;

        let wishlist = api.get_wishlist(&AccessToken::new("t")).await.unwrap();
        assert!(wishlist.has_item(ProductId::new(8)));
        assert!(!wishlist.has_item(ProductId::new(9)));
    }

    #[tokio::test]
    async fn test_add_sends_product_id() {
        let router = Router::new().route(
            "/wishlist/items",
            post(|JsonBody(body): JsonBody<Value>| async move {
                assert_eq!(body, json!({"productId": 8}));
                StatusCode::CREATED
            }),
        );
        let api = spawn_backend(router).await;

        api.add_wishlist_item(&AccessToken::new("t"), ProductId::new(8))
            .await
            .unwrap();
    }
}

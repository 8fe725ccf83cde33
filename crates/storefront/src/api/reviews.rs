//! Product reviews.

use papergift_core::{AccessToken, ProductId};
use reqwest::Method;
use tracing::instrument;

use super::types::{NewReview, ProductReview};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Approved reviews for a product (`GET /products/{id}/reviews`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn list_product_reviews(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductReview>, ApiError> {
        self.get(&format!("products/{product_id}/reviews"), &[], None)
            .await
    }

    /// Submit a review; it stays hidden until an admin approves it
    /// (`POST /products/{id}/reviews`).
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails (e.g. rating out of range, not
    /// purchased) or the request fails.
    #[instrument(skip(self, token, review), fields(product_id = %product_id))]
    pub async fn create_review(
        &self,
        token: &AccessToken,
        product_id: ProductId,
        review: &NewReview,
    ) -> Result<ProductReview, ApiError> {
        self.send(
            Method::POST,
            &format!("products/{product_id}/reviews"),
            Some(review),
            Some(token),
        )
        .await
    }
}

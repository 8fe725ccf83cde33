//! Review moderation state for the admin reviews table.
//!
//! The list is only changed after the backend confirms an action, so a
//! failed approval leaves the rendered table exactly as it was.

use papergift_core::{AccessToken, ReviewId};
use tracing::instrument;

use super::toast::Toast;
use crate::api::{ApiClient, ProductReview};

/// The page of reviews an admin is looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewModeration {
    reviews: Vec<ProductReview>,
}

impl ReviewModeration {
    #[must_use]
    pub const fn new(reviews: Vec<ProductReview>) -> Self {
        Self { reviews }
    }

    #[must_use]
    pub fn reviews(&self) -> &[ProductReview] {
        &self.reviews
    }

    /// Reviews still awaiting approval.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.reviews.iter().filter(|r| !r.is_approved).count()
    }

    /// Approve a review. Marks it approved locally once the backend agrees.
    #[instrument(skip(self, api, token), fields(review_id = %id))]
    pub async fn approve(&mut self, api: &ApiClient, token: &AccessToken, id: ReviewId) -> Toast {
        match api.admin_approve_review(token, id).await {
            Ok(()) => {
                if let Some(review) = self.reviews.iter_mut().find(|r| r.id == id) {
                    review.is_approved = true;
                }
                Toast::success("Review approved")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Review approval failed");
                Toast::from_api_error(&e)
            }
        }
    }

    /// Delete a review. Drops it locally once the backend agrees.
    #[instrument(skip(self, api, token), fields(review_id = %id))]
    pub async fn delete(&mut self, api: &ApiClient, token: &AccessToken, id: ReviewId) -> Toast {
        match api.admin_delete_review(token, id).await {
            Ok(()) => {
                self.reviews.retain(|r| r.id != id);
                Toast::success("Review deleted")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Review deletion failed");
                Toast::from_api_error(&e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::{delete, patch};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::api::testing::spawn_backend;
    use crate::services::toast::ToastLevel;

    fn pending_reviews() -> Vec<ProductReview> {
        serde_json::from_value(json!([
            {"id": 1, "productId": 3, "userName": "Bea", "rating": 5, "isApproved": false},
            {"id": 2, "productId": 3, "userName": "Cal", "rating": 2, "isApproved": false}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_failed_approval_leaves_list_unchanged() {
        let router = Router::new().route(
            "/admin/reviews/{id}/approve",
            patch(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "Review was already removed"})),
                )
            }),
        );
        let api = spawn_backend(router).await;
        let mut moderation = ReviewModeration::new(pending_reviews());
        let before = moderation.clone();

        let toast = moderation
            .approve(&api, &AccessToken::new("admin"), ReviewId::new(1))
            .await;

        assert_eq!(moderation, before);
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Review was already removed");
    }

    #[tokio::test]
    async fn test_approval_marks_review() {
        let router = Router::new().route(
            "/admin/reviews/{id}/approve",
            patch(|| async { Json(json!({})) }),
        );
        let api = spawn_backend(router).await;
        let mut moderation = ReviewModeration::new(pending_reviews());

        let toast = moderation
            .approve(&api, &AccessToken::new("admin"), ReviewId::new(1))
            .await;

        assert_eq!(toast.level, ToastLevel::Success);
        assert!(moderation.reviews()[0].is_approved);
        assert_eq!(moderation.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_after_confirmation() {
        let router = Router::new().route(
            "/admin/reviews/{id}",
            delete(|| async { StatusCode::NO_CONTENT }),
        );
        let api = spawn_backend(router).await;
        let mut moderation = ReviewModeration::new(pending_reviews());

        moderation
            .delete(&api, &AccessToken::new("admin"), ReviewId::new(2))
            .await;

        assert_eq!(moderation.reviews().len(), 1);
    }
}

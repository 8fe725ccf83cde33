//! Coupon validation and promotion previews.

use papergift_core::AccessToken;
use reqwest::Method;
use tracing::instrument;

use super::types::{CouponValidation, PromotionPreview, ValidateCouponRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Validate a coupon code against a subtotal (`POST /coupons/validate`).
    ///
    /// An unusable code may come back either as `valid: false` with a
    /// message or as a 4xx error; callers treat both as a rejection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the code.
    #[instrument(skip(self, token), fields(code = %request.code))]
    pub async fn validate_coupon(
        &self,
        token: &AccessToken,
        request: &ValidateCouponRequest,
    ) -> Result<CouponValidation, ApiError> {
        self.send(Method::POST, "coupons/validate", Some(request), Some(token))
            .await
    }

    /// Automatic promotions that apply to the current cart
    /// (`GET /promotions/preview`). Display only.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn promotion_preview(
        &self,
        token: &AccessToken,
    ) -> Result<PromotionPreview, ApiError> {
        self.get("promotions/preview", &[], Some(token)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Json as JsonBody;
    use axum::routing::post;
    use axum::{Json, Router};
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use super::*;
    use crate::api::testing::spawn_backend;

    #[tokio::test]
    async fn test_validate_coupon() {
        let router = Router::new().route(
            "/coupons/validate",
            post(|JsonBody(body): JsonBody<Value>| async move {
                assert_eq!(body["code"], "HELLO10");
                Json(json!({"valid": true, "code": "HELLO10", "discount": "2.50"}))
            }),
        );
        let api = spawn_backend(router).await;

        let validation = api
            .validate_coupon(
                &AccessToken::new("t"),
                &ValidateCouponRequest {
                    code: "HELLO10".to_string(),
                    subtotal: Decimal::new(2500, 2),
                },
            )
            .await
            .unwrap();

        assert!(validation.valid);
        assert_eq!(validation.discount, Decimal::new(250, 2));
    }
}

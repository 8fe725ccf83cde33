//! Customer orders and payments.

use papergift_core::{AccessToken, OrderId};
use reqwest::Method;
use tracing::instrument;

use super::client::NoBody;
use super::types::{Order, Paginated, PaymentMethod, PaymentResult, PlaceOrderRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// The customer's orders, newest first (`GET /orders`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn list_orders(
        &self,
        token: &AccessToken,
        page: u32,
    ) -> Result<Paginated<Order>, ApiError> {
        self.get("orders", &[("page", page.to_string())], Some(token))
            .await
    }

    /// A single order (`GET /orders/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist or belongs to
    /// someone else.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn get_order(&self, token: &AccessToken, id: OrderId) -> Result<Order, ApiError> {
        self.get(&format!("orders/{id}"), &[], Some(token)).await
    }

    /// Place an order from the current cart (`POST /orders`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's message (empty cart,
    /// invalid coupon, stock changed), or an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn place_order(
        &self,
        token: &AccessToken,
        request: &PlaceOrderRequest,
    ) -> Result<Order, ApiError> {
        self.send(Method::POST, "orders", Some(request), Some(token))
            .await
    }

    /// Ask the backend to process payment for an order
    /// (`POST /payments/{orderId}/process`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn process_payment(
        &self,
        token: &AccessToken,
        order_id: OrderId,
    ) -> Result<PaymentResult, ApiError> {
        self.send::<NoBody, _>(
            Method::POST,
            &format!("payments/{order_id}/process"),
            None,
            Some(token),
        )
        .await
    }

    /// Payment methods offered at checkout (`GET /payment-methods`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn list_payment_methods(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<PaymentMethod>, ApiError> {
        self.get("payment-methods", &[], Some(token)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::{Json as JsonBody, Path};
    use axum::routing::post;
    use axum::{Json, Router};
    use papergift_core::{AddressId, PaymentMethodId};
    use serde_json::{Value, json};

    use super::*;
    use crate::api::testing::spawn_backend;

    #[tokio::test]
    async fn test_place_order_body() {
        let router = Router::new().route(
            "/orders",
            post(|JsonBody(body): JsonBody<Value>| async move {
                assert_eq!(
                    body,
                    json!({"addressId": 2, "paymentMethodId": 1, "couponCode": "HELLO10"})
                );
                Json(json!({"id": 77, "orderNumber": "PG-0077", "total": "18.00"}))
            }),
        );
        let api = spawn_backend(router).await;

        let order = api
            .place_order(
                &AccessToken::new("t"),
                &PlaceOrderRequest {
                    address_id: AddressId::new(2),
                    payment_method_id: PaymentMethodId::new(1),
                    coupon_code: Some("HELLO10".to_string()),
                    note: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(order.id, OrderId::new(77));
        assert_eq!(order.reference(), "PG-0077");
    }

    #[tokio::test]
    async fn test_process_payment_without_body() {
        let router = Router::new().route(
            "/payments/{id}/process",
            post(|Path(id): Path<i64>| async move {
                Json(json!({"status": "SUCCESS", "transactionId": format!("tx-{id}")}))
            }),
        );
        let api = spawn_backend(router).await;

        let result = api
            .process_payment(&AccessToken::new("t"), OrderId::new(5))
            .await
            .unwrap();
        assert!(result.is_success());
        assert_eq!(result.transaction_id.as_deref(), Some("tx-5"));
    }
}

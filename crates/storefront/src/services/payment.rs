//! Payment processing with simulated gateway latency.
//!
//! Orders that are already paid, or paid on delivery, settle immediately.
//! Everything else waits a random delay from the configured range before the
//! backend's process endpoint is called.

use std::time::Duration;

use papergift_core::{AccessToken, PaymentStatus};
use rand::Rng;
use tracing::instrument;

use crate::api::{ApiClient, Order};
use crate::config::PaymentConfig;

/// Failure text used when the backend gives no reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Payment failed. Please try again.";

/// Result of processing one order's payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Payment completed (or nothing to collect online).
    Success {
        /// Gateway transaction reference, when one was issued.
        transaction_id: Option<String>,
    },
    /// Payment did not complete.
    Failed {
        /// Message to show the customer.
        reason: String,
    },
}

impl PaymentOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Runs payments against the backend.
#[derive(Clone)]
pub struct PaymentProcessor {
    api: ApiClient,
    config: PaymentConfig,
}

impl PaymentProcessor {
    #[must_use]
    pub const fn new(api: ApiClient, config: PaymentConfig) -> Self {
        Self { api, config }
    }

    /// Whether the order needs no online payment.
    #[must_use]
    pub fn settles_immediately(order: &Order) -> bool {
        order.payment_status == PaymentStatus::Paid || order.is_cash_on_delivery()
    }

    /// Draw the simulated gateway latency.
    #[must_use]
    pub fn simulated_delay(&self) -> Duration {
        let min = duration_millis(self.config.min_delay);
        let max = duration_millis(self.config.max_delay).max(min);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Process payment for `order`.
    ///
    /// Never fails: transport and backend errors become
    /// [`PaymentOutcome::Failed`] with the backend's message when it sent one.
    #[instrument(skip(self, token, order), fields(order_id = %order.id))]
    pub async fn process(&self, token: &AccessToken, order: &Order) -> PaymentOutcome {
        if Self::settles_immediately(order) {
            tracing::info!(
                payment_status = ?order.payment_status,
                cod = order.is_cash_on_delivery(),
                "Payment settles without gateway"
            );
            return PaymentOutcome::Success {
                transaction_id: None,
            };
        }

        let delay = self.simulated_delay();
        tracing::debug!(delay_ms = delay.as_millis(), "Simulating gateway latency");
        tokio::time::sleep(delay).await;

        match self.api.process_payment(token, order.id).await {
            Ok(result) if result.is_success() => {
                tracing::info!(transaction_id = ?result.transaction_id, "Payment succeeded");
                PaymentOutcome::Success {
                    transaction_id: result.transaction_id,
                }
            }
            Ok(result) => {
                tracing::warn!(status = %result.status, "Payment declined");
                PaymentOutcome::Failed {
                    reason: result
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Payment request failed");
                PaymentOutcome::Failed {
                    reason: e
                        .backend_message()
                        .map_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string(), ToString::to_string),
                }
            }
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Instant;

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use papergift_core::OrderId;
    use serde_json::json;

    use super::*;
    use crate::api::testing::{spawn_backend, unreachable_backend};

    fn no_delay() -> PaymentConfig {
        PaymentConfig {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    fn order(json: serde_json::Value) -> Order {
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn test_cod_order_succeeds_without_waiting() {
        let processor = PaymentProcessor::new(unreachable_backend(), PaymentConfig::default());
        let cod = order(json!({"id": 1, "paymentMethod": {"id": 1, "code": "COD", "name": "Cash"}}));

        let started = Instant::now();
        let outcome = processor.process(&AccessToken::new("t"), &cod).await;

        assert!(outcome.is_success());
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_paid_order_succeeds_without_waiting() {
        let processor = PaymentProcessor::new(unreachable_backend(), PaymentConfig::default());
        let paid = order(json!({"id": 2, "paymentStatus": "PAID"}));

        let started = Instant::now();
        let outcome = processor.process(&AccessToken::new("t"), &paid).await;

        assert_eq!(
            outcome,
            PaymentOutcome::Success {
                transaction_id: None
            }
        );
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_declined_uses_backend_message() {
        let router = Router::new().route(
            "/payments/{id}/process",
            post(|| async { Json(json!({"status": "DECLINED", "message": "Card declined"})) }),
        );
        let processor = PaymentProcessor::new(spawn_backend(router).await, no_delay());

        let outcome = processor
            .process(&AccessToken::new("t"), &order(json!({"id": 3})))
            .await;

        assert_eq!(
            outcome,
            PaymentOutcome::Failed {
                reason: "Card declined".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_uses_default_message() {
        let router = Router::new().route(
            "/payments/{id}/process",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "") }),
        );
        let processor = PaymentProcessor::new(spawn_backend(router).await, no_delay());

        let outcome = processor
            .process(&AccessToken::new("t"), &order(json!({"id": 4})))
            .await;

        assert_eq!(
            outcome,
            PaymentOutcome::Failed {
                reason: DEFAULT_FAILURE_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_gateway_error_page_uses_default_message() {
        let router = Router::new().route(
            "/payments/{id}/process",
            post(|| async {
                (
                    StatusCode::BAD_GATEWAY,
                    "<html><body><h1>502 Bad Gateway</h1></body></html>",
                )
            }),
        );
        let processor = PaymentProcessor::new(spawn_backend(router).await, no_delay());

        let outcome = processor
            .process(&AccessToken::new("t"), &order(json!({"id": 6})))
            .await;

        assert_eq!(
            outcome,
            PaymentOutcome::Failed {
                reason: DEFAULT_FAILURE_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_success_statuses() {
        let router = Router::new().route(
            "/payments/{id}/process",
            post(|| async { Json(json!({"status": "completed", "transactionId": "tx-9"})) }),
        );
        let processor = PaymentProcessor::new(spawn_backend(router).await, no_delay());

        let outcome = processor
            .process(&AccessToken::new("t"), &order(json!({"id": OrderId::new(5)})))
            .await;

        assert_eq!(
            outcome,
            PaymentOutcome::Success {
                transaction_id: Some("tx-9".to_string())
            }
        );
    }

    #[test]
    fn test_simulated_delay_within_range() {
        let processor = PaymentProcessor::new(unreachable_backend(), PaymentConfig::default());
        for _ in 0..50 {
            let delay = processor.simulated_delay();
            assert!(delay >= Duration::from_millis(2000));
            assert!(delay <= Duration::from_millis(3000));
        }
    }
}

//! In-app notifications.

use papergift_core::{AccessToken, NotificationId};
use reqwest::Method;
use tracing::instrument;

use super::client::NoBody;
use super::types::Notification;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// The user's notifications, newest first (`GET /notifications`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn list_notifications(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<Notification>, ApiError> {
        self.get("notifications", &[], Some(token)).await
    }

    /// Mark one notification read (`PATCH /notifications/{id}/read`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(notification_id = %id))]
    pub async fn mark_notification_read(
        &self,
        token: &AccessToken,
        id: NotificationId,
    ) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(
            Method::PATCH,
            &format!("notifications/{id}/read"),
            None,
            Some(token),
        )
        .await
    }

    /// Mark every notification read (`PATCH /notifications/read-all`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn mark_all_notifications_read(&self, token: &AccessToken) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(Method::PATCH, "notifications/read-all", None, Some(token))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::routing::{get, patch};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::api::testing::spawn_backend;

    #[tokio::test]
    async fn test_list_and_mark_read() {
        let router = Router::new()
            .route(
                "/notifications",
                get(|| async {
                    Json(json!([
                        {"id": 1, "title": "Order shipped", "link": "/orders/42"},
                        {"id": 2, "title": "Welcome", "isRead": true}
                    ]))
                }),
            )
            .route("/notifications/{id}/read", patch(|| async { Json(json!({})) }));
        let api = spawn_backend(router).await;
        let token = AccessToken::new("t");

        let notifications = api.list_notifications(&token).await.unwrap();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].link.as_deref(), Some("/orders/42"));

        api.mark_notification_read(&token, NotificationId::new(1))
            .await
            .unwrap();
    }
}

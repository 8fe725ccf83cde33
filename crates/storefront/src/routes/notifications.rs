//! Notification inbox.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use papergift_core::NotificationId;
use tower_sessions::Session;
use tracing::instrument;

use super::context::{Loader, PageContext, flash_outcome, htmx_fragment, is_htmx, short_date};
use crate::api::Notification;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::notifications::notification_link;
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

/// HTMX event raised when notifications are read.
pub const NOTIFICATIONS_UPDATED: &str = "notifications-updated";

/// Notification display data for templates.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    /// Front-end target, if the notification links anywhere.
    pub link: Option<String>,
    pub is_read: bool,
    pub date: String,
}

impl From<&Notification> for NotificationView {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            title: notification.title.clone(),
            message: notification.message.clone(),
            link: notification
                .link
                .as_deref()
                .filter(|l| !l.is_empty())
                .map(notification_link),
            is_read: notification.is_read,
            date: short_date(notification.created_at),
        }
    }
}

/// Notifications page template.
#[derive(Template, WebTemplate)]
#[template(path = "notifications/index.html")]
pub struct NotificationsTemplate {
    pub ctx: PageContext,
    pub notifications: Vec<NotificationView>,
    pub unread: usize,
}

/// Unread badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/notification_count.html")]
pub struct NotificationCountTemplate {
    pub count: usize,
}

/// Display the inbox.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<NotificationsTemplate, AppError> {
    let mut loader = Loader::new();
    let notifications = loader.load(
        "your notifications",
        state.api().list_notifications(&user.token).await,
    )?;

    let notifications: Vec<NotificationView> =
        notifications.iter().map(NotificationView::from).collect();
    let unread = notifications.iter().filter(|n| !n.is_read).count();

    Ok(NotificationsTemplate {
        notifications,
        unread,
        ctx: PageContext::new(&state, &session, Some(&user), "Notifications", loader.into_toasts())
            .await,
    })
}

/// Mark one notification read and follow its link.
///
/// The link is looked up from the user's own notifications rather than taken
/// from the form, so this can never redirect off-site.
#[instrument(skip(state, session, user))]
pub async fn open(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<NotificationId>,
) -> Result<Redirect, AppError> {
    if let Err(e) = state.api().mark_notification_read(&user.token, id).await {
        if e.is_unauthorized() {
            return Err(AppError::SessionExpired);
        }
        tracing::warn!(error = %e, notification_id = %id, "Failed to mark notification read");
        flash(&session, Toast::from_api_error(&e)).await;
    }

    let notifications = match state.api().list_notifications(&user.token).await {
        Ok(notifications) => notifications,
        Err(e) if e.is_unauthorized() => return Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to look up notification link");
            flash(&session, Toast::from_api_error(&e)).await;
            Vec::new()
        }
    };

    let target = notifications
        .into_iter()
        .find(|n| n.id == id)
        .and_then(|n| NotificationView::from(&n).link)
        .filter(|link| link.starts_with('/') && !link.starts_with("//"));

    Ok(Redirect::to(target.as_deref().unwrap_or("/notifications")))
}

/// Mark every notification read.
#[instrument(skip(state, session, user, headers))]
pub async fn read_all(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let result = state.api().mark_all_notifications_read(&user.token).await;

    if is_htmx(&headers) {
        return match result {
            Ok(()) => Ok(htmx_fragment(
                &[NOTIFICATIONS_UPDATED],
                None,
                NotificationCountTemplate { count: 0 },
            )),
            Err(e) => Err(e.into()),
        };
    }

    flash_outcome(&session, result, "All notifications marked as read").await?;
    Ok(Redirect::to("/notifications").into_response())
}

/// Unread badge (HTMX). Guests and failed loads show no badge.
#[instrument(skip(state, user))]
pub async fn unread_count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> NotificationCountTemplate {
    let count = match &user {
        Some(user) => state
            .api()
            .list_notifications(&user.token)
            .await
            .map(|all| all.iter().filter(|n| !n.is_read).count())
            .unwrap_or_default(),
        None => 0,
    };
    NotificationCountTemplate { count }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_notification_view_maps_order_link() {
        let notification: Notification = serde_json::from_value(json!({
            "id": 3,
            "title": "Order shipped",
            "message": "PG-0042 is on its way",
            "link": "/orders/42",
            "isRead": false
        }))
        .unwrap();

        let view = NotificationView::from(&notification);
        assert_eq!(view.link.as_deref(), Some("/orders?orderId=42"));
        assert!(!view.is_read);
        assert_eq!(view.date, "");
    }

    #[test]
    fn test_empty_link_is_dropped() {
        let notification: Notification =
            serde_json::from_value(json!({"id": 4, "title": "Hi", "link": ""})).unwrap();
        assert_eq!(NotificationView::from(&notification).link, None);
    }
}

//! Toast notifications.
//!
//! Loader failures render as toasts on the same page. Toasts raised by a
//! POST action are flashed into the session and drained by the next rendered
//! page. HTMX fragments carry them in an `HX-Trigger` header instead.

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::api::ApiError;
use crate::models::session_keys;

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastLevel {
    /// CSS modifier class.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "toast-success",
            Self::Info => "toast-info",
            Self::Warning => "toast-warning",
            Self::Error => "toast-error",
        }
    }

    /// Error toasts carry a manual refresh link.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// A message shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }

    /// Error toast for a failed backend call, using the backend's message for
    /// validation failures.
    #[must_use]
    pub fn from_api_error(err: &ApiError) -> Self {
        Self::error(err.user_message())
    }

    /// Error toast for a failed page loader.
    ///
    /// Logs the failure; the caller keeps that part of the page empty.
    #[must_use]
    pub fn loader_failure(what: &str, err: &ApiError) -> Self {
        tracing::warn!(error = %err, loader = what, "Page loader failed");
        let detail = match err {
            ApiError::Status { status, .. } if status.is_client_error() => err.user_message(),
            ApiError::Unauthorized(_) => err.user_message(),
            _ => "Please refresh to try again.".to_string(),
        };
        Self::error(format!("Could not load {what}. {detail}"))
    }
}

/// `HX-Trigger` header value raising `events` (e.g. `cart-updated`) and,
/// when given, a `toast` event carrying the toast.
#[must_use]
pub fn hx_trigger(events: &[&str], toast: Option<&Toast>) -> Option<HeaderValue> {
    let mut payload = serde_json::Map::new();
    for event in events {
        payload.insert((*event).to_string(), serde_json::Value::Bool(true));
    }
    if let Some(toast) = toast {
        payload.insert("toast".to_string(), serde_json::to_value(toast).ok()?);
    }
    if payload.is_empty() {
        return None;
    }
    HeaderValue::from_str(&serde_json::Value::Object(payload).to_string()).ok()
}

/// Queue a toast for the next rendered page.
///
/// Failures to write the session are logged; a lost toast is not worth
/// failing the action for.
pub async fn flash(session: &Session, toast: Toast) {
    let mut pending: Vec<Toast> = session
        .get(session_keys::TOASTS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    pending.push(toast);

    if let Err(e) = session.insert(session_keys::TOASTS, pending).await {
        tracing::warn!(error = %e, "Failed to flash toast");
    }
}

/// Drain flashed toasts.
pub async fn take_flashed(session: &Session) -> Vec<Toast> {
    match session.remove::<Vec<Toast>>(session_keys::TOASTS).await {
        Ok(toasts) => toasts.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flashed toasts");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flash_then_take_drains() {
        let session = session();
        flash(&session, Toast::success("Added to cart")).await;
        flash(&session, Toast::warning("Only 2 left")).await;

        let toasts = take_flashed(&session).await;
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[1].level, ToastLevel::Warning);
        assert!(take_flashed(&session).await.is_empty());
    }

    #[test]
    fn test_loader_failure_message() {
        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: "upstream".to_string(),
        };
        let toast = Toast::loader_failure("payment methods", &err);
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(
            toast.message,
            "Could not load payment methods. Please refresh to try again."
        );
    }

    #[test]
    fn test_hx_trigger_payload() {
        let header = hx_trigger(&[], Some(&Toast::error("Coupon has expired"))).unwrap();
        assert_eq!(
            header.to_str().unwrap(),
            r#"{"toast":{"level":"error","message":"Coupon has expired"}}"#
        );

        let header = hx_trigger(&["cart-updated"], Some(&Toast::success("Added"))).unwrap();
        let value: serde_json::Value = serde_json::from_str(header.to_str().unwrap()).unwrap();
        assert_eq!(value["cart-updated"], true);
        assert_eq!(value["toast"]["level"], "success");

        assert!(hx_trigger(&[], None).is_none());
    }
}

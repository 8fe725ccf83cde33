//! Shared pieces for page handlers: the layout context every full page
//! renders with, the loader that turns failed backend calls into toasts, and
//! helpers for form actions.

use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Redirect, Response};
use papergift_core::Price;
use rust_decimal::Decimal;
use tower_sessions::Session;

use crate::api::ApiError;
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::services::reconcile::safe_next;
use crate::services::toast::{Toast, flash, hx_trigger, take_flashed};
use crate::state::AppState;

/// Logged-in user as shown in the header.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            name: user.name.clone(),
            is_admin: user.is_admin(),
        }
    }
}

/// Footer link to a static page.
#[derive(Debug, Clone)]
pub struct FooterLink {
    pub slug: String,
    pub title: String,
}

/// Layout data for `base.html`.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub title: String,
    pub user: Option<UserView>,
    pub toasts: Vec<Toast>,
    pub footer: Vec<FooterLink>,
}

impl PageContext {
    /// Build the layout context, draining toasts flashed by earlier actions
    /// ahead of the toasts raised while loading this page.
    pub async fn new(
        state: &AppState,
        session: &Session,
        user: Option<&CurrentUser>,
        title: impl Into<String>,
        loader_toasts: Vec<Toast>,
    ) -> Self {
        let mut toasts = take_flashed(session).await;
        toasts.extend(loader_toasts);

        Self {
            title: title.into(),
            user: user.map(UserView::from),
            toasts,
            footer: state
                .content()
                .footer_pages()
                .into_iter()
                .map(|page| FooterLink {
                    slug: page.slug.clone(),
                    title: page.meta.title.clone(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }
}

/// Collects toasts for the parts of a page that failed to load.
///
/// A rejected access token aborts the whole page instead, so the
/// session-expiry middleware can log the visitor out.
#[derive(Debug, Default)]
pub struct Loader {
    toasts: Vec<Toast>,
}

impl Loader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwrap a loader result, falling back to the empty value on failure.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SessionExpired`] when the backend rejected the token.
    pub fn load<T: Default>(&mut self, what: &str, result: Result<T, ApiError>) -> Result<T, AppError> {
        Ok(self.load_optional(what, result)?.unwrap_or_default())
    }

    /// Like [`Loader::load`] for parts with no sensible empty value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SessionExpired`] when the backend rejected the token.
    pub fn load_optional<T>(
        &mut self,
        what: &str,
        result: Result<T, ApiError>,
    ) -> Result<Option<T>, AppError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_unauthorized() => Err(AppError::SessionExpired),
            Err(e) => {
                self.toasts.push(Toast::loader_failure(what, &e));
                Ok(None)
            }
        }
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    #[must_use]
    pub fn into_toasts(self) -> Vec<Toast> {
        self.toasts
    }
}

/// Flash the outcome of a form action.
///
/// Success flashes `success`; a backend failure flashes the backend's
/// message. Returns the value on success.
///
/// # Errors
///
/// Returns [`AppError::SessionExpired`] when the backend rejected the token.
pub async fn flash_outcome<T>(
    session: &Session,
    result: Result<T, ApiError>,
    success: &str,
) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => {
            flash(session, Toast::success(success)).await;
            Ok(Some(value))
        }
        Err(e) if e.is_unauthorized() => Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Action failed");
            flash(session, Toast::from_api_error(&e)).await;
            Ok(None)
        }
    }
}

/// Redirect back to the page that submitted the form (same-origin `Referer`),
/// else to `fallback`.
#[must_use]
pub fn redirect_back(headers: &HeaderMap, fallback: &str) -> Redirect {
    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|referer| url::Url::parse(referer).ok())
        .map(|url| match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        });

    Redirect::to(safe_next(target.as_deref()).unwrap_or(fallback))
}

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
}

/// HTMX fragment response raising `events` and an optional toast through
/// `HX-Trigger`.
pub fn htmx_fragment(events: &[&str], toast: Option<&Toast>, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    if let Some(value) = hx_trigger(events, toast) {
        response.headers_mut().insert("HX-Trigger", value);
    }
    response
}

/// Format a store-currency amount, e.g. `$4.50`.
#[must_use]
pub fn money(amount: Decimal) -> String {
    Price::store(amount).to_string()
}

/// Format an optional timestamp as a short date.
#[must_use]
pub fn short_date(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value.map_or_else(String::new, |v| v.format("%b %-d, %Y").to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{HeaderValue, StatusCode};
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::services::toast::ToastLevel;

    #[test]
    fn test_loader_collects_failures() {
        let mut loader = Loader::new();

        let products: Vec<u32> = loader
            .load(
                "products",
                Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: String::new(),
                }),
            )
            .unwrap();
        let categories = loader.load("categories", Ok(vec![1, 2])).unwrap();

        assert!(products.is_empty());
        assert_eq!(categories, vec![1, 2]);
        let toasts = loader.into_toasts();
        assert_eq!(toasts.len(), 1);
        assert!(toasts[0].message.starts_with("Could not load products."));
    }

    #[test]
    fn test_loader_aborts_on_rejected_token() {
        let mut loader = Loader::new();
        let result = loader.load::<Vec<u32>>("orders", Err(ApiError::Unauthorized(String::new())));
        assert!(matches!(result, Err(AppError::SessionExpired)));
    }

    #[tokio::test]
    async fn test_flash_outcome() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let ok = flash_outcome(&session, Ok(5), "Saved").await.unwrap();
        let failed = flash_outcome::<u32>(
            &session,
            Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                message: "Code already exists".to_string(),
            }),
            "Saved",
        )
        .await
        .unwrap();

        assert_eq!(ok, Some(5));
        assert_eq!(failed, None);
        let toasts = take_flashed(&session).await;
        assert_eq!(toasts[0].level, ToastLevel::Success);
        assert_eq!(toasts[1].message, "Code already exists");
    }

    #[test]
    fn test_redirect_back_uses_local_referer() {
        let location = |referer: Option<&'static str>| {
            let mut headers = HeaderMap::new();
            if let Some(referer) = referer {
                headers.insert(header::REFERER, HeaderValue::from_static(referer));
            }
            redirect_back(&headers, "/cart").into_response().headers()[header::LOCATION]
                .to_str()
                .unwrap()
                .to_string()
        };

        assert_eq!(
            location(Some("http://localhost:3000/products?page=2")),
            "/products?page=2"
        );
        assert_eq!(location(None), "/cart");
        assert_eq!(location(Some("not a url")), "/cart");
    }

    #[test]
    fn test_htmx_fragment_sets_trigger() {
        let toast = Toast::success("Added to cart");
        let response = htmx_fragment(&["cart-updated"], Some(&toast), "3");
        let trigger = response.headers()["HX-Trigger"].to_str().unwrap();
        assert!(trigger.contains("\"cart-updated\":true"));
        assert!(trigger.contains("Added to cart"));

        let response = htmx_fragment(&[], None, "3");
        assert!(!response.headers().contains_key("HX-Trigger"));
    }

    #[test]
    fn test_money() {
        assert_eq!(money(Decimal::new(450, 2)), "$4.50");
    }
}

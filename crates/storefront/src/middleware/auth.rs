//! Authentication extractors.
//!
//! - [`RequireAuth`]: any logged-in user, otherwise redirect to login.
//! - [`RequireAdmin`]: logged-in user with role `ADMIN`, otherwise redirect
//!   (guests) or 403 (customers).
//! - [`OptionalAuth`]: never rejects.
//!
//! Redirects carry the requested path as `next` so login can return there.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::{SessionExpired, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::toast::{Toast, flash};

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Error returned when authentication or authorization fails.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to the login page, returning to `next` afterwards.
    RedirectToLogin {
        /// Path and query of the rejected request.
        next: String,
    },
    /// Unauthorized response (missing session layer).
    Unauthorized,
    /// Logged in, but without the required role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to access this page",
            )
                .into_response(),
        }
    }
}

/// Login URL that returns to `next` after a successful login.
#[must_use]
pub fn login_url(next: &str) -> String {
    if next.is_empty() || next == "/" {
        "/auth/login".to_string()
    } else {
        format!("/auth/login?next={}", urlencoding::encode(next))
    }
}

async fn session_user(parts: &Parts) -> Result<CurrentUser, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| {
            // Nested routers see a stripped URI.
            let uri = parts
                .extensions
                .get::<OriginalUri>()
                .map_or(&parts.uri, |original| &original.0);
            let next = uri
                .path_and_query()
                .map_or_else(|| uri.path().to_string(), ToString::to_string);
            AuthRejection::RedirectToLogin { next }
        })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts).await?;

        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin denied");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the user in the session after login, cycling the session ID.
///
/// Also tags the Sentry scope with the user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;

    set_sentry_user(&user.id, Some(&user.email));

    Ok(())
}

/// Remove the user from the session (logout or rejected token).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    clear_sentry_user();
    Ok(())
}

/// Log the visitor out when a handler reports that the backend rejected
/// their access token.
///
/// Handlers signal this with [`AppError::SessionExpired`](crate::error::AppError),
/// which tags the response with the [`SessionExpired`] marker.
pub async fn session_expiry_middleware(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some() {
        if let Err(e) = clear_current_user(&session).await {
            tracing::error!(error = %e, "Failed to clear expired session user");
        }
        flash(
            &session,
            Toast::info("Your session has expired. Please log in again."),
        )
        .await;
    }

    response
}

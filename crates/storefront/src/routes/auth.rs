//! Authentication route handlers.
//!
//! Handles login, registration and logout against the backend's auth
//! endpoints. A successful login stores the user and access token in the
//! session, merges the guest cart and wishlist, and returns to `next`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::context::PageContext;
use crate::api::{ApiError, AuthResponse, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::reconcile::{post_login_redirect, reconcile_guest_state, safe_next};
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

/// Shortest password accepted at registration.
const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// `?next=` on the auth pages.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    fn safe(&self) -> String {
        safe_next(self.next.as_deref()).unwrap_or_default().to_string()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    /// Validated return path, empty for none.
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub next: String,
}

/// Auth page URL carrying `next` through a failed submission.
fn auth_page(path: &str, next: Option<&str>) -> String {
    match safe_next(next) {
        Some(next) => format!("{path}?next={}", urlencoding::encode(next)),
        None => path.to_string(),
    }
}

/// Complete a login: store the user, merge guest state, pick the redirect.
async fn sign_in(
    state: &AppState,
    session: &Session,
    auth: AuthResponse,
    next: Option<&str>,
) -> Result<Redirect, AppError> {
    let user = CurrentUser::from(auth);
    set_current_user(session, &user).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    let report = reconcile_guest_state(state.api(), session, &user).await;
    for toast in report.toasts {
        flash(session, toast).await;
    }
    flash(session, Toast::success(format!("Welcome, {}!", user.name))).await;

    Ok(Redirect::to(&post_login_redirect(&user, next)))
}

/// Flash a failed login/registration and return to the form.
async fn auth_failed(session: &Session, err: &ApiError, page: &str, next: Option<&str>) -> Redirect {
    tracing::warn!(error = %err, "Authentication failed");
    let toast = match err {
        // The backend answers bad credentials with 401; that is not an
        // expired session here.
        ApiError::Unauthorized(message) if !message.is_empty() => Toast::error(message.clone()),
        ApiError::Unauthorized(_) => Toast::error("Invalid email or password."),
        _ => Toast::from_api_error(err),
    };
    flash(session, toast).await;
    Redirect::to(&auth_page(page, next))
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page. Logged-in visitors go straight to `next`.
#[instrument(skip(state, session, user))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> Result<Response, AppError> {
    if let Some(user) = &user {
        return Ok(Redirect::to(&post_login_redirect(user, query.next.as_deref())).into_response());
    }

    Ok(LoginTemplate {
        next: query.safe(),
        ctx: PageContext::new(&state, &session, None, "Log in", Vec::new()).await,
    }
    .into_response())
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let request = LoginRequest {
        email: form.email.trim().to_string(),
        password: form.password,
    };

    match state.api().login(&request).await {
        Ok(auth) => sign_in(&state, &session, auth, form.next.as_deref()).await,
        Err(e) => Ok(auth_failed(&session, &e, "/auth/login", form.next.as_deref()).await),
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
#[instrument(skip(state, session))]
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
) -> RegisterTemplate {
    RegisterTemplate {
        next: query.safe(),
        ctx: PageContext::new(&state, &session, None, "Create an account", Vec::new()).await,
    }
}

/// Check the registration form before it reaches the backend.
fn validate_registration(form: &RegisterForm) -> Result<(), &'static str> {
    if form.name.trim().is_empty() {
        return Err("Please enter your name.");
    }
    if form.password != form.password_confirm {
        return Err("Passwords do not match.");
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 8 characters.");
    }
    Ok(())
}

/// Handle registration form submission. The new account is logged in
/// directly.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    if let Err(message) = validate_registration(&form) {
        flash(&session, Toast::error(message)).await;
        return Ok(Redirect::to(&auth_page("/auth/register", form.next.as_deref())));
    }

    let request = RegisterRequest {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password,
        phone: form.phone.filter(|p| !p.trim().is_empty()),
    };

    match state.api().register(&request).await {
        Ok(auth) => sign_in(&state, &session, auth, form.next.as_deref()).await,
        Err(e) => Ok(auth_failed(&session, &e, "/auth/register", form.next.as_deref()).await),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out: drop the user and token from the session.
///
/// The guest cart starts empty again; the server-side cart stays with the
/// account.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    flash(&session, Toast::info("You have been logged out.")).await;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
            phone: None,
            next: None,
        }
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration(&form("longenough", "longenough")).is_ok());
        assert_eq!(
            validate_registration(&form("longenough", "different")),
            Err("Passwords do not match.")
        );
        assert_eq!(
            validate_registration(&form("short", "short")),
            Err("Password must be at least 8 characters.")
        );
    }

    #[test]
    fn test_auth_page_keeps_safe_next() {
        assert_eq!(
            auth_page("/auth/login", Some("/checkout")),
            "/auth/login?next=%2Fcheckout"
        );
        assert_eq!(
            auth_page("/auth/login", Some("https://evil.example")),
            "/auth/login"
        );
    }
}

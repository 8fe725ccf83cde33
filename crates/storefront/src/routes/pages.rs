//! Static content page route handlers.
//!
//! Serves the markdown pages (about, faq, shipping, terms, privacy) loaded
//! at startup.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use chrono::NaiveDate;
use tower_sessions::Session;
use tracing::instrument;

use super::context::PageContext;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub ctx: PageContext,
    pub description: String,
    pub updated_at: Option<NaiveDate>,
    pub content_html: String,
}

/// Serve a content page by slug.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<ContentPageTemplate, AppError> {
    let page = state
        .content()
        .get_page(&slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        description: page.meta.description.clone().unwrap_or_default(),
        updated_at: page.meta.updated_at,
        content_html: page.content_html.clone(),
        ctx: PageContext::new(&state, &session, user.as_ref(), &page.meta.title, Vec::new()).await,
    })
}

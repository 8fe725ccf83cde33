//! Papergift storefront library.
//!
//! Server-rendered storefront and back office for the Papergift gift shop.
//! All commerce data lives behind the backend REST API; this crate renders
//! pages with Askama, enhances them with HTMX, and keeps per-visitor state
//! (login, guest cart and wishlist, toasts) in the session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod components;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::path::Path;

use axum::{Router, http::Request, middleware::from_fn};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionManagerLayer;
use tower_sessions::SessionStore;

use crate::state::AppState;

/// Build the full application router with its middleware stack.
///
/// `static_dir` is served under `/static`.
pub fn build_app<S>(state: AppState, session_layer: SessionManagerLayer<S>, static_dir: &Path) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .merge(routes::routes())
        .nest(
            "/auth",
            routes::auth_routes().layer(middleware::auth_rate_limiter()),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::session_expiry_middleware))
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

//! Session middleware configuration.
//!
//! The session is the visitor's device-scoped store: it holds the logged-in
//! user, the guest cart and wishlist, and flashed toasts. Production uses the
//! `PostgreSQL` store; tests plug in `MemoryStore`.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pg_session";

/// Session expiry time in seconds (30 days, so guest carts survive).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the `PostgreSQL` session store.
///
/// The `tower_sessions.session` table is created by `papergift-cli migrate`
/// (or on startup).
#[must_use]
pub fn postgres_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
}

/// Wrap a session store in the session layer with storefront cookie settings.
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &StorefrontConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

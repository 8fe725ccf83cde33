//! Storefront `PostgreSQL` access.
//!
//! The backend owns all commerce data. The storefront database holds only the
//! `tower_sessions.session` table, i.e. every visitor's session: logged-in
//! user, guest cart and wishlist, and flashed toasts.
//!
//! The table is created by:
//! ```bash
//! cargo run -p papergift-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::middleware::postgres_store;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Pool that connects on first use. Tests use it to build state without a
/// running database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn create_lazy_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy(database_url.expose_secret())
}

/// Create the session schema and table if missing.
///
/// # Errors
///
/// Returns `sqlx::Error` if the migration fails.
pub async fn migrate_sessions(pool: &PgPool) -> Result<(), sqlx::Error> {
    postgres_store(pool).migrate().await
}

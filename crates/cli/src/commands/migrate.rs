//! Session table migration.
//!
//! # Usage
//!
//! ```bash
//! papergift-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string for the storefront session store

use papergift_storefront::db;
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur during migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or migration error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Database URL from `STOREFRONT_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url(lookup: impl Fn(&str) -> Option<String>) -> Result<SecretString, MigrationError> {
    lookup("STOREFRONT_DATABASE_URL")
        .or_else(|| lookup("DATABASE_URL"))
        .filter(|url| !url.trim().is_empty())
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Create the `tower_sessions.session` table if it does not exist.
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects the
/// migration.
pub async fn sessions() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let url = database_url(|key| std::env::var(key).ok())?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Creating session table...");
    db::migrate_sessions(&pool).await?;

    tracing::info!("Session table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_database_url_fallback() {
        let url = database_url(|key| {
            (key == "DATABASE_URL").then(|| "postgres://localhost/papergift".to_string())
        });
        assert!(matches!(url, Ok(u) if u.expose_secret() == "postgres://localhost/papergift"));

        let missing = database_url(|_| None);
        assert!(matches!(
            missing,
            Err(MigrationError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
        ));
    }
}

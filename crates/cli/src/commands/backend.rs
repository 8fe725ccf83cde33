//! Backend connectivity check.
//!
//! Loads the storefront configuration the same way the server does, so a
//! passing check means the server would reach the backend too.

use papergift_storefront::api::{ApiClient, ApiError};
use papergift_storefront::config::{ConfigError, StorefrontConfig};
use thiserror::Error;

/// Errors from the backend check.
#[derive(Debug, Error)]
pub enum BackendCheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend unreachable: {0}")]
    Api(#[from] ApiError),
}

/// `GET /health` on the configured backend.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the backend does not
/// answer with a success status.
pub async fn check() -> Result<(), BackendCheckError> {
    let config = StorefrontConfig::from_env()?;
    let client = ApiClient::new(&config.backend)?;

    tracing::info!(url = %config.backend.base_url, "Checking backend health...");
    client.health().await?;

    tracing::info!("Backend is healthy");
    Ok(())
}

//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::content::ContentStore;
use crate::services::PaymentProcessor;

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("backend client: {0}")]
    Api(#[from] ApiError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    api: ApiClient,
    payments: PaymentProcessor,
    content: ContentStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool (session store)
    /// * `content` - Static pages loaded at startup
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(
        config: StorefrontConfig,
        pool: PgPool,
        content: ContentStore,
    ) -> Result<Self, AppStateError> {
        let api = ApiClient::new(&config.backend)?;
        Ok(Self::with_api(config, pool, content, api))
    }

    /// Create the state around an existing backend client.
    #[must_use]
    pub fn with_api(
        config: StorefrontConfig,
        pool: PgPool,
        content: ContentStore,
        api: ApiClient,
    ) -> Self {
        let payments = PaymentProcessor::new(api.clone(), config.payment);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                api,
                payments,
                content,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the payment processor.
    #[must_use]
    pub fn payments(&self) -> &PaymentProcessor {
        &self.inner.payments
    }

    /// Get a reference to the static page store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }
}

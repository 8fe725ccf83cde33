//! Backend REST client core: request execution and error mapping.
//!
//! Resource methods live in sibling modules as additional `impl ApiClient`
//! blocks and go through the helpers defined here.

use std::sync::Arc;

use moka::future::Cache;
use papergift_core::AccessToken;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::cache::CacheValue;
use super::{ApiError, error_from_status};
use crate::config::BackendConfig;

/// Maximum capacity of the catalog cache.
const CACHE_CAPACITY: u64 = 1000;

/// Client for the backend REST API.
///
/// Cheaply cloneable; all clones share the connection pool and the catalog
/// cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    service_token: Option<SecretString>,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialization failure).
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("papergift-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                service_token: config.api_token.clone(),
                cache,
            }),
        })
    }

    /// Catalog cache shared by all clones.
    pub(super) fn cache(&self) -> &Cache<String, CacheValue> {
        &self.inner.cache
    }

    /// Drop every cached catalog entry (after admin product changes).
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    /// Resolve a path relative to the backend base URL, appending `query`
    /// pairs with empty values skipped.
    pub(super) fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        let pairs: Vec<_> = query.iter().filter(|(_, v)| !v.is_empty()).collect();
        if !pairs.is_empty() {
            let mut serializer = url.query_pairs_mut();
            for (key, value) in pairs {
                serializer.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&AccessToken>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match (token, &self.inner.service_token) {
            (Some(token), _) => builder.bearer_auth(token.expose()),
            (None, Some(service)) => builder.bearer_auth(service.expose_secret()),
            (None, None) => builder,
        }
    }

    /// Send a request and return the response body of a success status.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        let retry_after = (status == StatusCode::TOO_MANY_REQUESTS)
            .then(|| {
                response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
            })
            .flatten();

        let body = response.text().await?;

        if !status.is_success() {
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned server error"
                );
            } else {
                tracing::debug!(status = %status, "Backend rejected request");
            }
            return Err(error_from_status(status, &body, retry_after));
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// `GET` a JSON resource.
    #[instrument(skip(self, query, token), fields(path = %path))]
    pub(super) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, query)?;
        let body = self.execute(self.request(Method::GET, url, token)).await?;
        Self::decode(&body)
    }

    /// Send a JSON body (or none) and decode a JSON response.
    #[instrument(skip(self, body, token), fields(method = %method, path = %path))]
    pub(super) async fn send<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, &[])?;
        let mut request = self.request(method, url, token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let text = self.execute(request).await?;
        Self::decode(&text)
    }

    /// Send a JSON body (or none) and ignore the response body.
    #[instrument(skip(self, body, token), fields(method = %method, path = %path))]
    pub(super) async fn send_unit<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&AccessToken>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(path, &[])?;
        let mut request = self.request(method, url, token);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await.map(|_| ())
    }

    /// Check backend liveness (`GET /health`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), ApiError> {
        let url = self.endpoint("health", &[])?;
        self.execute(self.request(Method::GET, url, None))
            .await
            .map(|_| ())
    }
}

/// Placeholder body type for requests without one.
pub(super) type NoBody = ();

//! Integration tests for the Papergift storefront.
//!
//! These run against a live server and backend, so they are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the storefront (and the backend it points at)
//! cargo run -p papergift-storefront
//!
//! # Run the smoke tests
//! PAPERGIFT_TEST_URL=http://127.0.0.1:3000 cargo test -p papergift-integration-tests -- --ignored
//! ```
//!
//! Admin checks also need `PAPERGIFT_TEST_ADMIN_EMAIL` and
//! `PAPERGIFT_TEST_ADMIN_PASSWORD`.

use reqwest::{Client, redirect::Policy};

/// Default storefront URL when `PAPERGIFT_TEST_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Shared state for one test: a cookie-keeping client without redirects.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a client for the configured storefront.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("PAPERGIFT_TEST_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            // Rate limiting keys on the proxy IP headers.
            .default_headers(
                [(
                    reqwest::header::HeaderName::from_static("x-forwarded-for"),
                    reqwest::header::HeaderValue::from_static("127.0.0.1"),
                )]
                .into_iter()
                .collect(),
            )
            .build()
            .expect("build test client");

        Self { client, base_url }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Admin credentials from the environment, if configured.
    #[must_use]
    pub fn admin_credentials() -> Option<(String, String)> {
        Some((
            std::env::var("PAPERGIFT_TEST_ADMIN_EMAIL").ok()?,
            std::env::var("PAPERGIFT_TEST_ADMIN_PASSWORD").ok()?,
        ))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

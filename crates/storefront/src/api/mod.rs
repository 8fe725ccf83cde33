//! Backend REST API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth for everything: pricing, inventory,
//!   payments, coupon validation, authentication. No local sync, direct calls.
//! - JSON over HTTP with `reqwest`; camelCase field names on the wire.
//! - Customer calls carry the session's bearer token; anonymous calls carry the
//!   optional service token.
//! - Catalog reads (products, categories) are cached in-memory via `moka`.
//!
//! # Resource modules
//!
//! Each resource adds an `impl ApiClient` block in its own file:
//! [`auth`], [`catalog`], [`cart`], [`wishlist`], [`orders`] (orders, payments),
//! [`marketing`] (coupons, promotions), [`reviews`], [`account`] (profile,
//! addresses), [`notifications`] and [`admin`].
//!
//! # Example
//!
//! ```rust,ignore
//! use papergift_storefront::api::{ApiClient, ProductQuery};
//!
//! let client = ApiClient::new(&config.backend)?;
//! let page = client.list_products(&ProductQuery::default()).await?;
//! let cart = client.get_cart(&user.token).await?;
//! ```

pub mod account;
pub mod admin;
pub mod auth;
mod cache;
pub mod cart;
pub mod catalog;
mod client;
pub mod marketing;
pub mod notifications;
pub mod orders;
pub mod reviews;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;
pub mod wishlist;

pub use catalog::ProductQuery;
pub use client::ApiClient;
pub use types::*;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Message extracted from the error body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Access token missing, expired or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Endpoint path could not be resolved against the base URL.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Text suitable for showing to the visitor.
    ///
    /// Validation failures (4xx) carry the backend's own message, which is
    /// shown verbatim. Transport and server failures get a generic text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, message } if status.is_client_error() && !message.is_empty() => {
                message.clone()
            }
            Self::NotFound(_) => "The requested item could not be found.".to_string(),
            Self::Unauthorized(_) => "Your session has expired. Please log in again.".to_string(),
            Self::RateLimited(_) => "Too many requests. Please wait a moment.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// The backend's message, when the failure came with one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::NotFound(message) | Self::Unauthorized(message)
                if !message.is_empty() =>
            {
                Some(message)
            }
            _ => None,
        }
    }

    /// Whether the session's access token was rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Error body returned by the backend.
///
/// `message` is either a single string or a list of validation messages.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<ErrorMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

/// Extract the human-readable message from an error body.
///
/// Falls back to the `error` field. Bodies that are not the backend's JSON
/// error shape (proxy error pages, empty bodies) carry no message.
fn parse_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok()?;
    match parsed.message {
        Some(ErrorMessage::One(message)) if !message.is_empty() => return Some(message),
        Some(ErrorMessage::Many(messages)) if !messages.is_empty() => {
            return Some(messages.join("; "));
        }
        _ => {}
    }
    parsed.error.filter(|error| !error.is_empty())
}

/// Build an `ApiError` from a non-success response.
fn error_from_status(status: StatusCode, body: &str, retry_after: Option<u64>) -> ApiError {
    let message = parse_error_message(body).unwrap_or_else(|| {
        if !body.is_empty() {
            let raw: String = body.chars().take(200).collect();
            tracing::warn!(%status, body = %raw, "Backend error body without a message");
        }
        String::new()
    });
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(retry_after.unwrap_or(1)),
        _ => ApiError::Status { status, message },
    }
}

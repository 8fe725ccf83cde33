//! Authentication: login, registration, profile.

use papergift_core::AccessToken;
use reqwest::Method;
use tracing::instrument;

use super::types::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest, User};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Exchange credentials for an access token (`POST /auth/login`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or an error if
    /// the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.send(Method::POST, "auth/login", Some(request), None)
            .await
    }

    /// Create an account (`POST /auth/register`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's validation message
    /// (e.g. email already taken), or an error if the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.send(Method::POST, "auth/register", Some(request), None)
            .await
    }

    /// Current user's profile (`GET /auth/profile`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token was rejected.
    #[instrument(skip(self, token))]
    pub async fn get_profile(&self, token: &AccessToken) -> Result<User, ApiError> {
        self.get("auth/profile", &[], Some(token)).await
    }

    /// Update name/phone (`PATCH /users/profile`).
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    #[instrument(skip(self, token, update))]
    pub async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        self.send(Method::PATCH, "users/profile", Some(update), Some(token))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Json as JsonBody;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;
    use crate::api::testing::spawn_backend;

    #[tokio::test]
    async fn test_login_returns_token_and_user() {
        let router = Router::new().route(
            "/auth/login",
            post(|JsonBody(body): JsonBody<Value>| async move {
                assert_eq!(body["email"], "ana@example.com");
                Json(json!({
                    "accessToken": "jwt-abc",
                    "user": {"id": 4, "name": "Ana", "email": "ana@example.com", "role": "CUSTOMER"}
                }))
            }),
        );
        let api = spawn_backend(router).await;

        let response = api
            .login(&LoginRequest {
                email: "ana@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.access_token.expose(), "jwt-abc");
        assert!(!response.user.role.is_admin());
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let router = Router::new().route(
            "/auth/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"statusCode": 401, "message": "Invalid credentials"})),
                )
            }),
        );
        let api = spawn_backend(router).await;

        let err = api
            .login(&LoginRequest {
                email: "ana@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.backend_message(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_profile_sends_bearer_token() {
        let router = Router::new().route(
            "/auth/profile",
            get(|headers: HeaderMap| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer jwt-abc")
                );
                Json(json!({"id": 4, "name": "Ana", "email": "ana@example.com"}))
            }),
        );
        let api = spawn_backend(router).await;

        let user = api
            .get_profile(&AccessToken::new("jwt-abc"))
            .await
            .unwrap();
        assert_eq!(user.name, "Ana");
    }
}

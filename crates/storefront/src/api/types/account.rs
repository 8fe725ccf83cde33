//! Accounts: users, authentication, addresses, notifications.

use chrono::{DateTime, Utc};
use papergift_core::{AccessToken, AddressId, NotificationId, UserId, UserRole};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Response of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: AccessToken,
    pub user: User,
}

/// Body of `PATCH /users/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddress {
    pub id: AddressId,
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl UserAddress {
    /// Single-line rendering for selects and order summaries.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.full_name.as_str(), self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.push(self.city.as_str());
        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
            parts.push(state);
        }
        if !self.postal_code.is_empty() {
            parts.push(self.postal_code.as_str());
        }
        if !self.country.is_empty() {
            parts.push(self.country.as_str());
        }
        parts.join(", ")
    }
}

/// Body of `POST /addresses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

/// An in-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// Backend-provided target path, e.g. `/orders/42`.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_deserialize() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"accessToken":"tok","user":{"id":1,"name":"Ana","email":"ana@example.com","role":"ADMIN"}}"#,
        )
        .unwrap();
        assert_eq!(response.access_token.expose(), "tok");
        assert!(response.user.role.is_admin());
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            email: "ana@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug_output = format!("{request:?}");
        assert!(debug_output.contains("ana@example.com"));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_address_one_line() {
        let address = UserAddress {
            id: AddressId::new(1),
            full_name: "Ana Lima".to_string(),
            phone: "555-0100".to_string(),
            line1: "12 Paper St".to_string(),
            line2: Some(String::new()),
            city: "Springfield".to_string(),
            state: Some("IL".to_string()),
            postal_code: "62701".to_string(),
            country: "US".to_string(),
            is_default: true,
        };
        assert_eq!(
            address.one_line(),
            "Ana Lima, 12 Paper St, Springfield, IL, 62701, US"
        );
    }
}

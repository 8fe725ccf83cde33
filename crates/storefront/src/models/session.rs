//! Session-related types.
//!
//! Types stored in the session for authentication state and guest data.

use serde::{Deserialize, Serialize};

use papergift_core::{AccessToken, UserId, UserRole};

use crate::api::AuthResponse;

/// Session-stored user identity.
///
/// Identity plus the backend access token; everything else about the user is
/// fetched from the backend when a page needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role; `ADMIN` unlocks the back office.
    pub role: UserRole,
    /// Bearer token for backend calls.
    pub token: AccessToken,
}

impl CurrentUser {
    /// Whether the user may access `/admin`.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<AuthResponse> for CurrentUser {
    fn from(response: AuthResponse) -> Self {
        Self {
            id: response.user.id,
            name: response.user.name,
            email: response.user.email,
            role: response.user.role,
            token: response.access_token,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the guest cart (visitors without an account).
    pub const GUEST_CART: &str = "guest_cart";

    /// Key for the guest wishlist.
    pub const GUEST_WISHLIST: &str = "guest_wishlist";

    /// Key for flashed toasts awaiting the next rendered page.
    pub const TOASTS: &str = "toasts";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_auth_response() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"accessToken":"jwt","user":{"id":3,"name":"Root","email":"root@example.com","role":"ADMIN"}}"#,
        )
        .unwrap();
        let user = CurrentUser::from(response);
        assert_eq!(user.id, UserId::new(3));
        assert!(user.is_admin());
        assert_eq!(user.token.expose(), "jwt");
    }

    #[test]
    fn test_session_round_trip_keeps_token() {
        let user = CurrentUser {
            id: UserId::new(1),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: UserRole::Customer,
            token: AccessToken::new("jwt"),
        };
        let stored = serde_json::to_value(&user).unwrap();
        let restored: CurrentUser = serde_json::from_value(stored).unwrap();
        assert_eq!(restored, user);
    }
}

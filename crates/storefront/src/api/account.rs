//! Saved shipping addresses.

use papergift_core::{AccessToken, AddressId};
use reqwest::Method;
use tracing::instrument;

use super::client::NoBody;
use super::types::{NewAddress, UserAddress};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// The customer's saved addresses (`GET /addresses`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn list_addresses(&self, token: &AccessToken) -> Result<Vec<UserAddress>, ApiError> {
        self.get("addresses", &[], Some(token)).await
    }

    /// Save a new address (`POST /addresses`).
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    #[instrument(skip(self, token, address))]
    pub async fn create_address(
        &self,
        token: &AccessToken,
        address: &NewAddress,
    ) -> Result<UserAddress, ApiError> {
        self.send(Method::POST, "addresses", Some(address), Some(token))
            .await
    }

    /// Delete a saved address (`DELETE /addresses/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_address(&self, token: &AccessToken, id: AddressId) -> Result<(), ApiError> {
        self.send_unit::<NoBody>(Method::DELETE, &format!("addresses/{id}"), None, Some(token))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::api::testing::spawn_backend;

    #[tokio::test]
    async fn test_list_addresses() {
        let router = Router::new().route(
            "/addresses",
            get(|| async {
                Json(json!([{
                    "id": 2, "fullName": "Ana Lima", "line1": "12 Paper St",
                    "city": "Springfield", "isDefault": true
                }]))
            }),
        );
        let api = spawn_backend(router).await;

        let addresses = api.list_addresses(&AccessToken::new("t")).await.unwrap();
        assert_eq!(addresses.len(), 1);
        assert!(addresses[0].is_default);
    }
}

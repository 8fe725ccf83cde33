//! Account route handlers.
//!
//! Profile details and the saved shipping address book. These routes
//! require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use papergift_core::AddressId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::context::{Loader, PageContext, flash_outcome, short_date};
use crate::api::{NewAddress, ProfileUpdate, User, UserAddress};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::services::toast::{Toast, flash};
use crate::state::AppState;

/// Profile display data for templates.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub member_since: String,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            member_since: short_date(user.created_at),
        }
    }
}

/// Address display data for templates.
#[derive(Debug, Clone)]
pub struct AddressView {
    pub id: AddressId,
    pub full_name: String,
    pub phone: String,
    pub summary: String,
    pub is_default: bool,
}

impl From<&UserAddress> for AddressView {
    fn from(address: &UserAddress) -> Self {
        Self {
            id: address.id,
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            summary: address.one_line(),
            is_default: address.is_default,
        }
    }
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub ctx: PageContext,
    /// `None` when the profile failed to load.
    pub profile: Option<ProfileView>,
    pub addresses: Vec<AddressView>,
}

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// New address form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    /// Checkbox; present only when ticked.
    #[serde(default)]
    pub is_default: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AddressForm {
    /// Validate and convert to the backend request.
    fn into_request(self) -> Result<NewAddress, &'static str> {
        let required = [
            &self.full_name,
            &self.phone,
            &self.line1,
            &self.city,
            &self.postal_code,
            &self.country,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err("Please fill in every required address field.");
        }

        Ok(NewAddress {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            line1: self.line1.trim().to_string(),
            line2: non_blank(self.line2),
            city: self.city.trim().to_string(),
            state: non_blank(self.state),
            postal_code: self.postal_code.trim().to_string(),
            country: self.country.trim().to_string(),
            is_default: self.is_default.is_some(),
        })
    }
}

/// Display the account page.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<AccountTemplate, AppError> {
    let mut loader = Loader::new();
    let (profile, addresses) = tokio::join!(
        state.api().get_profile(&user.token),
        state.api().list_addresses(&user.token),
    );

    let profile = loader.load_optional("your profile", profile)?;
    let addresses = loader.load("your addresses", addresses)?;

    Ok(AccountTemplate {
        profile: profile.as_ref().map(ProfileView::from),
        addresses: addresses.iter().map(AddressView::from).collect(),
        ctx: PageContext::new(&state, &session, Some(&user), "Your account", loader.into_toasts())
            .await,
    })
}

/// Update name and phone. The header shows the new name right away.
#[instrument(skip(state, session, user, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, AppError> {
    let name = form.name.trim().to_string();
    if name.is_empty() {
        flash(&session, Toast::error("Please enter your name.")).await;
        return Ok(Redirect::to("/account"));
    }

    let update = ProfileUpdate {
        name,
        phone: non_blank(form.phone),
    };
    let result = state.api().update_profile(&user.token, &update).await;

    if let Some(updated) = flash_outcome(&session, result, "Profile updated").await? {
        let mut current = user;
        current.name = updated.name;
        set_current_user(&session, &current).await?;
    }

    Ok(Redirect::to("/account"))
}

/// Save a new shipping address.
#[instrument(skip(state, session, user, form))]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Redirect, AppError> {
    match form.into_request() {
        Ok(address) => {
            let result = state.api().create_address(&user.token, &address).await;
            flash_outcome(&session, result, "Address saved").await?;
        }
        Err(message) => flash(&session, Toast::error(message)).await,
    }

    Ok(Redirect::to("/account"))
}

/// Delete a saved address.
#[instrument(skip(state, session, user))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Redirect, AppError> {
    let result = state.api().delete_address(&user.token, id).await;
    flash_outcome(&session, result, "Address removed").await?;
    Ok(Redirect::to("/account"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> AddressForm {
        AddressForm {
            full_name: " Ana Lima ".to_string(),
            phone: "555-0100".to_string(),
            line1: "12 Paper St".to_string(),
            line2: Some("  ".to_string()),
            city: "Springfield".to_string(),
            state: Some("IL".to_string()),
            postal_code: "62701".to_string(),
            country: "US".to_string(),
            is_default: Some("on".to_string()),
        }
    }

    #[test]
    fn test_address_form_into_request() {
        let request = form().into_request().unwrap();
        assert_eq!(request.full_name, "Ana Lima");
        assert_eq!(request.line2, None);
        assert_eq!(request.state.as_deref(), Some("IL"));
        assert!(request.is_default);
    }

    #[test]
    fn test_address_form_requires_fields() {
        let mut incomplete = form();
        incomplete.city = " ".to_string();
        assert!(incomplete.into_request().is_err());
    }
}

//! Caller identity.
//!
//! An [`IdentityProvider`] resolves the authenticated user from request
//! headers; the result is wrapped in a [`Session`] and passed explicitly
//! to every service operation. Handlers obtain it through the `Session`
//! extractor, which rejects anonymous requests with
//! [`RentalError::Unauthenticated`].

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::RentalError;

/// The authenticated actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CurrentUser {
    /// Stable identifier.
    pub id: UserId,
    /// Name shown to other participants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Identity of the caller for the duration of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: CurrentUser,
}

impl Session {
    /// Opens a session for `user`.
    #[must_use]
    pub fn new(user: CurrentUser) -> Self {
        Self { user }
    }

    /// Session for a bare user id, without profile fields.
    #[must_use]
    pub fn for_user(id: impl Into<UserId>) -> Self {
        Self::new(CurrentUser {
            id: id.into(),
            display_name: None,
            email: None,
        })
    }

    /// The caller's id.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    /// The full caller profile.
    #[must_use]
    pub fn user(&self) -> &CurrentUser {
        &self.user
    }
}

/// Source of the authenticated user for a request.
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Resolves the caller, or `None` if the request is anonymous.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] if identity data is present but
    /// malformed.
    fn current_user(&self, headers: &HeaderMap) -> Result<Option<CurrentUser>, RentalError>;
}

/// Header names read by [`HeaderIdentityProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNames {
    /// Header carrying the user id.
    pub id: String,
    /// Header carrying the display name.
    pub name: String,
    /// Header carrying the email.
    pub email: String,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            id: "x-user-id".to_string(),
            name: "x-user-name".to_string(),
            email: "x-user-email".to_string(),
        }
    }
}

/// Trusts identity headers set by an upstream authenticating proxy.
#[derive(Debug, Clone, Default)]
pub struct HeaderIdentityProvider {
    names: HeaderNames,
}

impl HeaderIdentityProvider {
    /// Creates a provider reading the given headers.
    #[must_use]
    pub fn new(names: HeaderNames) -> Self {
        Self { names }
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Result<Option<String>, RentalError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    let text = value
        .to_str()
        .map_err(|_| RentalError::Validation(format!("header {name} is not valid text")))?
        .trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

impl IdentityProvider for HeaderIdentityProvider {
    fn current_user(&self, headers: &HeaderMap) -> Result<Option<CurrentUser>, RentalError> {
        let Some(id) = header_text(headers, &self.names.id)? else {
            return Ok(None);
        };
        Ok(Some(CurrentUser {
            id: UserId::new(id),
            display_name: header_text(headers, &self.names.name)?,
            email: header_text(headers, &self.names.email)?,
        }))
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = RentalError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .identity
            .current_user(&parts.headers)?
            .map(Session::new)
            .ok_or(RentalError::Unauthenticated)
    }
}

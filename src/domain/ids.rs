//! Type-safe identifiers.
//!
//! [`AppointmentId`] and [`RoomId`] wrap [`uuid::Uuid`] (v4) so the two
//! kinds of record key cannot be confused. [`UserId`] wraps the opaque
//! string issued by the identity provider.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for an appointment record.
///
/// Assigned by the storage collaborator at creation and immutable
/// thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct AppointmentId(uuid::Uuid);

impl AppointmentId {
    /// Creates a new random `AppointmentId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates an `AppointmentId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Last six characters of the id, used as a human-facing reference
    /// in payment memos.
    #[must_use]
    pub fn short_ref(&self) -> String {
        let simple = self.0.simple().to_string();
        let start = simple.len().saturating_sub(6);
        simple.get(start..).unwrap_or_default().to_uppercase()
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for AppointmentId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

/// Unique identifier for a room listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct RoomId(uuid::Uuid);

impl RoomId {
    /// Creates a new random `RoomId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `RoomId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for RoomId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

/// Opaque user identifier issued by the identity provider.
///
/// Role checks compare these structurally against an appointment's
/// `tenant_id` / `host_id`; nothing else is verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw identifier string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

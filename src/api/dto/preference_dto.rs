//! Preference set DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{PreferenceKey, RoomId, ToggleOutcome};

/// Response body for `GET /me/preferences/{key}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreferenceListResponse {
    /// Which set.
    pub key: PreferenceKey,
    /// Room ids in stored order.
    pub room_ids: Vec<RoomId>,
}

/// Response body for `GET /me/preferences/{key}/{room_id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreferenceContainsResponse {
    /// Which set.
    pub key: PreferenceKey,
    /// Queried room.
    pub room_id: RoomId,
    /// Whether the room is in the set.
    pub contains: bool,
}

/// Response body for `POST /me/preferences/{key}/{room_id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreferenceToggleResponse {
    /// Which set.
    pub key: PreferenceKey,
    /// Toggled room.
    pub room_id: RoomId,
    /// What the toggle did.
    pub outcome: ToggleOutcome,
    /// The set after the toggle.
    pub room_ids: Vec<RoomId>,
    /// Set when the toggle was refused because the set is full.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

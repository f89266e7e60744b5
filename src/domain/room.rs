//! Room listing records and catalog filtering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{RoomId, UserId};

/// Kind of accommodation offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    /// A private room.
    Private,
    /// A shared room.
    Shared,
    /// The entire place.
    Entire,
}

impl RoomType {
    /// Wire / storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Shared => "shared",
            Self::Entire => "entire",
        }
    }

    /// Parses a filter value; `"all"` and unknown values mean no filter.
    #[must_use]
    pub fn parse_filter(raw: &str) -> Option<Self> {
        match raw {
            "private" => Some(Self::Private),
            "shared" => Some(Self::Shared),
            "entire" => Some(Self::Entire),
            _ => None,
        }
    }
}

/// A room listing owned by a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Room {
    /// Listing identifier.
    pub id: RoomId,
    /// Owner; becomes `host_id` on appointments for this room.
    pub host_id: UserId,
    /// Display title.
    pub title: String,
    /// Cover image URL.
    pub image: String,
    /// Monthly price in the smallest whole currency unit.
    pub price: u64,
    /// Street address.
    pub address: String,
    /// Accommodation kind.
    pub room_type: RoomType,
    /// Floor area in square metres.
    pub area: f64,
    /// Maximum number of occupants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_people: Option<u32>,
    /// Amenity labels.
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the room is open for booking.
    pub available: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when posting a room.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct NewRoom {
    /// Display title.
    pub title: String,
    /// Cover image URL.
    #[serde(default)]
    pub image: String,
    /// Monthly price.
    pub price: u64,
    /// Street address.
    pub address: String,
    /// Accommodation kind.
    pub room_type: RoomType,
    /// Floor area in square metres.
    #[serde(default)]
    pub area: f64,
    /// Maximum number of occupants.
    #[serde(default)]
    pub max_people: Option<u32>,
    /// Amenity labels.
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
}

impl NewRoom {
    /// Materializes the listing for `host_id`.
    #[must_use]
    pub fn into_room(self, id: RoomId, host_id: UserId, now: DateTime<Utc>) -> Room {
        Room {
            id,
            host_id,
            title: self.title,
            image: self.image,
            price: self.price,
            address: self.address,
            room_type: self.room_type,
            area: self.area,
            max_people: self.max_people,
            amenities: self.amenities,
            description: self.description,
            available: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a room. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct RoomPatch {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New cover image.
    #[serde(default)]
    pub image: Option<String>,
    /// New price.
    #[serde(default)]
    pub price: Option<u64>,
    /// New address.
    #[serde(default)]
    pub address: Option<String>,
    /// New accommodation kind.
    #[serde(default)]
    pub room_type: Option<RoomType>,
    /// New floor area.
    #[serde(default)]
    pub area: Option<f64>,
    /// New occupant cap.
    #[serde(default)]
    pub max_people: Option<u32>,
    /// Replacement amenity list.
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// Open or close the listing.
    #[serde(default)]
    pub available: Option<bool>,
}

impl RoomPatch {
    /// Applies the set fields to `room` and bumps `updated_at`.
    pub fn apply(self, room: &mut Room, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            room.title = v;
        }
        if let Some(v) = self.image {
            room.image = v;
        }
        if let Some(v) = self.price {
            room.price = v;
        }
        if let Some(v) = self.address {
            room.address = v;
        }
        if let Some(v) = self.room_type {
            room.room_type = v;
        }
        if let Some(v) = self.area {
            room.area = v;
        }
        if let Some(v) = self.max_people {
            room.max_people = Some(v);
        }
        if let Some(v) = self.amenities {
            room.amenities = v;
        }
        if let Some(v) = self.description {
            room.description = Some(v);
        }
        if let Some(v) = self.available {
            room.available = v;
        }
        room.updated_at = now;
    }
}

/// Catalog query. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomFilter {
    /// Case-insensitive substring of the title or address.
    pub search: Option<String>,
    /// Accommodation kind.
    pub room_type: Option<RoomType>,
    /// Inclusive price ceiling.
    pub max_price: Option<u64>,
    /// Owner.
    pub host_id: Option<UserId>,
}

impl RoomFilter {
    /// Returns `true` if `room` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, room: &Room) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            if !room.title.to_lowercase().contains(&term)
                && !room.address.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        if let Some(kind) = self.room_type
            && room.room_type != kind
        {
            return false;
        }
        if let Some(ceiling) = self.max_price
            && room.price > ceiling
        {
            return false;
        }
        if let Some(host) = &self.host_id
            && room.host_id != *host
        {
            return false;
        }
        true
    }
}

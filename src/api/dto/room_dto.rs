//! Room DTOs for catalog search.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{Room, RoomFilter, RoomType, UserId};

/// Query parameters for `GET /rooms`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomListParams {
    /// Free-text term matched against title and address.
    #[serde(default)]
    pub search: Option<String>,
    /// `private`, `shared`, `entire`, or `all`.
    #[serde(default)]
    pub room_type: Option<String>,
    /// Inclusive price ceiling.
    #[serde(default)]
    pub max_price: Option<u64>,
    /// Only listings owned by this host.
    #[serde(default)]
    pub host_id: Option<String>,
}

impl RoomListParams {
    /// Converts the query into a catalog filter.
    #[must_use]
    pub fn into_filter(self) -> RoomFilter {
        RoomFilter {
            search: self.search,
            room_type: self.room_type.as_deref().and_then(RoomType::parse_filter),
            max_price: self.max_price,
            host_id: self
                .host_id
                .filter(|h| !h.trim().is_empty())
                .map(UserId::new),
        }
    }
}

/// Paginated list response for `GET /rooms`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomListResponse {
    /// Page of listings, newest first.
    pub data: Vec<Room>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

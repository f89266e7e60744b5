//! Room catalog service: listing search and owner-only self-service.

use std::sync::Arc;

use crate::domain::{NewRoom, Room, RoomFilter, RoomId, RoomPatch};
use crate::error::RentalError;
use crate::identity::Session;
use crate::persistence::{RoomCatalog, StoreError};

/// Catalog operations with ownership checks.
#[derive(Debug, Clone)]
pub struct RoomService {
    rooms: Arc<dyn RoomCatalog>,
}

fn require_text(value: &str, field: &str) -> Result<(), RentalError> {
    if value.trim().is_empty() {
        return Err(RentalError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

fn require_area(area: f64) -> Result<(), RentalError> {
    if !area.is_finite() || area < 0.0 {
        return Err(RentalError::Validation(format!("invalid area: {area}")));
    }
    Ok(())
}

impl RoomService {
    /// Creates a new `RoomService`.
    #[must_use]
    pub fn new(rooms: Arc<dyn RoomCatalog>) -> Self {
        Self { rooms }
    }

    /// Loads one listing.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] or [`RentalError::Dependency`].
    pub async fn get(&self, id: RoomId) -> Result<Room, RentalError> {
        self.rooms.get(id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => RentalError::room_not_found(id),
            other => other.into(),
        })
    }

    /// Listings matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Dependency`] if storage fails.
    pub async fn search(&self, filter: &RoomFilter) -> Result<Vec<Room>, RentalError> {
        Ok(self.rooms.list(filter).await?)
    }

    /// Publishes a listing owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] for blank title or address or
    /// a bad area, or [`RentalError::Dependency`].
    pub async fn create(&self, session: &Session, new: NewRoom) -> Result<Room, RentalError> {
        require_text(&new.title, "title")?;
        require_text(&new.address, "address")?;
        require_area(new.area)?;
        let room = self.rooms.insert(session.user_id(), new).await?;
        tracing::info!(room_id = %room.id, host = %room.host_id, "room listed");
        Ok(room)
    }

    /// Edits a listing owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Forbidden`] for non-owners, plus the errors
    /// of [`Self::get`] and [`Self::create`].
    pub async fn update(
        &self,
        session: &Session,
        id: RoomId,
        patch: RoomPatch,
    ) -> Result<Room, RentalError> {
        if let Some(title) = &patch.title {
            require_text(title, "title")?;
        }
        if let Some(address) = &patch.address {
            require_text(address, "address")?;
        }
        if let Some(area) = patch.area {
            require_area(area)?;
        }
        self.require_owner(session, id).await?;
        let room = self.rooms.update(id, patch).await?;
        tracing::info!(room_id = %id, "room updated");
        Ok(room)
    }

    /// Removes a listing owned by the caller. Existing appointments keep
    /// their room snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Forbidden`] for non-owners, plus the errors
    /// of [`Self::get`].
    pub async fn delete(&self, session: &Session, id: RoomId) -> Result<(), RentalError> {
        self.require_owner(session, id).await?;
        self.rooms.delete(id).await?;
        tracing::info!(room_id = %id, "room removed");
        Ok(())
    }

    async fn require_owner(&self, session: &Session, id: RoomId) -> Result<Room, RentalError> {
        let room = self.get(id).await?;
        if room.host_id != *session.user_id() {
            return Err(RentalError::Forbidden(format!(
                "room {id} belongs to another host"
            )));
        }
        Ok(room)
    }
}

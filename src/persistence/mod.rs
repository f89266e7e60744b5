//! Persistence layer: storage seams for appointments and rooms.
//!
//! The core only talks to the [`AppointmentStore`] and [`RoomCatalog`]
//! traits. Two implementations exist: an in-memory store used by default
//! and in tests, and a PostgreSQL store backed by `sqlx::PgPool`.
//!
//! [`AppointmentStore::update_status`] is conditional: it writes only if
//! the stored status still equals the status the decision was based on.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, NewAppointment, NewRoom, Room, RoomFilter,
    RoomId, RoomPatch, StatusPatch, UserId,
};

pub use memory::{InMemoryAppointmentStore, InMemoryRoomCatalog};
pub use postgres::PostgresPersistence;

/// Storage-level failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with the given id.
    #[error("{kind} {id} does not exist")]
    NotFound {
        /// Record kind.
        kind: &'static str,
        /// Missing identifier.
        id: String,
    },

    /// A conditional status write found a different stored status.
    #[error("status changed concurrently: expected {expected}, found {actual}")]
    StatusConflict {
        /// Status the write was conditioned on.
        expected: AppointmentStatus,
        /// Status actually stored.
        actual: AppointmentStatus,
    },

    /// The backend failed or was unreachable.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Document-store contract for the `appointments` collection.
#[async_trait]
pub trait AppointmentStore: Send + Sync + std::fmt::Debug {
    /// Persists a new record in its initial state and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the write fails.
    async fn insert(&self, new: NewAppointment) -> Result<Appointment, StoreError>;

    /// Loads a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] or [`StoreError::Backend`].
    async fn get(&self, id: AppointmentId) -> Result<Appointment, StoreError>;

    /// Writes `patch` if the stored status still equals `patch.from`,
    /// returning the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StatusConflict`] when the guard fails,
    /// [`StoreError::NotFound`] or [`StoreError::Backend`].
    async fn update_status(
        &self,
        id: AppointmentId,
        patch: &StatusPatch,
    ) -> Result<Appointment, StoreError>;

    /// All records where `user` is tenant or host, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the query fails.
    async fn list_by_participant(&self, user: &UserId) -> Result<Vec<Appointment>, StoreError>;
}

/// Document-store contract for the `rooms` collection.
#[async_trait]
pub trait RoomCatalog: Send + Sync + std::fmt::Debug {
    /// Loads a room by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] or [`StoreError::Backend`].
    async fn get(&self, id: RoomId) -> Result<Room, StoreError>;

    /// Rooms matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the query fails.
    async fn list(&self, filter: &RoomFilter) -> Result<Vec<Room>, StoreError>;

    /// Persists a new listing owned by `host_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the write fails.
    async fn insert(&self, host_id: &UserId, new: NewRoom) -> Result<Room, StoreError>;

    /// Applies a partial update and returns the new record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] or [`StoreError::Backend`].
    async fn update(&self, id: RoomId, patch: RoomPatch) -> Result<Room, StoreError>;

    /// Removes a listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] or [`StoreError::Backend`].
    async fn delete(&self, id: RoomId) -> Result<(), StoreError>;
}

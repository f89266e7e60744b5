//! In-memory stores.
//!
//! Both stores keep records in a `tokio::sync::RwLock<HashMap<..>>`. The
//! status guard in [`InMemoryAppointmentStore::update_status`] is checked
//! and written under the same write lock, so it is a true compare-and-set.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AppointmentStore, RoomCatalog, StoreError};
use crate::domain::{
    Appointment, AppointmentId, NewAppointment, NewRoom, Room, RoomFilter, RoomId, RoomPatch,
    StatusPatch, UserId,
};

/// Appointment store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentStore {
    records: RwLock<HashMap<AppointmentId, Appointment>>,
    offline: AtomicBool,
}

impl InMemoryAppointmentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates an unreachable backend; every call fails while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("appointment store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        self.check_online()?;
        let appointment = new.into_appointment(AppointmentId::new(), Utc::now());
        self.records
            .write()
            .await
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn get(&self, id: AppointmentId) -> Result<Appointment, StoreError> {
        self.check_online()?;
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "appointment",
                id: id.to_string(),
            })
    }

    async fn update_status(
        &self,
        id: AppointmentId,
        patch: &StatusPatch,
    ) -> Result<Appointment, StoreError> {
        self.check_online()?;
        let mut map = self.records.write().await;
        let record = map.get_mut(&id).ok_or_else(|| StoreError::NotFound {
            kind: "appointment",
            id: id.to_string(),
        })?;
        if record.status != patch.from {
            return Err(StoreError::StatusConflict {
                expected: patch.from,
                actual: record.status,
            });
        }
        record.status = patch.to;
        if let Some(deposit_status) = patch.deposit_status {
            record.deposit_status = deposit_status;
        }
        if let Some(bill) = &patch.bill_image {
            record.bill_image = Some(bill.clone());
        }
        if let Some(note) = &patch.note {
            record.note = Some(note.clone());
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn list_by_participant(&self, user: &UserId) -> Result<Vec<Appointment>, StoreError> {
        self.check_online()?;
        let map = self.records.read().await;
        let mut matching: Vec<Appointment> = map
            .values()
            .filter(|a| a.is_participant(user))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

/// Room catalog backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryRoomCatalog {
    rooms: RwLock<HashMap<RoomId, Room>>,
}

impl InMemoryRoomCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomCatalog for InMemoryRoomCatalog {
    async fn get(&self, id: RoomId) -> Result<Room, StoreError> {
        self.rooms
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "room",
                id: id.to_string(),
            })
    }

    async fn list(&self, filter: &RoomFilter) -> Result<Vec<Room>, StoreError> {
        let map = self.rooms.read().await;
        let mut rooms: Vec<Room> = map.values().filter(|r| filter.matches(r)).cloned().collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rooms)
    }

    async fn insert(&self, host_id: &UserId, new: NewRoom) -> Result<Room, StoreError> {
        let room = new.into_room(RoomId::new(), host_id.clone(), Utc::now());
        self.rooms.write().await.insert(room.id, room.clone());
        Ok(room)
    }

    async fn update(&self, id: RoomId, patch: RoomPatch) -> Result<Room, StoreError> {
        let mut map = self.rooms.write().await;
        let room = map.get_mut(&id).ok_or_else(|| StoreError::NotFound {
            kind: "room",
            id: id.to_string(),
        })?;
        patch.apply(room, Utc::now());
        Ok(room.clone())
    }

    async fn delete(&self, id: RoomId) -> Result<(), StoreError> {
        self.rooms
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                kind: "room",
                id: id.to_string(),
            })
    }
}

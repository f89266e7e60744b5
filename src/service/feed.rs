//! Live participant feeds.
//!
//! A [`ParticipantFeed`] yields the full list of appointments a user is
//! tenant or host of: once immediately, then again after every event
//! touching one of their records. It subscribes to the bus before the
//! first query, so no change between snapshot and subscription is lost.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::{Appointment, AppointmentEvent, EventBus, UserId};
use crate::error::RentalError;
use crate::persistence::AppointmentStore;

/// One delivery of a participant feed.
pub type Snapshot = Result<Vec<Appointment>, RentalError>;

/// Pull-style feed of a participant's appointments, newest first.
#[derive(Debug)]
pub struct ParticipantFeed {
    store: Arc<dyn AppointmentStore>,
    events: broadcast::Receiver<AppointmentEvent>,
    user: UserId,
    primed: bool,
}

impl ParticipantFeed {
    /// Opens a feed for `user`. Subscribes to `event_bus` immediately.
    #[must_use]
    pub fn new(store: Arc<dyn AppointmentStore>, event_bus: &EventBus, user: UserId) -> Self {
        Self {
            store,
            events: event_bus.subscribe(),
            user,
            primed: false,
        }
    }

    /// The participant this feed tracks.
    #[must_use]
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Waits for the next snapshot.
    ///
    /// The first call returns the current list without waiting. Returns
    /// `None` once the event bus is closed.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if !self.primed {
            self.primed = true;
            return Some(self.query().await);
        }
        loop {
            match self.events.recv().await {
                Ok(event) if event.involves(&self.user) => return Some(self.query().await),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(user = %self.user, skipped, "participant feed lagged; re-querying");
                    return Some(self.query().await);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    async fn query(&self) -> Snapshot {
        self.store
            .list_by_participant(&self.user)
            .await
            .map_err(RentalError::from)
    }
}

/// Cancels a push-style subscription when cancelled or dropped.
#[derive(Debug)]
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Drives `feed` on a background task, passing each snapshot to
    /// `callback`.
    pub fn spawn<F>(mut feed: ParticipantFeed, mut callback: F) -> Self
    where
        F: FnMut(Snapshot) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(snapshot) = feed.next().await {
                callback(snapshot);
            }
        });
        Self { task }
    }

    /// Stops the feed. Equivalent to dropping the handle.
    pub fn cancel(self) {
        drop(self);
    }

    /// Returns `true` while the background task is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::domain::{AppointmentId, AppointmentStatus, BookingType, NewAppointment, RoomId, TenantInfo};
    use crate::persistence::InMemoryAppointmentStore;

    fn new_appointment(tenant: &str, host: &str) -> NewAppointment {
        NewAppointment {
            room_id: RoomId::new(),
            room_title: "Room".to_string(),
            room_image: String::new(),
            tenant_id: UserId::new(tenant),
            host_id: UserId::new(host),
            booking_type: BookingType::View,
            start_date: None,
            end_date: None,
            deposit_amount: None,
            tenant_info: TenantInfo {
                full_name: "Dang G".to_string(),
                phone_number: "0955555555".to_string(),
                id_card: None,
                occupants: None,
            },
        }
    }

    fn created(appointment_id: AppointmentId, tenant: &str, host: &str) -> AppointmentEvent {
        AppointmentEvent::AppointmentCreated {
            appointment_id,
            tenant_id: UserId::new(tenant),
            host_id: UserId::new(host),
            booking_type: BookingType::View,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_snapshot_is_immediate() {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let bus = EventBus::new(16);
        assert!(store.insert(new_appointment("t", "h")).await.is_ok());

        let mut feed = ParticipantFeed::new(store, &bus, UserId::new("t"));
        let Some(Ok(list)) = feed.next().await else {
            panic!("expected snapshot");
        };
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn unrelated_events_are_skipped() {
        let store: Arc<InMemoryAppointmentStore> = Arc::new(InMemoryAppointmentStore::new());
        let bus = EventBus::new(16);
        let mut feed = ParticipantFeed::new(Arc::clone(&store) as Arc<dyn AppointmentStore>, &bus, UserId::new("t"));
        let _ = feed.next().await;

        bus.publish(created(AppointmentId::new(), "other", "h"));
        let waited = tokio::time::timeout(Duration::from_millis(50), feed.next()).await;
        assert!(waited.is_err(), "feed should still be waiting");

        let Ok(mine) = store.insert(new_appointment("t", "h")).await else {
            panic!("insert failed");
        };
        bus.publish(created(mine.id, "t", "h"));
        let Ok(Some(Ok(list))) = tokio::time::timeout(Duration::from_secs(1), feed.next()).await
        else {
            panic!("expected snapshot");
        };
        assert_eq!(list.len(), 1);
        assert_eq!(list.first().map(|a| a.status), Some(AppointmentStatus::Pending));
    }

    #[tokio::test]
    async fn lagged_receiver_requeries() {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let bus = EventBus::new(1);
        let mut feed = ParticipantFeed::new(store, &bus, UserId::new("t"));
        let _ = feed.next().await;

        for _ in 0..4 {
            bus.publish(created(AppointmentId::new(), "x", "y"));
        }
        let res = tokio::time::timeout(Duration::from_secs(1), feed.next()).await;
        assert!(matches!(res, Ok(Some(Ok(_)))));
    }

    #[tokio::test]
    async fn dropping_handle_stops_delivery() {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let bus = EventBus::new(16);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let feed = ParticipantFeed::new(store, &bus, UserId::new("t"));
        let handle = SubscriptionHandle::spawn(feed, move |snapshot| {
            let _ = tx.send(snapshot.map(|l| l.len()));
        });

        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
        assert!(matches!(first, Ok(Some(Ok(0)))));
        assert!(handle.is_active());

        handle.cancel();
        bus.publish(created(AppointmentId::new(), "t", "h"));
        let after = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
        assert!(matches!(after, Ok(None)), "sender must be dropped with the task");
    }
}

//! Broadcast channel for domain events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every
//! appointment mutation publishes an [`AppointmentEvent`] through the bus,
//! and participant feeds and WebSocket connections subscribe to it.

use tokio::sync::broadcast;

use super::AppointmentEvent;

/// Broadcast bus for [`AppointmentEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest events are
/// dropped for lagging receivers; feeds recover by re-querying.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppointmentEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: AppointmentEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppointmentEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AppointmentId, BookingType, UserId};
    use chrono::Utc;

    fn make_event(appointment_id: AppointmentId) -> AppointmentEvent {
        AppointmentEvent::AppointmentCreated {
            appointment_id,
            tenant_id: UserId::new("tenant"),
            host_id: UserId::new("host"),
            booking_type: BookingType::View,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(make_event(AppointmentId::new())), 0);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let id = AppointmentId::new();
        assert_eq!(bus.publish(make_event(id)), 2);

        let Ok(e1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(e2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.appointment_id(), id);
        assert_eq!(e2.appointment_id(), id);
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(16);
        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);
        drop(rx1);
        assert_eq!(bus.receiver_count(), 1);
    }

    #[tokio::test]
    async fn slow_receiver_sees_lag_then_newest_events() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        let ids: Vec<AppointmentId> = (0..4).map(|_| AppointmentId::new()).collect();
        for id in &ids {
            bus.publish(make_event(*id));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
        let Ok(next) = rx.recv().await else {
            panic!("expected a buffered event");
        };
        assert_eq!(Some(&next.appointment_id()), ids.get(2));
    }
}
